//! Carts service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::domain::{
    carts::{
        errors::CartsServiceError,
        records::{Cart, CartItem, CartItemUpdate, CartLine},
        store::CartStore,
    },
    products::{ProductsService, records::ProductUuid},
    users::records::UserUuid,
};

/// Validates cart writes against durable stock and applies them to the cart store.
///
/// Checks are made against raw product stock only. Other shoppers' reservations are
/// advisory until checkout, so two carts may jointly hold more than is in stock.
#[derive(Clone)]
pub struct CartMutator {
    products: Arc<dyn ProductsService>,
    store: Arc<dyn CartStore>,
}

impl std::fmt::Debug for CartMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartMutator").finish_non_exhaustive()
    }
}

impl CartMutator {
    #[must_use]
    pub fn new(products: Arc<dyn ProductsService>, store: Arc<dyn CartStore>) -> Self {
        Self { products, store }
    }
}

#[async_trait]
impl CartsService for CartMutator {
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        let lines = self.store.get_lines(user).await?;

        if lines.is_empty() {
            return Ok(Cart::default());
        }

        let products = self
            .products
            .list_products_by_uuids(lines.iter().map(|line| line.product_uuid).collect())
            .await?;

        let by_uuid: FxHashMap<ProductUuid, _> = products
            .into_iter()
            .map(|product| (product.uuid, product))
            .collect();

        let mut cart = Cart::default();

        for line in lines {
            // Lines for deleted products stay in the store; checkout rejects them.
            let Some(product) = by_uuid.get(&line.product_uuid) else {
                continue;
            };

            let line_total = product.price.saturating_mul(line.quantity);

            cart.subtotal = cart.subtotal.saturating_add(line_total);
            cart.items.push(CartItem {
                product: product.clone(),
                quantity: line.quantity,
                line_total,
            });
        }

        Ok(cart)
    }

    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<CartLine, CartsServiceError> {
        if quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let record = self.products.get_product(product).await?;

        if record.stock == 0 {
            return Err(CartsServiceError::OutOfStock);
        }

        let current = self.store.get_quantity(user, product).await?.unwrap_or(0);

        let total = current.saturating_add(quantity);

        if total > record.stock {
            return Err(CartsServiceError::InsufficientStock {
                available: record.stock,
            });
        }

        self.store.set_quantity(user, product, total).await?;

        info!(%user, %product, quantity = total, "added to cart");

        Ok(CartLine {
            product_uuid: product,
            quantity: total,
        })
    }

    async fn update_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<CartItemUpdate, CartsServiceError> {
        if quantity == 0 {
            self.store.remove_line(user, product).await?;

            debug!(%user, %product, "zero quantity removed cart line");

            return Ok(CartItemUpdate::Removed(product));
        }

        let record = self.products.get_product(product).await?;

        if quantity > record.stock {
            return Err(CartsServiceError::InsufficientStock {
                available: record.stock,
            });
        }

        self.store.set_quantity(user, product, quantity).await?;

        info!(%user, %product, quantity, "updated cart line");

        Ok(CartItemUpdate::Set(CartLine {
            product_uuid: product,
            quantity,
        }))
    }

    async fn remove_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError> {
        self.store.remove_line(user, product).await?;

        info!(%user, %product, "removed cart line");

        Ok(())
    }

    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError> {
        self.store.delete_cart(user).await?;

        info!(%user, "cleared cart");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The user's cart priced at current prices. Lines whose product no longer exists
    /// are left out of the view.
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Add `quantity` units on top of whatever the cart already holds.
    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<CartLine, CartsServiceError>;

    /// Replace a line's quantity; zero removes the line.
    async fn update_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<CartItemUpdate, CartsServiceError>;

    /// Remove a line. Absent lines are ignored.
    async fn remove_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError>;

    /// Delete the whole cart.
    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError>;
}
