//! Availability service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::domain::{
    availability::records::{Availability, ProductAvailability},
    carts::store::{CartStore, CartStoreError, ScanCursor},
    products::{ProductsService, ProductsServiceError, records::ProductUuid},
    users::records::UserUuid,
};

/// Derives soft availability by walking every live cart in the cart store.
#[derive(Clone)]
pub struct AvailabilityCalculator {
    products: Arc<dyn ProductsService>,
    store: Arc<dyn CartStore>,
    low_stock_threshold: u64,
    scan_batch_size: usize,
}

impl std::fmt::Debug for AvailabilityCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityCalculator")
            .field("low_stock_threshold", &self.low_stock_threshold)
            .field("scan_batch_size", &self.scan_batch_size)
            .finish_non_exhaustive()
    }
}

impl AvailabilityCalculator {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductsService>,
        store: Arc<dyn CartStore>,
        low_stock_threshold: u64,
        scan_batch_size: usize,
    ) -> Self {
        Self {
            products,
            store,
            low_stock_threshold,
            scan_batch_size,
        }
    }

    /// Sum the quantity of `product` held in every cart except `viewer`'s.
    ///
    /// The scan cursor may return a key more than once; each cart is counted once.
    async fn reserved_by_others(
        &self,
        product: ProductUuid,
        viewer: Option<UserUuid>,
    ) -> Result<u64, CartStoreError> {
        let mut seen = FxHashSet::default();
        let mut reserved: u64 = 0;
        let mut cursor = ScanCursor::START;

        loop {
            let page = self.store.scan_carts(cursor, self.scan_batch_size).await?;

            for owner in page.owners {
                if viewer == Some(owner) || !seen.insert(owner) {
                    continue;
                }

                let quantity = self.store.get_quantity(owner, product).await?;

                reserved = reserved.saturating_add(quantity.unwrap_or(0));
            }

            if page.next.is_finished() {
                break;
            }

            cursor = page.next;
        }

        Ok(reserved)
    }
}

#[async_trait]
impl AvailabilityService for AvailabilityCalculator {
    async fn compute_availability(
        &self,
        product: ProductUuid,
        durable_stock: u64,
        viewer: Option<UserUuid>,
    ) -> Availability {
        let reserved = match self.reserved_by_others(product, viewer).await {
            Ok(reserved) => reserved,
            Err(error) => {
                warn!(%product, error = %error, "cart scan failed, ignoring reservations");

                0
            }
        };

        let availability =
            Availability::from_stock(durable_stock, reserved, self.low_stock_threshold);

        debug!(
            %product,
            durable_stock,
            reserved,
            available_stock = availability.available_stock,
            "computed availability"
        );

        availability
    }

    async fn product_availability(
        &self,
        product: ProductUuid,
        viewer: Option<UserUuid>,
    ) -> Result<ProductAvailability, ProductsServiceError> {
        let product = self.products.get_product(product).await?;

        let availability = self
            .compute_availability(product.uuid, product.stock, viewer)
            .await;

        Ok(ProductAvailability {
            product,
            availability,
        })
    }
}

#[automock]
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    /// Availability of `product` as seen by `viewer`; guests (`None`) see every cart
    /// counted against them.
    ///
    /// An unreadable cart store counts as no reservations.
    async fn compute_availability(
        &self,
        product: ProductUuid,
        durable_stock: u64,
        viewer: Option<UserUuid>,
    ) -> Availability;

    /// Product detail read with availability attached.
    async fn product_availability(
        &self,
        product: ProductUuid,
        viewer: Option<UserUuid>,
    ) -> Result<ProductAvailability, ProductsServiceError>;
}
