//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use sqlx::{
    Postgres, Transaction,
    error::{DatabaseError, ErrorKind},
};
use tracing::{debug, error, info, warn};

use crate::{
    database::{Db, is_retryable},
    domain::{
        addresses::{
            records::{AddressRecord, AddressUuid},
            repository::PgAddressesRepository,
        },
        carts::{records::CartLine, store::CartStore},
        orders::{
            data::{NewOrder, NewOrderItem},
            errors::OrdersServiceError,
            records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
        },
        products::{
            records::{ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
        users::records::UserUuid,
    },
};

/// Number of orders returned by [`OrdersService::list_orders`].
pub const ORDER_HISTORY_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    store: Arc<dyn CartStore>,
    commit_attempts: u32,
    orders: PgOrdersRepository,
    products: PgProductsRepository,
    addresses: PgAddressesRepository,
}

impl std::fmt::Debug for PgOrdersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .field("commit_attempts", &self.commit_attempts)
            .finish_non_exhaustive()
    }
}

/// An order item together with the stock of its locked product row.
#[derive(Debug)]
struct PricedLine {
    item: NewOrderItem,
    stock: u64,
}

impl PricedLine {
    fn insufficient(&self) -> OrdersServiceError {
        OrdersServiceError::InsufficientStock {
            product: self.item.product_uuid,
            name: self.item.product_name.clone(),
            remaining: self.stock,
        }
    }
}

impl PgOrdersService {
    /// `commit_attempts` bounds how often a commit that lost a serialization conflict
    /// or deadlock is replayed; it is always tried at least once.
    #[must_use]
    pub fn new(db: Db, store: Arc<dyn CartStore>, commit_attempts: u32) -> Self {
        Self {
            db,
            store,
            commit_attempts: commit_attempts.max(1),
            orders: PgOrdersRepository::new(),
            products: PgProductsRepository::new(),
            addresses: PgAddressesRepository::new(),
        }
    }

    async fn commit_with_retry(
        &self,
        user: UserUuid,
        address: &AddressRecord,
        lines: &[CartLine],
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut attempt = 1;

        loop {
            match self.commit(user, address, lines).await {
                Err(OrdersServiceError::Sql(source))
                    if is_retryable(&source) && attempt < self.commit_attempts =>
                {
                    warn!(%user, attempt, error = %source, "order commit conflicted, retrying");

                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Lock, re-validate, write the order and decrement stock in one transaction.
    async fn commit(
        &self,
        user: UserUuid,
        address: &AddressRecord,
        lines: &[CartLine],
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let locked = self
            .products
            .lock_products(&mut tx, &product_uuids(lines))
            .await?;

        let priced = price_lines(lines, &locked)?;

        let order = NewOrder {
            uuid: OrderUuid::new(),
            user_uuid: user,
            address_uuid: address.uuid,
            subtotal: order_subtotal(&priced)?,
        };

        self.orders.create_order(&mut tx, &order).await?;

        for (position, line) in priced.iter().enumerate() {
            self.orders
                .create_order_item(&mut tx, order.uuid, position, &line.item)
                .await?;

            self.decrement(&mut tx, line).await?;
        }

        let mut record = self
            .orders
            .get_order(&mut tx, user, order.uuid)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        record.items = self.orders.list_order_items(&mut tx, &[order.uuid]).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn decrement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: &PricedLine,
    ) -> Result<(), OrdersServiceError> {
        let result = self
            .products
            .decrement_stock(tx, line.item.product_uuid, line.item.quantity)
            .await;

        match result {
            Ok(Some(_remaining)) => Ok(()),
            Ok(None) => Err(line.insufficient()),
            Err(source)
                if matches!(
                    source.as_database_error().map(DatabaseError::kind),
                    Some(ErrorKind::CheckViolation)
                ) =>
            {
                Err(line.insufficient())
            }
            Err(source) => Err(source.into()),
        }
    }

    async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &mut [OrderRecord],
    ) -> Result<(), OrdersServiceError> {
        let uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();

        let mut items: FxHashMap<OrderUuid, Vec<OrderItemRecord>> = FxHashMap::default();

        for item in self.orders.list_order_items(tx, &uuids).await? {
            items.entry(item.order_uuid).or_default().push(item);
        }

        for order in orders {
            order.items = items.remove(&order.uuid).unwrap_or_default();
        }

        Ok(())
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn place_order(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let address = self
            .addresses
            .get_address(&mut tx, user, address)
            .await?
            .ok_or(OrdersServiceError::AddressNotFound)?;

        tx.commit().await?;

        let lines = self.store.get_lines(user).await?;

        if lines.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        // Reject obviously stale carts before taking any row locks.
        let mut tx = self.db.begin().await?;

        let current = self
            .products
            .list_products_by_uuids(&mut tx, &product_uuids(&lines))
            .await?;

        tx.commit().await?;

        if let Err(rejection) = price_lines(&lines, &current) {
            debug!(%user, reason = %rejection, "order rejected before commit");

            return Err(rejection);
        }

        let order = self.commit_with_retry(user, &address, &lines).await?;

        if let Err(source) = self.store.delete_cart(user).await {
            error!(
                %user,
                order = %order.uuid,
                error = %source,
                "order committed but cart could not be cleared"
            );
        }

        info!(
            %user,
            order = %order.uuid,
            items = order.items.len(),
            subtotal = order.subtotal,
            "order placed"
        );

        Ok(order)
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut orders = self
            .orders
            .list_orders(&mut tx, user, ORDER_HISTORY_LIMIT)
            .await?;

        self.attach_items(&mut tx, &mut orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self
            .orders
            .get_order(&mut tx, user, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        record.items = self.orders.list_order_items(&mut tx, &[order]).await?;

        tx.commit().await?;

        Ok(record)
    }
}

fn product_uuids(lines: &[CartLine]) -> Vec<ProductUuid> {
    lines.iter().map(|line| line.product_uuid).collect()
}

/// Price every cart line against `products`, failing on the first line whose product
/// is gone or short of stock.
fn price_lines(
    lines: &[CartLine],
    products: &[ProductRecord],
) -> Result<Vec<PricedLine>, OrdersServiceError> {
    let by_uuid: FxHashMap<ProductUuid, &ProductRecord> = products
        .iter()
        .map(|product| (product.uuid, product))
        .collect();

    lines
        .iter()
        .map(|line| {
            let product = by_uuid
                .get(&line.product_uuid)
                .ok_or(OrdersServiceError::ProductGone(line.product_uuid))?;

            if line.quantity > product.stock {
                return Err(OrdersServiceError::InsufficientStock {
                    product: product.uuid,
                    name: product.name.clone(),
                    remaining: product.stock,
                });
            }

            Ok(PricedLine {
                item: NewOrderItem {
                    uuid: OrderItemUuid::new(),
                    product_uuid: product.uuid,
                    product_name: product.name.clone(),
                    quantity: line.quantity,
                    price_at_time: product.price,
                },
                stock: product.stock,
            })
        })
        .collect()
}

fn order_subtotal(lines: &[PricedLine]) -> Result<u64, OrdersServiceError> {
    lines.iter().try_fold(0_u64, |subtotal, line| {
        line.item
            .price_at_time
            .checked_mul(line.item.quantity)
            .and_then(|line_total| subtotal.checked_add(line_total))
            .ok_or(OrdersServiceError::TotalOverflow)
    })
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Convert the user's whole cart into a pending order shipped to `address`.
    ///
    /// Nothing is written and the cart is kept when any line fails validation.
    async fn place_order(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// The user's most recent orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// A single order, visible only to its owner.
    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use tokio::task::JoinSet;

    use crate::{
        domain::{
            carts::{
                CartsService,
                store::{CartStoreError, MockCartStore},
            },
            orders::records::OrderStatus,
            products::{ProductsService, data::ProductUpdate},
        },
        test::{TestContext, helpers::product_record},
    };

    use super::*;

    fn product(name: &str, price: u64, stock: u64) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            ..product_record(ProductUuid::new(), price, stock)
        }
    }

    fn line(product: &ProductRecord, quantity: u64) -> CartLine {
        CartLine {
            product_uuid: product.uuid,
            quantity,
        }
    }

    async fn stock_of(ctx: &TestContext, product: ProductUuid) -> u64 {
        ctx.products
            .get_product(product)
            .await
            .expect("product exists")
            .stock
    }

    #[test]
    fn pricing_snapshots_current_price() -> TestResult {
        let card = product("Snorlax", 7_50, 4);

        let priced = price_lines(&[line(&card, 2)], std::slice::from_ref(&card))?;

        assert_eq!(priced.len(), 1);
        assert_eq!(priced[0].item.price_at_time, 7_50);
        assert_eq!(priced[0].item.product_name, "Snorlax");
        assert_eq!(order_subtotal(&priced)?, 15_00);

        Ok(())
    }

    #[test]
    fn pricing_missing_product_is_product_gone() {
        let gone = product("Missingno", 1, 1);

        let result = price_lines(&[line(&gone, 1)], &[]);

        assert!(
            matches!(result, Err(OrdersServiceError::ProductGone(uuid)) if uuid == gone.uuid),
            "expected ProductGone, got {result:?}"
        );
    }

    #[test]
    fn pricing_short_stock_names_product_and_remaining() {
        let card = product("Gengar", 3_00, 1);

        let result = price_lines(&[line(&card, 2)], std::slice::from_ref(&card));

        assert!(
            matches!(
                &result,
                Err(OrdersServiceError::InsufficientStock { product, name, remaining: 1 })
                    if *product == card.uuid && name == "Gengar"
            ),
            "expected InsufficientStock for Gengar, got {result:?}"
        );
    }

    #[test]
    fn subtotal_overflow_is_reported() -> TestResult {
        let card = product("Priceless", u64::MAX, 5);

        let priced = price_lines(&[line(&card, 2)], std::slice::from_ref(&card))?;

        assert!(matches!(
            order_subtotal(&priced),
            Err(OrdersServiceError::TotalOverflow)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn placing_order_snapshots_decrements_and_clears_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("buyer@example.com").await;
        let address = ctx.create_address(user).await;
        let first = ctx.create_product("Alakazam", 20_00, 5).await;
        let second = ctx.create_product("Machamp", 15_00, 3).await;

        ctx.carts.add_item(user, first.uuid, 2).await?;
        ctx.carts.add_item(user, second.uuid, 3).await?;

        let order = ctx.orders.place_order(user, address).await?;

        assert_eq!(order.user_uuid, user);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.address.uuid, address);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.subtotal, 2 * 20_00 + 3 * 15_00);

        let alakazam = order
            .items
            .iter()
            .find(|item| item.product_uuid == first.uuid)
            .expect("ordered item");

        assert_eq!(alakazam.quantity, 2);
        assert_eq!(alakazam.price_at_time, 20_00);
        assert_eq!(alakazam.product_name, "Alakazam");

        assert_eq!(stock_of(&ctx, first.uuid).await, 3);
        assert_eq!(stock_of(&ctx, second.uuid).await, 0);
        assert!(ctx.carts.get_cart(user).await?.items.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("window-shopper@example.com").await;
        let address = ctx.create_address(user).await;

        let result = ctx.orders.place_order(user, address).await;

        assert!(
            matches!(result, Err(OrdersServiceError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
    }

    #[tokio::test]
    async fn foreign_address_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("sender@example.com").await;
        let stranger = ctx.create_user("stranger@example.com").await;
        let foreign = ctx.create_address(stranger).await;
        let card = ctx.create_product("Jigglypuff", 1_00, 2).await;

        ctx.carts.add_item(user, card.uuid, 1).await?;

        let result = ctx.orders.place_order(user, foreign).await;

        assert!(
            matches!(result, Err(OrdersServiceError::AddressNotFound)),
            "expected AddressNotFound, got {result:?}"
        );

        assert_eq!(stock_of(&ctx, card.uuid).await, 2);

        Ok(())
    }

    #[tokio::test]
    async fn deleted_product_is_gone_and_cart_survives() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("late@example.com").await;
        let address = ctx.create_address(user).await;
        let kept = ctx.create_product("Eevee", 2_00, 5).await;
        let gone = ctx.create_product("Ditto", 2_00, 5).await;

        ctx.carts.add_item(user, kept.uuid, 1).await?;
        ctx.carts.add_item(user, gone.uuid, 1).await?;
        ctx.products.delete_product(gone.uuid).await?;

        let result = ctx.orders.place_order(user, address).await;

        assert!(
            matches!(result, Err(OrdersServiceError::ProductGone(uuid)) if uuid == gone.uuid),
            "expected ProductGone, got {result:?}"
        );

        assert_eq!(stock_of(&ctx, kept.uuid).await, 5);
        assert_eq!(ctx.cart_store.get_lines(user).await?.len(), 2);
        assert!(ctx.orders.list_orders(user).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn stock_sold_elsewhere_fails_and_keeps_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let slow = ctx.create_user("slow@example.com").await;
        let fast = ctx.create_user("fast@example.com").await;
        let slow_address = ctx.create_address(slow).await;
        let fast_address = ctx.create_address(fast).await;
        let card = ctx.create_product("Mewtwo GX", 35_00, 2).await;

        ctx.carts.add_item(slow, card.uuid, 2).await?;
        ctx.carts.add_item(fast, card.uuid, 1).await?;

        ctx.orders.place_order(fast, fast_address).await?;

        let result = ctx.orders.place_order(slow, slow_address).await;

        assert!(
            matches!(
                &result,
                Err(OrdersServiceError::InsufficientStock { product, remaining: 1, .. })
                    if *product == card.uuid
            ),
            "expected InsufficientStock with 1 remaining, got {result:?}"
        );

        assert_eq!(stock_of(&ctx, card.uuid).await, 1);
        assert_eq!(
            ctx.cart_store.get_lines(slow).await?,
            vec![CartLine {
                product_uuid: card.uuid,
                quantity: 2,
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_buyers_never_oversell() -> TestResult {
        const STOCK: u64 = 4;

        let ctx = TestContext::new().await;
        let card = ctx.create_product("Base Set Booster", 100_00, STOCK).await;
        let mut buyers = Vec::new();

        for n in 0..=STOCK {
            let user = ctx.create_user(&format!("buyer{n}@example.com")).await;
            let address = ctx.create_address(user).await;

            ctx.carts.add_item(user, card.uuid, 1).await?;

            buyers.push((user, address));
        }

        let mut placements = JoinSet::new();

        for (user, address) in buyers {
            let orders = ctx.orders.clone();

            placements.spawn(async move { orders.place_order(user, address).await });
        }

        let mut placed = 0;
        let mut rejected = 0;

        while let Some(result) = placements.join_next().await {
            match result? {
                Ok(_) => placed += 1,
                Err(OrdersServiceError::InsufficientStock { remaining: 0, .. }) => rejected += 1,
                Err(other) => return Err(other.into()),
            }
        }

        assert_eq!(placed, STOCK);
        assert_eq!(rejected, 1);
        assert_eq!(stock_of(&ctx, card.uuid).await, 0);

        Ok(())
    }

    #[tokio::test]
    async fn both_shoppers_reserving_the_last_unit_yields_one_order() -> TestResult {
        let ctx = TestContext::new().await;
        let card = ctx.create_product("Last Copy", 50_00, 1).await;
        let first = ctx.create_user("x@example.com").await;
        let second = ctx.create_user("y@example.com").await;
        let first_address = ctx.create_address(first).await;
        let second_address = ctx.create_address(second).await;

        let (first_add, second_add) = tokio::join!(
            ctx.carts.add_item(first, card.uuid, 1),
            ctx.carts.add_item(second, card.uuid, 1),
        );

        first_add?;
        second_add?;

        let (first_order, second_order) = tokio::join!(
            ctx.orders.place_order(first, first_address),
            ctx.orders.place_order(second, second_address),
        );

        assert_eq!(
            usize::from(first_order.is_ok()) + usize::from(second_order.is_ok()),
            1,
            "expected exactly one order, got {first_order:?} and {second_order:?}"
        );

        assert_eq!(stock_of(&ctx, card.uuid).await, 0);

        Ok(())
    }

    #[tokio::test]
    async fn order_keeps_price_from_commit_time() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("bargain@example.com").await;
        let address = ctx.create_address(user).await;
        let card = ctx.create_product("Venusaur", 10_00, 3).await;

        ctx.carts.add_item(user, card.uuid, 1).await?;

        let raise = ProductUpdate {
            price: Some(12_00),
            stock: None,
        };

        ctx.products.update_product(card.uuid, raise).await?;

        let order = ctx.orders.place_order(user, address).await?;

        assert_eq!(order.items[0].price_at_time, 12_00);

        let cut = ProductUpdate {
            price: Some(5_00),
            stock: None,
        };

        ctx.products.update_product(card.uuid, cut).await?;

        let reread = ctx.orders.get_order(user, order.uuid).await?;

        assert_eq!(reread.items[0].price_at_time, 12_00);
        assert_eq!(reread.subtotal, 12_00);

        Ok(())
    }

    #[tokio::test]
    async fn history_is_newest_first_and_owner_scoped() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("collector@example.com").await;
        let other = ctx.create_user("other@example.com").await;
        let address = ctx.create_address(user).await;
        let card = ctx.create_product("Blastoise", 8_00, 10).await;

        ctx.carts.add_item(user, card.uuid, 1).await?;
        let older = ctx.orders.place_order(user, address).await?;

        ctx.carts.add_item(user, card.uuid, 2).await?;
        let newer = ctx.orders.place_order(user, address).await?;

        let history = ctx.orders.list_orders(user).await?;

        assert_eq!(
            history.iter().map(|order| order.uuid).collect::<Vec<_>>(),
            vec![newer.uuid, older.uuid]
        );
        assert_eq!(history[0].items.len(), 1);
        assert_eq!(history[0].items[0].quantity, 2);

        assert!(ctx.orders.list_orders(other).await?.is_empty());

        let result = ctx.orders.get_order(other, older.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound for another user's order, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unreadable_cart_aborts_without_writing() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("offline@example.com").await;
        let address = ctx.create_address(user).await;
        let mut store = MockCartStore::new();

        store.expect_get_lines().returning(|_| {
            Err(CartStoreError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection reset",
            ))))
        });

        let orders = PgOrdersService::new(Db::new(ctx.db.pool().clone()), Arc::new(store), 3);

        let result = orders.place_order(user, address).await;

        assert!(
            matches!(result, Err(OrdersServiceError::Store(_))),
            "expected Store error, got {result:?}"
        );

        assert!(ctx.orders.list_orders(user).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn failed_cart_clear_still_returns_committed_order() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("sticky@example.com").await;
        let address = ctx.create_address(user).await;
        let card = ctx.create_product("Dragonite", 22_00, 2).await;
        let mut store = MockCartStore::new();

        let lines = vec![line(&card, 1)];

        store
            .expect_get_lines()
            .returning(move |_| Ok(lines.clone()));

        store.expect_delete_cart().times(1).returning(|_| {
            Err(CartStoreError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "broken pipe",
            ))))
        });

        let orders = PgOrdersService::new(Db::new(ctx.db.pool().clone()), Arc::new(store), 3);

        let order = orders.place_order(user, address).await?;

        assert_eq!(order.items.len(), 1);
        assert_eq!(stock_of(&ctx, card.uuid).await, 1);

        Ok(())
    }
}
