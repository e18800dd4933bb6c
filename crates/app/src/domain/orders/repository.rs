//! Orders Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{encode_u64, try_get_optional_timestamp, try_get_timestamp, try_get_u64},
    domain::{
        addresses::records::{AddressRecord, AddressUuid},
        orders::{
            data::{NewOrder, NewOrderItem},
            records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderStatus, OrderUuid},
        },
        products::records::ProductUuid,
        users::records::UserUuid,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("sql/list_order_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.user_uuid.into_uuid())
            .bind(order.address_uuid.into_uuid())
            .bind(encode_u64(order.subtotal, "subtotal")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn create_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        position: usize,
        item: &NewOrderItem,
    ) -> Result<(), sqlx::Error> {
        let position = i32::try_from(position).map_err(|e| sqlx::Error::ColumnDecode {
            index: "position".to_string(),
            source: Box::new(e),
        })?;

        query(CREATE_ORDER_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(item.product_uuid.into_uuid())
            .bind(position)
            .bind(encode_u64(item.quantity, "quantity")?)
            .bind(encode_u64(item.price_at_time, "price_at_time")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Fetch an order header owned by `user`. Items are loaded separately.
    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Most recent order headers for `user`, newest first.
    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        limit: i64,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(user.into_uuid())
            .bind(limit)
            .fetch_all(&mut **tx)
            .await
    }

    /// Items for all of `orders`, grouped by order and in cart order within each.
    pub(crate) async fn list_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderUuid],
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        let orders: Vec<Uuid> = orders.iter().copied().map(OrderUuid::into_uuid).collect();

        query_as::<Postgres, OrderItemRecord>(LIST_ORDER_ITEMS_SQL)
            .bind(orders)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            status,
            subtotal: try_get_u64(row, "subtotal")?,
            address: AddressRecord {
                uuid: AddressUuid::from_uuid(row.try_get("address_uuid")?),
                user_uuid: UserUuid::from_uuid(row.try_get("address_user_uuid")?),
                label: row.try_get("address_label")?,
                street: row.try_get("address_street")?,
                city: row.try_get("address_city")?,
                state: row.try_get("address_state")?,
                zip: row.try_get("address_zip")?,
                country: row.try_get("address_country")?,
                created_at: try_get_timestamp(row, "address_created_at")?,
                updated_at: try_get_timestamp(row, "address_updated_at")?,
                deleted_at: try_get_optional_timestamp(row, "address_deleted_at")?,
            },
            items: Vec::new(),
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            quantity: try_get_u64(row, "quantity")?,
            price_at_time: try_get_u64(row, "price_at_time")?,
        })
    }
}
