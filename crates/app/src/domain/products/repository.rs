//! Products Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{encode_u64, try_get_optional_timestamp, try_get_timestamp, try_get_u64},
    domain::products::{
        data::{NewProduct, ProductUpdate},
        records::{ProductRecord, ProductUuid},
    },
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const LIST_FEATURED_PRODUCTS_SQL: &str = include_str!("sql/list_featured_products.sql");
const LIST_PRODUCTS_BY_UUIDS_SQL: &str = include_str!("sql/list_products_by_uuids.sql");
const LOCK_PRODUCTS_SQL: &str = include_str!("sql/lock_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_featured_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_FEATURED_PRODUCTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    /// Batch read of live products; unknown or deleted UUIDs are simply absent.
    pub(crate) async fn list_products_by_uuids(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_BY_UUIDS_SQL)
            .bind(to_uuids(products))
            .fetch_all(&mut **tx)
            .await
    }

    /// Same as [`Self::list_products_by_uuids`], but takes row locks in UUID order so
    /// concurrent checkouts touching overlapping products queue instead of deadlocking.
    pub(crate) async fn lock_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LOCK_PRODUCTS_SQL)
            .bind(to_uuids(products))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.name)
            .bind(product.description)
            .bind(encode_u64(product.price, "price")?)
            .bind(encode_u64(product.stock, "stock")?)
            .bind(product.is_featured)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, sqlx::Error> {
        let price = update
            .price
            .map(|price| encode_u64(price, "price"))
            .transpose()?;

        let stock = update
            .stock
            .map(|stock| encode_u64(stock, "stock"))
            .transpose()?;

        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(price)
            .bind(stock)
            .fetch_one(&mut **tx)
            .await
    }

    /// Decrement stock only if at least `quantity` units remain.
    ///
    /// Returns the remaining stock, or `None` when the guard did not match.
    pub(crate) async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<Option<u64>, sqlx::Error> {
        let remaining: Option<i64> = query_scalar(DECREMENT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(encode_u64(quantity, "stock")?)
            .fetch_optional(&mut **tx)
            .await?;

        remaining
            .map(|stock| {
                u64::try_from(stock).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "stock".to_string(),
                    source: Box::new(e),
                })
            })
            .transpose()
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn to_uuids(products: &[ProductUuid]) -> Vec<Uuid> {
    products.iter().copied().map(ProductUuid::into_uuid).collect()
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: try_get_u64(row, "price")?,
            stock: try_get_u64(row, "stock")?,
            is_featured: row.try_get("is_featured")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
            deleted_at: try_get_optional_timestamp(row, "deleted_at")?,
        })
    }
}
