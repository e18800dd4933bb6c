//! Products service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::products::{
        data::{NewProduct, ProductUpdate},
        errors::ProductsServiceError,
        records::{ProductRecord, ProductUuid},
        repository::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(&self) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_products(&mut tx).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn list_featured_products(&self) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_featured_products(&mut tx).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn list_products_by_uuids(
        &self,
        products: Vec<ProductUuid>,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.db.begin().await?;

        let products = self
            .repository
            .list_products_by_uuids(&mut tx, &products)
            .await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_product(&mut tx, product, update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_product(&mut tx, product).await?;

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves all live products, ordered by name.
    async fn list_products(&self) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Retrieves live products flagged as featured.
    async fn list_featured_products(&self) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Batch read; missing or deleted products are omitted rather than reported.
    async fn list_products_by_uuids(
        &self,
        products: Vec<ProductUuid>,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid)
    -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new product.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Changes price and/or durable stock. Existing orders keep their price snapshot.
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Soft-deletes a product.
    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::new_product};

    use super::*;

    #[tokio::test]
    async fn create_product_returns_record() -> TestResult {
        let ctx = TestContext::new().await;
        let product = new_product("Charizard Holo", 120_00, 3);
        let uuid = product.uuid;

        let created = ctx.products.create_product(product).await?;

        assert_eq!(created.uuid, uuid);
        assert_eq!(created.name, "Charizard Holo");
        assert_eq!(created.price, 120_00);
        assert_eq!(created.stock, 3);
        assert!(created.deleted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn get_product_returns_created_product() -> TestResult {
        let ctx = TestContext::new().await;
        let created = ctx
            .products
            .create_product(new_product("Blue-Eyes White Dragon", 45_00, 1))
            .await?;

        let fetched = ctx.products.get_product(created.uuid).await?;

        assert_eq!(fetched, created);

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_product_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.products.get_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let product = new_product("Black Lotus", 99_999_00, 1);

        ctx.products.create_product(product.clone()).await?;

        let result = ctx.products.create_product(product).await;

        assert!(
            matches!(result, Err(ProductsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn price_beyond_bigint_is_invalid_data() {
        let ctx = TestContext::new().await;

        let result = ctx
            .products
            .create_product(new_product("Priceless", u64::MAX, 1))
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn featured_listing_only_returns_featured_products() -> TestResult {
        let ctx = TestContext::new().await;

        let featured = ctx
            .products
            .create_product(NewProduct {
                is_featured: true,
                ..new_product("Pikachu Illustrator", 500_00, 1)
            })
            .await?;

        ctx.products
            .create_product(new_product("Energy Card", 10, 500))
            .await?;

        let listed = ctx.products.list_featured_products().await?;

        assert_eq!(listed, vec![featured]);
        assert_eq!(ctx.products.list_products().await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn batch_read_omits_unknown_and_deleted_products() -> TestResult {
        let ctx = TestContext::new().await;

        let kept = ctx
            .products
            .create_product(new_product("Mewtwo", 30_00, 2))
            .await?;

        let deleted = ctx
            .products
            .create_product(new_product("Mew", 40_00, 2))
            .await?;

        ctx.products.delete_product(deleted.uuid).await?;

        let listed = ctx
            .products
            .list_products_by_uuids(vec![kept.uuid, deleted.uuid, ProductUuid::new()])
            .await?;

        assert_eq!(listed, vec![kept]);

        Ok(())
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .products
            .create_product(new_product("Dark Magician", 25_00, 4))
            .await?;

        let updated = ctx
            .products
            .update_product(
                created.uuid,
                ProductUpdate {
                    price: Some(30_00),
                    stock: None,
                },
            )
            .await?;

        assert_eq!(updated.price, 30_00);
        assert_eq!(updated.stock, 4);

        Ok(())
    }

    #[tokio::test]
    async fn deleted_product_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .products
            .create_product(new_product("Mox Sapphire", 8_000_00, 1))
            .await?;

        ctx.products.delete_product(created.uuid).await?;

        let result = ctx.products.get_product(created.uuid).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        let second_delete = ctx.products.delete_product(created.uuid).await;

        assert!(
            matches!(second_delete, Err(ProductsServiceError::NotFound)),
            "expected NotFound on repeated deletion, got {second_delete:?}"
        );

        Ok(())
    }
}
