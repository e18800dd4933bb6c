use clap::Args;
use stockroom_app::{
    config::DatabaseConfig,
    domain::products::{PgProductsService, ProductsService, data::ProductUpdate, records::ProductUuid},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct UpdateProductArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    /// Product to update
    #[arg(long)]
    product_uuid: Uuid,

    /// New price in minor currency units
    #[arg(long)]
    price: Option<u64>,

    /// New durable stock
    #[arg(long)]
    stock: Option<u64>,
}

pub(crate) async fn run(args: UpdateProductArgs) -> Result<(), String> {
    if args.price.is_none() && args.stock.is_none() {
        return Err("nothing to update: pass --price and/or --stock".to_string());
    }

    let db = crate::cli::connect(&args.database).await?;

    let product = PgProductsService::new(db)
        .update_product(
            ProductUuid::from_uuid(args.product_uuid),
            ProductUpdate {
                price: args.price,
                stock: args.stock,
            },
        )
        .await
        .map_err(|error| format!("failed to update product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("product_price: {}", product.price);
    println!("product_stock: {}", product.stock);

    Ok(())
}
