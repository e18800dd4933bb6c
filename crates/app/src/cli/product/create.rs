use clap::Args;
use stockroom_app::{
    config::DatabaseConfig,
    domain::products::{PgProductsService, ProductsService, data::NewProduct, records::ProductUuid},
};

#[derive(Debug, Args)]
pub(crate) struct CreateProductArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    /// Product name
    #[arg(long)]
    name: String,

    /// Product description
    #[arg(long, default_value = "")]
    description: String,

    /// Price in minor currency units
    #[arg(long)]
    price: u64,

    /// Initial stock
    #[arg(long)]
    stock: u64,

    /// Show in the featured listing
    #[arg(long)]
    featured: bool,
}

pub(crate) async fn run(args: CreateProductArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    let product = PgProductsService::new(db)
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: args.name,
            description: args.description,
            price: args.price,
            stock: args.stock,
            is_featured: args.featured,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("product_price: {}", product.price);
    println!("product_stock: {}", product.stock);

    Ok(())
}
