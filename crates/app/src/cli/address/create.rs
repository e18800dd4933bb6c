use clap::Args;
use stockroom_app::{
    config::DatabaseConfig,
    domain::{
        addresses::{AddressesService, PgAddressesService, data::NewAddress, records::AddressUuid},
        users::records::UserUuid,
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateAddressArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    /// Owner of the address
    #[arg(long)]
    user_uuid: Uuid,

    /// Short label such as "home"
    #[arg(long, default_value = "home")]
    label: String,

    #[arg(long)]
    street: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    #[arg(long)]
    zip: String,

    /// Two-letter country code
    #[arg(long)]
    country: String,
}

pub(crate) async fn run(args: CreateAddressArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    let address = PgAddressesService::new(db)
        .create_address(
            UserUuid::from_uuid(args.user_uuid),
            NewAddress {
                uuid: AddressUuid::new(),
                label: args.label,
                street: args.street,
                city: args.city,
                state: args.state,
                zip: args.zip,
                country: args.country.to_ascii_uppercase(),
            },
        )
        .await
        .map_err(|error| format!("failed to create address: {error}"))?;

    println!("address_uuid: {}", address.uuid);
    println!("user_uuid: {}", address.user_uuid);

    Ok(())
}
