use clap::{Parser, Subcommand};
use stockroom_app::{
    config::DatabaseConfig,
    database::{self, Db},
};

mod address;
mod product;
mod token;
mod user;

#[derive(Debug, Parser)]
#[command(name = "stockroom-app", about = "Stockroom operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    User(user::UserCommand),
    Token(token::TokenCommand),
    Product(product::ProductCommand),
    Address(address::AddressCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::User(command) => user::run(command).await,
            Commands::Token(command) => token::run(command).await,
            Commands::Product(command) => product::run(command).await,
            Commands::Address(command) => address::run(command).await,
        }
    }
}

/// Connect to the database named by `config`, mapping failure to a CLI message.
pub(crate) async fn connect(config: &DatabaseConfig) -> Result<Db, String> {
    let pool = database::connect(&config.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(Db::new(pool))
}
