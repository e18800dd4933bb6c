use clap::{Args, Subcommand};

mod create;

#[derive(Debug, Args)]
pub(crate) struct AddressCommand {
    #[command(subcommand)]
    command: AddressSubcommand,
}

#[derive(Debug, Subcommand)]
enum AddressSubcommand {
    Create(create::CreateAddressArgs),
}

pub(crate) async fn run(command: AddressCommand) -> Result<(), String> {
    match command.command {
        AddressSubcommand::Create(args) => create::run(args).await,
    }
}
