mod common;
mod sheet;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sheet::{handle_auth, handle_grid, handle_list, handle_write, GridArgs, ListArgs, WriteArgs};
use sheetgrid::config::Settings;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
enum SubCommand {
    /// Authorize once and cache the credential
    Auth,
    /// Print Name, Gender and Major from the sample class sheet
    List(ListArgs),
    /// Print the Fibonacci formula grid without contacting the API
    Grid(GridArgs),
    /// Write the Fibonacci formula grid to a spreadsheet
    Write(WriteArgs),
}

#[derive(Debug, Parser)]
#[clap(name = "sheetgrid")]
struct Arguments {
    /// Settings file (toml, json or yaml)
    #[clap(short = 'c', long = "config")]
    config: Option<String>,

    /// Where the authorized credential is cached
    #[clap(long = "token")]
    token_path: Option<PathBuf>,

    /// OAuth client secret bundle
    #[clap(long = "client-secrets")]
    client_secrets_path: Option<PathBuf>,

    #[clap(subcommand)]
    command: SubCommand,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let main_args = Arguments::parse();

    let mut settings = Settings::load(main_args.config.as_deref())?;
    if let Some(path) = main_args.token_path {
        settings.token_path = path;
    }
    if let Some(path) = main_args.client_secrets_path {
        settings.client_secrets_path = path;
    }
    log::debug!("{:?}", settings);

    match main_args.command {
        SubCommand::Auth => handle_auth(&settings).await,
        SubCommand::List(args) => handle_list(&settings, args).await,
        SubCommand::Grid(args) => handle_grid(args),
        SubCommand::Write(args) => handle_write(&settings, args).await,
    }
}
