use clap::Parser;
use expense_ledger::args::{Args, Command, EventCommand, TxnCommand};
use expense_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Event(event_args) => {
            let config = Config::load(home).await?;
            match event_args.command() {
                EventCommand::Create(args) => {
                    commands::create_event(config, args.clone()).await?.print()
                }
                EventCommand::List => commands::list_events(config).await?.print(),
                EventCommand::Show(args) => commands::show_event(config, args.id()).await?.print(),
                EventCommand::Select(args) => {
                    commands::select_event(config, args.id()).await?.print()
                }
                EventCommand::Delete(args) => {
                    commands::delete_event(config, args.id()).await?.print()
                }
                EventCommand::Update(args) => {
                    commands::update_event(config, args.clone()).await?.print()
                }
            }
        }

        Command::Txn(txn_args) => {
            let config = Config::load(home).await?;
            match txn_args.command() {
                TxnCommand::Add(args) => {
                    commands::add_transaction(config, args.clone()).await?.print()
                }
                TxnCommand::Update(args) => commands::update_transaction(config, args.clone())
                    .await?
                    .print(),
                TxnCommand::Delete(args) => {
                    commands::delete_transaction(config, args.id()).await?.print()
                }
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the given level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
