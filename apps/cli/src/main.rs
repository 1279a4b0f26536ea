use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{CommandHandlers, HttpRecordStore, RegistryController};
use shared::domain::Taxpayer;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

mod render;

use render::{render_table, Theme};

#[derive(Parser, Debug)]
#[command(name = "taxreg", about = "Taxpayer record management front-end")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8780")]
    server_url: String,
    #[arg(long, value_enum, default_value_t = ThemeArg::Light)]
    theme: ThemeArg,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => Theme::light(),
            ThemeArg::Dark => Theme::dark(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and display all taxpayer records.
    List,
    /// Register a new taxpayer and display the refreshed listing.
    Add {
        #[arg(long)]
        tid: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        address: String,
    },
    /// Look up a single taxpayer by tid.
    Search { tid: String },
    /// Read list/add/search commands from stdin until EOF or "quit".
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let theme = Theme::from(args.theme);

    let controller = RegistryController::new(HttpRecordStore::new(args.server_url));

    match args.command {
        Command::List => controller.refresh().await?,
        Command::Add {
            tid,
            first_name,
            last_name,
            address,
        } => {
            controller
                .add(Taxpayer::new(tid, first_name, last_name, address))
                .await?
        }
        Command::Search { tid } => controller.search(&tid).await?,
        Command::Interactive => {
            run_interactive(&controller, &theme).await?;
            return Ok(());
        }
    }

    render_table(&mut std::io::stdout(), &controller.state(), &theme)?;
    Ok(())
}

async fn run_interactive(
    controller: &std::sync::Arc<RegistryController<HttpRecordStore>>,
    theme: &Theme,
) -> Result<()> {
    let handlers = CommandHandlers::new(controller.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("commands: list | add <tid> <first> <last> <address> | search <tid> | quit");
    while let Some(line) = lines.next_line().await? {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["list"] => handlers.refresh_records().await,
            ["search", tid] => handlers.search_records(tid).await,
            ["add", tid, first, last, address @ ..] if !address.is_empty() => {
                handlers
                    .add_record(Taxpayer::new(*tid, *first, *last, address.join(" ")))
                    .await
            }
            _ => {
                warn!(input = %line, "unrecognized command");
                continue;
            }
        }
        render_table(&mut std::io::stdout(), &controller.state(), theme)?;
    }

    Ok(())
}
