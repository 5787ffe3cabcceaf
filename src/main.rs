mod cache;
mod client;
mod codec;
mod commands;
mod config;
mod debounce;
mod error;
mod page;
mod retry;
mod store;
mod table;
#[cfg(test)]
mod testing;
mod types;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use types::{Language, Order, Sort};

#[derive(Parser)]
#[command(name = "gitsearch")]
#[command(about = "Search GitHub repositories by language, sorted and paginated", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log cache and request activity
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    /// GitHub token used for API requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Query string to start from (e.g. "q=tokio&lang=python&page=2")
    #[arg(long, value_hint = ValueHint::Other)]
    url: Option<String>,
    /// Terminal width used to lay out the table
    #[arg(long, env = "COLUMNS", default_value_t = 120)]
    width: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search and print the results table
    #[command(short_flag = 's')]
    Search {
        #[command(flatten)]
        page: PageArgs,
        /// Search text
        #[arg(short = 'q', long)]
        query: Option<String>,
        #[arg(long, value_enum)]
        lang: Option<Language>,
        #[arg(long, value_enum)]
        sort: Option<Sort>,
        #[arg(long, value_enum)]
        order: Option<Order>,
        /// Page number, starting at 1
        #[arg(long = "page")]
        page_number: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Browse results interactively, one command per line
    #[command(short_flag = 'i')]
    Interactive {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show or clear the remembered search
    State {
        #[arg(long)]
        reset: bool,
    },
    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn display_banner() {
    println!("gitsearch {}\n", env!("CARGO_PKG_VERSION"));
    let mut cmd = Cli::command();
    let _ = cmd.print_help();
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string())
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        None => display_banner(),
        Some(Commands::Search {
            page,
            query,
            lang,
            sort,
            order,
            page_number,
            per_page,
        }) => {
            let overrides = commands::SearchOverrides {
                query,
                lang,
                sort,
                order,
                page: page_number,
                per_page,
            };
            commands::search_repos(&page, cli.token, overrides).await?
        }
        Some(Commands::Interactive { page }) => commands::interactive(&page, cli.token).await?,
        Some(Commands::State { reset }) => commands::state_command(reset)?,
        Some(Commands::Completions { shell }) => commands::generate_completions(shell),
    }
    Ok(())
}
