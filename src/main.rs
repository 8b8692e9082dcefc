use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studywat::app::{AppService, Route};
use studywat::catalog::{CatalogQuery, FilterKind};
use studywat::cli::{self, Context};
use studywat::models::SortOrder;
use studywat::session::FileStorage;
use studywat::Config;

/// Environment variable holding a Google ID token for `studywat login`
const CREDENTIAL_ENV: &str = "STUDYWAT_GOOGLE_CREDENTIAL";

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    env!("STUDYWAT_VERSION_SUFFIX")
);

#[derive(Parser)]
#[command(name = "studywat")]
#[command(author, version = VERSION, about = "Studywat - browse study programs, keep shortlists and talk to the study advisor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL (overrides config and STUDYWAT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal UI (the default)
    Tui {
        /// Screen to open after sign-in (catalog, chat, profile, settings)
        #[arg(short, long)]
        route: Option<String>,

        /// Catalog link to open, e.g. 'country=Malaysia&page=2'
        #[arg(long)]
        link: Option<String>,
    },

    /// Sign in with a Google ID token
    Login {
        /// Google credential (or set STUDYWAT_GOOGLE_CREDENTIAL)
        #[arg(long)]
        credential: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Search the program catalog
    Programs(ProgramArgs),

    /// Manage saved program lists
    Lists {
        #[command(subcommand)]
        command: Option<ListCommands>,
    },

    /// Show inferred traits and course suggestions
    Profile,

    /// Ask the study advisor one question
    Ask {
        /// The message to send
        message: String,

        /// Wait for the whole reply instead of streaming it
        #[arg(long)]
        batch: bool,
    },

    /// Show the conversation with the advisor
    Chat {
        /// Delete the conversation on the server
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Create a list
    Create {
        title: String,
        #[arg(long)]
        emoji: Option<String>,
    },

    /// Rename a list or change its emoji
    Rename {
        id: String,
        title: String,
        #[arg(long)]
        emoji: Option<String>,
    },

    /// Delete a list
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Add a program to a list
    Add { list_id: String, program_id: String },

    /// Remove a program from a list
    Remove { list_id: String, program_id: String },

    /// Show the programs in a list
    Show {
        id: String,
        #[command(flatten)]
        paging: PagingArgs,
    },
}

#[derive(Args)]
struct PagingArgs {
    /// Page number (1-based)
    #[arg(long)]
    page: Option<usize>,

    /// Programs per page
    #[arg(long)]
    limit: Option<usize>,

    /// Sort by institution: az or za
    #[arg(long)]
    sort: Option<String>,
}

#[derive(Args)]
struct ProgramArgs {
    /// Institution country (repeatable)
    #[arg(long)]
    country: Vec<String>,

    /// Institution type: Public or Private (repeatable)
    #[arg(long = "type")]
    kind: Vec<String>,

    /// Field of study key, e.g. computer_science (repeatable)
    #[arg(long)]
    field: Vec<String>,

    /// Institution name (repeatable)
    #[arg(long)]
    institution: Vec<String>,

    #[command(flatten)]
    paging: PagingArgs,

    /// Start from a catalog link such as 'country=Malaysia&page=2'
    #[arg(long)]
    link: Option<String>,
}

impl PagingArgs {
    fn apply(&self, query: &mut CatalogQuery) -> Result<()> {
        if let Some(page) = self.page {
            query.page = page.max(1);
        }
        if let Some(limit) = self.limit {
            query.limit = limit.max(1);
        }
        if let Some(sort) = &self.sort {
            query.sort = Some(
                SortOrder::parse(sort)
                    .with_context(|| format!("Unknown sort '{}', expected az or za", sort))?,
            );
        }
        Ok(())
    }
}

impl ProgramArgs {
    fn query(&self, config: &Config) -> Result<CatalogQuery> {
        let mut query = match &self.link {
            Some(link) => CatalogQuery::parse(link),
            None => CatalogQuery {
                limit: config.catalog.page_size,
                ..CatalogQuery::default()
            },
        };
        for (kind, values) in [
            (FilterKind::Country, &self.country),
            (FilterKind::Type, &self.kind),
            (FilterKind::Field, &self.field),
            (FilterKind::Institution, &self.institution),
        ] {
            if !values.is_empty() {
                *query.filters.get_mut(kind) = values.clone();
            }
        }
        self.paging.apply(&mut query)?;
        Ok(query)
    }
}

/// Log file used while the terminal UI owns the screen
fn log_file_path() -> Result<std::path::PathBuf> {
    let session_path = FileStorage::default_path()?;
    let dir = session_path
        .parent()
        .context("Failed to determine log directory")?;
    std::fs::create_dir_all(dir).context("Failed to create log directory")?;
    Ok(dir.join("studywat.log"))
}

fn init_logging(verbose: bool, to_file: bool) -> Result<()> {
    let filter = if verbose {
        "studywat=debug"
    } else {
        "studywat=info"
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if to_file {
        let path = log_file_path()?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui {
        route: None,
        link: None,
    });

    init_logging(cli.verbose, matches!(command, Commands::Tui { .. }))?;
    tracing::debug!(
        "studywat {} (commit {}, built {})",
        VERSION,
        env!("STUDYWAT_GIT_HASH"),
        env!("STUDYWAT_BUILD_TIME")
    );

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Using default config: {:#}", e);
        Config::default()
    });
    if let Some(url) = &cli.api_url {
        config.apply_api_url(url);
    }
    tracing::debug!("Backend at {}", config.api.base_url);

    let ctx = Context::open(config)?;

    match command {
        Commands::Tui { route, link } => {
            let route = match route.as_deref() {
                Some(name) => Route::parse(name)
                    .with_context(|| format!("Unknown route '{}'", name))?,
                None => Route::Catalog,
            };
            let query = match link {
                Some(link) => CatalogQuery::parse(&link),
                None => CatalogQuery {
                    limit: ctx.config.catalog.page_size,
                    ..CatalogQuery::default()
                },
            };
            tracing::info!("Starting TUI on {:?}", route);

            let tick_rate = Duration::from_millis(ctx.config.ui.tick_rate_ms.max(1));
            let (event_tx, event_rx) = mpsc::unbounded_channel();
            let Context {
                config,
                session,
                backend,
            } = ctx;
            let service = AppService::new(config, session, backend, route, query, event_tx);
            studywat::tui::run(service, event_rx, tick_rate).await?;
        }
        Commands::Login { credential } => {
            let credential = credential
                .or_else(|| std::env::var(CREDENTIAL_ENV).ok())
                .with_context(|| {
                    format!("Pass --credential <token> or set {}", CREDENTIAL_ENV)
                })?;
            cli::run_login(&ctx, &credential).await?;
        }
        Commands::Logout => cli::run_logout(&ctx).await?,
        Commands::Whoami => cli::run_whoami(&ctx).await?,
        Commands::Programs(args) => {
            let query = args.query(&ctx.config)?;
            cli::run_programs(&ctx, query).await?;
        }
        Commands::Lists { command } => match command {
            None => cli::run_lists(&ctx).await?,
            Some(ListCommands::Create { title, emoji }) => {
                cli::run_list_create(&ctx, &title, emoji).await?
            }
            Some(ListCommands::Rename { id, title, emoji }) => {
                cli::run_list_rename(&ctx, &id, &title, emoji).await?
            }
            Some(ListCommands::Delete { id, yes }) => cli::run_list_delete(&ctx, &id, yes).await?,
            Some(ListCommands::Add {
                list_id,
                program_id,
            }) => cli::run_list_membership(&ctx, &list_id, &program_id, true).await?,
            Some(ListCommands::Remove {
                list_id,
                program_id,
            }) => cli::run_list_membership(&ctx, &list_id, &program_id, false).await?,
            Some(ListCommands::Show { id, paging }) => {
                let mut query = CatalogQuery::default();
                paging.apply(&mut query)?;
                cli::run_list_show(&ctx, &id, query).await?;
            }
        },
        Commands::Profile => cli::run_profile(&ctx).await?,
        Commands::Ask { message, batch } => cli::run_ask(&ctx, &message, batch).await?,
        Commands::Chat { clear } => cli::run_chat_history(&ctx, clear).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_program_flags_override_link() {
        let cli = Cli::parse_from([
            "studywat",
            "programs",
            "--link",
            "country=Japan&page=3&limit=20",
            "--country",
            "Malaysia",
            "--sort",
            "za",
        ]);
        let Some(Commands::Programs(args)) = cli.command else {
            panic!("expected programs");
        };
        let query = args.query(&Config::default()).unwrap();
        assert_eq!(query.filters.country, vec!["Malaysia".to_string()]);
        assert_eq!(query.page, 3);
        assert_eq!(query.limit, 20);
        assert_eq!(query.sort, Some(SortOrder::Za));
    }

    #[test]
    fn test_bad_sort_is_rejected() {
        let mut query = CatalogQuery::default();
        let paging = PagingArgs {
            page: None,
            limit: None,
            sort: Some("newest".to_string()),
        };
        assert!(paging.apply(&mut query).is_err());
    }
}
