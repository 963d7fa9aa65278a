use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tend::api::{self, SecurityConfig};
use tend::db;
use tend::mcp::{self, render, TendClient};
use tend::models::CreateCareInput;
use tend::schedule::DEFAULT_RADIUS_DAYS;

#[derive(Parser)]
#[command(name = "tend")]
#[command(about = "Recurring household care schedules")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Start MCP server via stdio
    Mcp,
    /// List households on a running server
    Households,
    /// Print the schedule around today from a running server
    Schedule {
        /// Household UUID
        household: Uuid,

        /// Days either side of today
        #[arg(short, long, default_value_t = DEFAULT_RADIUS_DAYS)]
        radius: u32,
    },
    /// Record that a todo was done
    Done {
        /// Household UUID
        household: Uuid,

        /// Todo UUID
        todo: Uuid,

        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
    },
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tend=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // MCP mode: log to stderr so stdout is clean for protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn serve(port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting tend server on port {}", port);

    let db = db::Database::open_default()?;
    db.migrate()?;

    let security = SecurityConfig::from_env();
    if security.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    }
    if let Some(limiter) = security.rate_limiter.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.prune();
            }
        });
    }

    let app = api::create_router_with_security(db, security);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("tend server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // MCP mode needs stderr for logging since stdout is the protocol channel
    let use_stderr = !matches!(cli.command, None | Some(Commands::Serve { .. }));
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Serve { port }) => serve(port).await?,
        None => serve(3000).await?,
        Some(Commands::Mcp) => {
            let db = db::Database::open_default()?;
            db.migrate()?;

            mcp::run_stdio_server(db).await?;
        }
        Some(Commands::Households) => {
            let client = TendClient::from_env();
            for household in client.list_households().await? {
                println!("{}  {}", household.id, household.name);
            }
        }
        Some(Commands::Schedule { household, radius }) => {
            let client = TendClient::from_env();
            let entries = client.get_schedule(household, radius).await?;
            let todos = client.list_todos(household).await?;

            // The server's today is the middle of the window.
            let today = entries
                .get(entries.len() / 2)
                .map(|entry| entry.date)
                .context("server returned an empty schedule")?;

            print!("{}", render::render_schedule(&entries, &todos, today));
        }
        Some(Commands::Done {
            household,
            todo,
            note,
        }) => {
            let client = TendClient::from_env();
            let care = client
                .log_care(
                    household,
                    &CreateCareInput {
                        todo_id: todo,
                        note,
                        date_created: None,
                    },
                )
                .await?;
            println!("Logged care {} at {}", care.id, care.date_created.to_rfc3339());
        }
    }

    Ok(())
}
