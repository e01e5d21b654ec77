use anyhow::Context;
use bookstore_app::App;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about = "Operate the bookstore service")]
struct Cli {
    /// Override the database URL from configuration
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until interrupted
    Serve {
        /// Override the listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().context("failed to load bookstore settings")?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }
    bookstore_telemetry::init(&settings.telemetry).context("failed to initialize tracing")?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            App::bootstrap(settings).await?.serve().await
        }
        Command::Migrate => {
            settings.database.run_migrations = false;
            let app = App::bootstrap(settings).await?;
            let applied = app.migrate().await?;
            tracing::info!(applied, "migrations applied");
            app.db().close().await;
            Ok(())
        }
    }
}
