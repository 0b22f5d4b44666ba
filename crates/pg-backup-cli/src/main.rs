use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "pg-backup")]
#[command(
    about = "Backup, restore and verify PostgreSQL databases running in containers",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a YAML configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump a database into a compressed, timestamped artifact
    Backup {
        /// Name of the container running PostgreSQL
        #[arg(short, long)]
        container: String,

        /// Database to back up
        #[arg(short, long)]
        database: Option<String>,

        /// PostgreSQL role
        #[arg(short, long)]
        user: Option<String>,

        /// Directory to write the artifact into
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Load an artifact into a database
    Restore {
        /// Name of the container running PostgreSQL
        #[arg(short, long)]
        container: String,

        /// Artifact to restore
        #[arg(short, long)]
        file: String,

        /// Database to restore into
        #[arg(short, long)]
        database: Option<String>,

        /// PostgreSQL role
        #[arg(short, long)]
        user: Option<String>,

        /// Drop the database before restoring
        #[arg(long, default_value = "false")]
        drop: bool,
    },

    /// Compare the data of a database across two containers
    Verify {
        /// Source container
        #[arg(short, long)]
        source: String,

        /// Target container
        #[arg(short, long)]
        target: String,

        /// Database to compare
        #[arg(short, long)]
        database: Option<String>,

        /// PostgreSQL role
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Back up the source, restore into the target (dropping it), then verify
    Test {
        /// Source container
        #[arg(short, long)]
        source: String,

        /// Target container
        #[arg(short, long)]
        target: String,

        /// Database to round-trip
        #[arg(short, long)]
        database: Option<String>,

        /// PostgreSQL role
        #[arg(short, long)]
        user: Option<String>,

        /// Directory to write the artifact into
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    // Priority: RUST_LOG env var > verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Backup {
            container,
            database,
            user,
            output,
        } => {
            commands::backup::run(config, &container, database, user, output).await?;
        }
        Commands::Restore {
            container,
            file,
            database,
            user,
            drop,
        } => {
            commands::restore::run(config, &container, &file, database, user, drop).await?;
        }
        Commands::Verify {
            source,
            target,
            database,
            user,
        } => {
            commands::verify::run(config, &source, &target, database, user).await?;
        }
        Commands::Test {
            source,
            target,
            database,
            user,
            output,
        } => {
            commands::test::run(config, &source, &target, database, user, output).await?;
        }
    }

    Ok(())
}
