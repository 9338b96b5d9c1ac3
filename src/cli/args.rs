//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// BitBeheer website backend and price history tooling
#[derive(Parser, Debug)]
#[command(name = "bitbeheer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Maintain historical price CSV files
    Prices(PricesArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to, overrides SERVER_HOST
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on, overrides SERVER_PORT
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the prices command
#[derive(Parser, Debug)]
pub struct PricesArgs {
    #[command(subcommand)]
    pub action: PricesAction,
}

/// Price file actions
#[derive(Subcommand, Debug)]
pub enum PricesAction {
    /// Set the price of one day, keeping the higher value if the day exists
    Upsert {
        /// CSV file, created when missing
        #[arg(short, long)]
        file: PathBuf,
        /// Day in YYYY-MM-DD or DD-MM-YYYY
        #[arg(short, long)]
        date: String,
        /// Price, comma or dot decimal separator
        #[arg(short, long)]
        price: String,
    },
    /// Merge several CSV files into one
    Merge {
        /// Destination file; existing rows are kept
        #[arg(short, long)]
        output: PathBuf,
        /// Files to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Fetch today's price and upsert it
    FetchDaily {
        /// CSV file, created when missing
        #[arg(short, long)]
        file: PathBuf,
        /// Fiat currency code
        #[arg(short, long, default_value = "eur")]
        currency: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prices_merge() {
        let cli = Cli::parse_from([
            "bitbeheer", "prices", "merge", "--output", "all.csv", "a.csv", "b.csv",
        ]);
        match cli.command {
            Commands::Prices(PricesArgs {
                action: PricesAction::Merge { output, inputs },
            }) => {
                assert_eq!(output, PathBuf::from("all.csv"));
                assert_eq!(inputs.len(), 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_daily_defaults_to_eur() {
        let cli = Cli::parse_from(["bitbeheer", "prices", "fetch-daily", "--file", "eur.csv"]);
        match cli.command {
            Commands::Prices(PricesArgs {
                action: PricesAction::FetchDaily { currency, .. },
            }) => assert_eq!(currency, "eur"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
