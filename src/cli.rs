use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "foliocms")]
#[command(author, version, about = "Headless portfolio CMS backend")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Trigger a frontend deployment and poll it until it settles
    Deploy {
        /// Fire the hook and exit without polling
        #[arg(long)]
        no_wait: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,

    /// Generate a bcrypt password hash for authentication
    HashPassword {
        /// Password to hash
        password: String,
    },

    /// Generate a random API key for programmatic access
    GenerateApiKey,
}
