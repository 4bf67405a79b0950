//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod extract;
mod init;
mod invite;
mod serve;
mod token;
mod tools;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "study-buddy")]
#[command(about = "Study Buddy backend: OCR, AI quizzes, flashcards, highlights and invites")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config file and STUDY_BUDDY_DATA_DIR)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Start the API server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 127.0.0.1:3030)
        #[arg(default_value = "127.0.0.1:3030")]
        bind: String,
    },

    /// Extract text from a file and print it
    Extract {
        /// PDF, image, or text file
        file: PathBuf,
    },

    /// Extract text from a file and generate a quiz from it
    Quiz {
        /// PDF, image, or text file
        file: PathBuf,
        /// Extra instructions for the quiz (e.g. "focus on chapter 2")
        #[arg(short, long)]
        refine: Option<String>,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Manage invite codes
    Invite {
        #[command(subcommand)]
        command: InviteCommands,
    },

    /// Check OCR tools and LLM availability
    Tools,
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Issue a new API token (printed once)
    Issue {
        /// User ID the token authenticates as
        #[arg(short, long)]
        user: String,
        /// Restaurant the user belongs to
        #[arg(short, long)]
        restaurant: Option<String>,
        /// Grant admin rights
        #[arg(long)]
        admin: bool,
    },
    /// Revoke an API token
    Revoke {
        /// The token to revoke
        token: String,
    },
}

#[derive(Subcommand)]
enum InviteCommands {
    /// Create an invite code for a restaurant
    Create {
        #[arg(short, long)]
        restaurant: String,
        /// Recorded as the invite's creator
        #[arg(long, default_value = "cli")]
        created_by: String,
    },
    /// List invite codes for a restaurant
    List {
        #[arg(short, long)]
        restaurant: String,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data: cli.data,
    };
    let (settings, config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Serve { bind } => serve::cmd_serve(&settings, &config, &bind).await,
        Commands::Extract { file } => extract::cmd_extract(&config, &file).await,
        Commands::Quiz { file, refine } => {
            extract::cmd_quiz(&config, &file, refine.as_deref()).await
        }
        Commands::Token { command } => match command {
            TokenCommands::Issue {
                user,
                restaurant,
                admin,
            } => token::cmd_token_issue(&settings, &user, restaurant.as_deref(), admin).await,
            TokenCommands::Revoke { token } => token::cmd_token_revoke(&settings, &token).await,
        },
        Commands::Invite { command } => match command {
            InviteCommands::Create {
                restaurant,
                created_by,
            } => invite::cmd_invite_create(&settings, &restaurant, &created_by).await,
            InviteCommands::List { restaurant } => {
                invite::cmd_invite_list(&settings, &restaurant).await
            }
        },
        Commands::Tools => tools::cmd_tools(&config).await,
    }
}
