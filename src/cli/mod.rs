pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "fa")]
#[command(about = "Finance Access CLI - inspect sessions, routing and business selection")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Development token management")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Gateway server selection")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Store a bearer token and show who it belongs to")]
    Login {
        #[arg(help = "Bearer token")]
        token: String,
    },

    #[command(about = "End the session on the server and forget the token")]
    Logout,

    #[command(about = "Show session, profile and active business")]
    Whoami,

    #[command(about = "Ask where the gateway would send you for a path")]
    Route {
        #[arg(help = "Path, e.g. / or /dashboard")]
        path: String,
    },

    #[command(about = "Show the navigation entries visible to you")]
    Nav,

    #[command(about = "Business memberships and selection")]
    Business {
        #[command(subcommand)]
        cmd: commands::business::BusinessCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
        Commands::Login { token } => commands::session::login(token, output_format).await,
        Commands::Logout => commands::session::logout(output_format).await,
        Commands::Whoami => commands::session::whoami(output_format).await,
        Commands::Route { path } => commands::session::route(path, output_format).await,
        Commands::Nav => commands::session::navigation(output_format).await,
        Commands::Business { cmd } => commands::business::handle(cmd, output_format).await,
    }
}
