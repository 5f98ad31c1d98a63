use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at a gateway")]
    Set {
        #[arg(help = "Gateway base URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Show the current gateway and session")]
    Show,

    #[command(about = "Health check the current gateway")]
    Ping,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid server url '{}': {}", url, e))?;

            let server_url = parsed.as_str().trim_end_matches('/').to_string();

            let mut config = load_cli_config()?;
            if config.server_url != server_url {
                // tokens belong to the gateway that accepted them
                config.token = None;
            }
            config.server_url = server_url;
            config.touch();
            save_cli_config(&config)?;

            output_success(
                &output_format,
                &format!("Server set to {}", config.server_url),
                Some(json!({ "server_url": config.server_url })),
            )
        }
        ServerCommands::Show => {
            let config = load_cli_config()?;
            let data = json!({
                "server_url": config.server_url,
                "logged_in": config.token.is_some(),
                "token": config.token.as_deref().map(mask_token),
                "updated_at": config.updated_at,
            });

            output_data(&output_format, &data, |_| {
                println!("Server: {}", config.server_url);
                match &config.token {
                    Some(token) => println!("Token:  {}", mask_token(token)),
                    None => println!("Token:  (not logged in)"),
                }
            })
        }
        ServerCommands::Ping => {
            let config = load_cli_config()?;
            let client = ApiClient::from_config(&config)?;

            if client.health().await {
                output_success(
                    &output_format,
                    &format!("{} is up", config.server_url),
                    Some(json!({ "status": "up" })),
                )
            } else {
                Err(anyhow::anyhow!("{} is not responding", config.server_url))
            }
        }
    }
}
