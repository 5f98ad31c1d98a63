use clap::Subcommand;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::types::Identity;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint a development token for a gateway running IDENTITY_MODE=jwt")]
    Mint {
        #[arg(help = "User id (token subject)")]
        user_id: String,
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Signing secret (defaults to JWT_SECRET)")]
        secret: Option<String>,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
        #[arg(long, help = "Store the token as the CLI's current session")]
        save: bool,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Mint {
            user_id,
            email,
            secret,
            hours,
            save,
        } => {
            let identity = Identity::new(user_id, email);
            let claims = match hours {
                Some(hours) => Claims::new(&identity, hours),
                None => Claims::for_identity(&identity),
            };
            let secret = secret.unwrap_or_else(|| config().security.jwt_secret.clone());
            let token = generate_jwt(&claims, &secret)?;

            if save {
                let mut cli_config = crate::cli::config::load_cli_config()?;
                cli_config.token = Some(token.clone());
                cli_config.touch();
                crate::cli::config::save_cli_config(&cli_config)?;
            }

            match output_format {
                OutputFormat::Text => println!("{}", token),
                OutputFormat::Json => output_success(
                    &output_format,
                    &format!("Token minted for '{}'", identity.id),
                    Some(json!({ "token": token, "expires_at": claims.exp, "saved": save })),
                )?,
            }
            Ok(())
        }
    }
}
