use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum BusinessCommands {
    #[command(about = "List your business memberships")]
    List,

    #[command(about = "Select the active business")]
    Select {
        #[arg(help = "Business id")]
        business_id: i64,
    },
}

pub async fn handle(cmd: BusinessCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_cli_config()?;
    let client = ApiClient::from_config(&config)?;

    match cmd {
        BusinessCommands::List => {
            let data = client.get("/api/access/business").await?;

            output_data(&output_format, &data, |data| {
                let options = data["options"].as_array().cloned().unwrap_or_default();
                if options.is_empty() {
                    println!("No business memberships");
                    return;
                }
                let active = data["active_business_id"].as_i64();
                println!("{:<8} {}", "ID", "BUSINESS");
                println!("{}", "-".repeat(40));
                for option in &options {
                    let id = option["business_id"].as_i64();
                    let marker = if id.is_some() && id == active { "*" } else { " " };
                    println!(
                        "{}{:<7} {}",
                        marker,
                        id.map(|id| id.to_string()).unwrap_or_default(),
                        field(option, "label")
                    );
                }
            })
        }
        BusinessCommands::Select { business_id } => {
            let data = client
                .put("/api/access/business", &json!({ "business_id": business_id }))
                .await?;

            output_success(
                &output_format,
                &format!("Active business is now {}", business_id),
                Some(data),
            )
        }
    }
}
