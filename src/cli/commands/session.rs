use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

pub async fn login(token: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut config = load_cli_config()?;
    config.token = Some(token);

    let whoami = ApiClient::from_config(&config)?.get("/api/access/whoami").await?;
    if whoami["authenticated"] != Value::Bool(true) {
        return Err(anyhow::anyhow!("The server did not accept this token"));
    }

    config.touch();
    save_cli_config(&config)?;

    let email = field(&whoami["session"]["value"], "email").to_string();
    output_success(&output_format, &format!("Logged in as {}", email), Some(whoami))
}

pub async fn logout(output_format: OutputFormat) -> anyhow::Result<()> {
    let mut config = load_cli_config()?;
    if config.token.is_none() {
        return output_success(&output_format, "Not logged in", None);
    }

    let result = ApiClient::from_config(&config)?.delete("/api/access/session").await;
    if let Err(e) = &result {
        // forget the token locally even if the server is gone
        tracing::warn!("Server logout failed: {}", e);
    }

    config.token = None;
    config.touch();
    save_cli_config(&config)?;

    output_success(&output_format, "Logged out", Some(json!({ "server_acknowledged": result.is_ok() })))
}

pub async fn whoami(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_cli_config()?;
    let data = ApiClient::from_config(&config)?.get("/api/access/whoami").await?;

    output_data(&output_format, &data, |data| {
        if data["authenticated"] != Value::Bool(true) {
            println!("Not logged in");
            return;
        }
        let identity = &data["session"]["value"];
        println!("User:     {} ({})", field(identity, "email"), field(identity, "id"));
        println!("Role:     {}", data["effective_role"].as_str().unwrap_or("loading"));
        match data["active_business_id"].as_i64() {
            Some(id) => println!("Business: {}", id),
            None => println!("Business: (none)"),
        }
    })
}

pub async fn route(path: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_cli_config()?;
    let client = ApiClient::from_config(&config)?;
    let data = client
        .get(&format!("/api/access/route?path={}", encode_path(&path)))
        .await?;

    output_data(&output_format, &data, |data| match field(data, "action") {
        "navigate" => println!("{} -> {}", path, field(data, "to")),
        "unauthenticated" => println!("{}: login required", path),
        "stay" => println!("{}: stay", path),
        other => println!("{}: {}", path, other),
    })
}

pub async fn navigation(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_cli_config()?;
    let data = ApiClient::from_config(&config)?.get("/api/access/navigation").await?;

    output_data(&output_format, &data, |data| {
        let items = data.as_array().cloned().unwrap_or_default();
        if items.is_empty() {
            println!("No navigation entries");
            return;
        }
        println!("{:<12} {:<22} {}", "CATEGORY", "TITLE", "PATH");
        println!("{}", "-".repeat(60));
        for item in &items {
            println!("{:<12} {:<22} {}", field(item, "category"), field(item, "title"), field(item, "path"));
        }
    })
}

fn encode_path(path: &str) -> String {
    url::form_urlencoded::byte_serialize(path.as_bytes()).collect()
}
