#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{http::HeaderMap, http::StatusCode as AxumStatus, routing::get, Json, Router};
use reqwest::{redirect, Client, StatusCode};
use serde_json::{json, Value};

use finance_access::auth::{generate_jwt, validate_jwt, Claims};
use finance_access::types::Identity;

pub const JWT_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let profile_url = spawn_profile_backend()?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_finance-access"));
        cmd.env("APP_ENV", "development")
            .env("FA_PORT", port.to_string())
            .env("IDENTITY_MODE", "jwt")
            .env("JWT_SECRET", JWT_SECRET)
            .env("PROFILE_URL", profile_url)
            .env("RUST_LOG", "finance_access=debug")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that reports redirects instead of following them
pub fn client() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .expect("client")
}

/// Token for `user_id`, signed with the server's secret
pub fn mint(user_id: &str) -> String {
    let identity = Identity::new(user_id, format!("{}@example.com", user_id));
    generate_jwt(&Claims::new(&identity, 1), JWT_SECRET).expect("mint token")
}

pub async fn body(response: reqwest::Response) -> Value {
    response.json().await.expect("json body")
}

pub fn location(response: &reqwest::Response) -> String {
    response.headers()["location"].to_str().unwrap_or_default().to_string()
}

/// Profile backend on its own thread and runtime so it outlives each test's runtime.
///
/// Known users: `admin-*` (super admin), `clerk-*` (data entry), `owner-*`
/// (owner with two businesses). Anyone else gets a 404.
fn spawn_profile_backend() -> Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("profile backend runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("profile listener");
            let app = Router::new().route("/profile", get(profile));
            axum::serve(listener, app).await.expect("profile backend");
        });
    });

    Ok(format!("http://{}/profile", addr))
}

async fn profile(headers: HeaderMap) -> Result<Json<Value>, AxumStatus> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AxumStatus::UNAUTHORIZED)?;
    let claims = validate_jwt(token, JWT_SECRET).map_err(|_| AxumStatus::UNAUTHORIZED)?;

    let user = claims.sub.as_str();
    if user.starts_with("admin-") {
        Ok(Json(json!({ "role": "admin", "business_memberships": [] })))
    } else if user.starts_with("clerk-") {
        Ok(Json(json!({ "role": "data_entry", "business_memberships": [] })))
    } else if user.starts_with("owner-") {
        Ok(Json(json!({
            "role": "owner",
            "business_memberships": [
                { "business_id": 1, "business_name": "Acme Bakery", "role_within_business": "staff" },
                { "business_id": 2, "business_name": "Acme Catering", "role_within_business": "business_admin" }
            ]
        })))
    } else {
        Err(AxumStatus::NOT_FOUND)
    }
}
