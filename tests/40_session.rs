mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn whoami_reports_identity_and_role() -> Result<()> {
    let server = common::ensure_server().await?;
    let body = common::body(
        common::client()
            .get(server.url("/api/access/whoami"))
            .bearer_auth(common::mint("clerk-whoami"))
            .send()
            .await?,
    )
    .await;

    assert_eq!(body["data"]["authenticated"], true);
    assert_eq!(body["data"]["effective_role"], "data_entry");
    assert_eq!(body["data"]["session"]["value"]["id"], "clerk-whoami");
    Ok(())
}

#[tokio::test]
async fn logout_turns_token_anonymous() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();
    let token = common::mint("owner-logout");

    let before = client.get(server.url("/")).bearer_auth(&token).send().await?;
    assert_eq!(before.status(), StatusCode::SEE_OTHER);

    let logout = client
        .delete(server.url("/api/access/session"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(logout.status(), StatusCode::OK);

    let after = client.get(server.url("/")).bearer_auth(&token).send().await?;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_without_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let response = common::client()
        .delete(server.url("/api/access/session"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::body(response).await["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn navigation_follows_role() -> Result<()> {
    let server = common::ensure_server().await?;
    let items = common::body(
        common::client()
            .get(server.url("/api/access/navigation"))
            .bearer_auth(common::mint("owner-nav"))
            .send()
            .await?,
    )
    .await;

    let titles: Vec<&str> = items["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["title"].as_str()).collect())
        .unwrap_or_default();
    // active business defaults to the first membership, where the owner is staff
    assert!(titles.contains(&"My Dashboard"));
    assert!(!titles.contains(&"Cash Flow"));
    Ok(())
}
