use preq::{Client, Payload, RequestOptions};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url = std::env::var("PREQ_BASE_URL").unwrap_or_else(|_| "https://httpbin.org".into());

    let client = Client::new();

    let status = client.get(format!("{base_url}/get"), None)?.await?;
    println!("GET {} -> {}", base_url, status.status);

    let created = client
        .post(
            format!("{base_url}/post"),
            RequestOptions::new()
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(json!({"name": "Kit"}))
                .retries(2),
        )?
        .await?;

    if let Payload::Json(body) = created.body {
        println!("{body:#}");
    }

    match client.get(format!("{base_url}/status/404"), None)?.await {
        Ok(response) => println!("unexpected success: {}", response.status),
        Err(err) => println!("rejected: {err}"),
    }

    Ok(())
}
