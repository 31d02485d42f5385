//! Reboot a camera over ISAPI.
//!
//! Demonstrates the async client and opt-in status checking with
//! `error_for_status`.
//!
//! Run with: cargo run --example reboot_device -- <host> <username> <password>

use anyhow::Result;
use isapi_client::{AsyncClient, ClientConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("isapi_client=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "192.168.1.64".to_string());
    let username = args.next().unwrap_or_else(|| "admin".to_string());
    let password = args.next().unwrap_or_else(|| "12345".to_string());

    println!("ISAPI Reboot Example");
    println!("====================\n");

    let client = AsyncClient::open(ClientConfig::new(host, username, password))?;

    let response = client
        .put("/ISAPI/System/reboot", "")
        .await?
        .error_for_status()?;
    println!("reboot accepted: {}", response.status());

    client.close();
    Ok(())
}
