//! Fetch device information from a camera.
//!
//! Demonstrates the blocking client: one digest handshake on the first
//! request, preemptive credentials on the second.
//!
//! Run with: cargo run --example device_info -- <host> <username> <password>

use anyhow::Result;
use isapi_client::{Client, ClientConfig};

fn main() -> Result<()> {
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

    println!("ISAPI Device Info Example");
    println!("=========================\n");

    let client = Client::open(ClientConfig::new(host, username, password))?;

    let response = client.get("/ISAPI/System/deviceInfo")?;
    println!("status: {}", response.status());
    println!("{}", response.text());

    // The challenge is cached now; this one carries credentials up front.
    let response = client.get("/ISAPI/System/status")?;
    println!("status: {}", response.status());
    println!("authenticated: {}", client.is_authenticated());

    client.close();
    Ok(())
}
