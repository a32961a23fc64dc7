//! Server handlers

use crate::AppConfig;
use crate::Result;

pub async fn handle_serve_api(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    no_cors: bool,
) -> Result<()> {
    use crate::api::serve_api;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = config.server.cors && !no_cors;

    println!("🚀 Starting Twiq API Server");
    println!("===========================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!();

    serve_api(config, host, port, cors).await
}

pub async fn handle_serve_portal(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    use crate::portal::serve_portal;

    let host = host.unwrap_or_else(|| config.portal.host.clone());
    let port = port.unwrap_or(config.portal.port);

    println!("🚀 Starting Twiq Portal");
    println!("=======================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🔗 API: {}", config.portal.api_base_url);
    println!();

    serve_portal(config, host, port).await
}
