use mock_server::Settings;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let settings = Settings {
        api_key: std::env::var("ORDER_API_KEY").ok().filter(|k| !k.is_empty()),
        ..Settings::default()
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, api_key_configured = settings.api_key.is_some(), "listening");
    mock_server::run(listener, settings).await
}
