use log::info;
use mock_server::MockKeys;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    env_logger::init();
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let defaults = MockKeys::default();
    let keys = MockKeys {
        api_key: std::env::var("GOVDATA_API_KEY").unwrap_or(defaults.api_key),
        shared_secret: std::env::var("GOVDATA_SHARED_SECRET").unwrap_or(defaults.shared_secret),
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    mock_server::run(listener, keys).await
}
