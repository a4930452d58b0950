use std::env;

use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let port = env::var("PORT").unwrap_or_else(|_| {
        info!("PORT not set, using default: 8000");
        "8000".to_string()
    });
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;

    tokio::select! {
        result = mock_server::run(listener) => result,
        _ = signal::ctrl_c() => {
            info!("received Ctrl+C, shutting down");
            Ok(())
        }
    }
}
