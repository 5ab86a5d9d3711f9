//! Standalone launcher for the upstream API emulation, for poking the
//! fixture endpoints with curl. The integration tests start the server
//! in-process instead and never go through this binary.

use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "8817".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("mock API listening on {addr}");
    mock_server::run(listener).await
}
