//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use campus_services::config::ServiceConfig;
use campus_services::lifecycle::Shutdown;
use campus_services::model::AddressResponse;
use campus_services::resilience::ResilienceRegistry;
use campus_services::{AddressServer, StudentServer};

pub fn address(id: i64, city: &str) -> AddressResponse {
    AddressResponse {
        id,
        street: format!("{id} College Ave"),
        city: city.to_string(),
        state: "NJ".to_string(),
        postal_code: "08901".to_string(),
        country: "US".to_string(),
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request path and returns the status and JSON body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") && read < buf.len() {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                }
                let head = String::from_utf8_lossy(&buf[..read]);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = f(path).await;
                let reason = StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown");

                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len(),
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });

    addr
}

/// Run an address service on an ephemeral port.
pub async fn start_address_service(config: &ServiceConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let (_, updates) = tokio::sync::mpsc::unbounded_channel();

    let server = AddressServer::new(config);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, updates, rx).await;
    });

    (addr, shutdown)
}

/// Run a student service pointed at `upstream` on an ephemeral port.
pub async fn start_student_service(
    mut config: ServiceConfig,
    upstream: SocketAddr,
) -> (SocketAddr, Shutdown, Arc<ResilienceRegistry>) {
    config.student_service.address_base_url = format!("http://{upstream}");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = StudentServer::new(&config).unwrap();
    let registry = server.registry();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown, registry)
}
