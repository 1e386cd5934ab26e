//! Address service HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use crate::address::handlers::*;
use crate::address::service::AddressService;
use crate::config::ServiceConfig;
use crate::http::with_request_layers;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiterState};

pub struct AddressServer {
    router: Router,
    service: Arc<AddressService>,
}

impl AddressServer {
    pub fn new(config: &ServiceConfig) -> Self {
        let service = Arc::new(AddressService::new(&config.address_service));
        let limiter = Arc::new(RateLimiterState::new(
            "address",
            &config.address_service.rate_limit,
        ));

        let router = Router::new()
            .route("/api/v1/address", get(get_all_addresses))
            .route(
                "/api/v1/address/{id}",
                get(get_address_by_id)
                    .route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware)),
            )
            .route("/api/v1/address/nolimit/{id}", get(get_unlimited_address_by_id))
            .route("/api/v1/flaky", get(get_all_flaky))
            .route("/api/v1/flaky/{code}", get(get_flaky_by_code))
            .route("/health", get(health))
            .with_state(service.clone());

        let router = with_request_layers(router, Duration::from_secs(config.timeouts.request_secs));
        Self { router, service }
    }

    pub fn service(&self) -> Arc<AddressService> {
        self.service.clone()
    }

    /// Serve until `shutdown` fires, applying catalogue updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Address service starting");

        let service = self.service.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                service.reload(&config.address_service);
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Address service received shutdown signal");
            })
            .await?;

        tracing::info!("Address service stopped");
        Ok(())
    }
}
