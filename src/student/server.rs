//! Student service HTTP server.
//!
//! # Responsibilities
//! - Build the resilience registry from the configured policies
//! - Bind each outbound operation to the policy its route names
//! - Mount the admin API when enabled
//!
//! # Data Flow
//! ```text
//! GET /api/v1/student/address/{id}
//!     → AddressProxyService → Policy (retry → breaker → bulkhead → timeout)
//!     → AddressApi → address service
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::admin::setup_admin_router;
use crate::config::ServiceConfig;
use crate::http::with_request_layers;
use crate::resilience::ResilienceRegistry;
use crate::student::client::{AddressApi, ClientBuildError, HttpAddressClient};
use crate::student::flaky::FlakyService;
use crate::student::handlers::*;
use crate::student::service::AddressProxyService;

/// Shared state for student handlers.
pub struct StudentState {
    pub addresses: AddressProxyService,
    pub flaky: FlakyService,
}

pub struct StudentServer {
    router: Router,
    registry: Arc<ResilienceRegistry>,
}

impl StudentServer {
    /// Build the server with an HTTP client for the configured address service.
    pub fn new(config: &ServiceConfig) -> Result<Self, ClientBuildError> {
        let client = HttpAddressClient::new(&config.student_service)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Build the server around any [`AddressApi`] implementation.
    pub fn with_client(config: &ServiceConfig, client: Arc<dyn AddressApi>) -> Self {
        let registry = Arc::new(ResilienceRegistry::from_config(&config.policies));
        let routes = &config.student_service.routes;

        let state = Arc::new(StudentState {
            addresses: AddressProxyService::new(
                client.clone(),
                registry.get_or_passthrough(&routes.address),
                registry.get_or_passthrough(&routes.address_nolimit),
            ),
            flaky: FlakyService::new(client, registry.get_or_passthrough(&routes.flaky)),
        });

        let mut router = Router::new()
            .route("/api/v1/student/address/{id}", get(get_student_address))
            .route("/api/v1/student/address/nolimit/{id}", get(get_student_address_no_limit))
            .route("/api/v1/student/flaky", get(get_all_flaky))
            .route("/api/v1/student/flaky/{code}", get(get_flaky_by_code))
            .route("/health", get(health))
            .with_state(state);

        if config.admin.enabled {
            router = router.merge(setup_admin_router(registry.clone(), &config.admin.api_key));
        }

        let router = with_request_layers(router, Duration::from_secs(config.timeouts.request_secs));
        Self { router, registry }
    }

    pub fn registry(&self) -> Arc<ResilienceRegistry> {
        self.registry.clone()
    }

    /// Serve until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            policies = self.registry.snapshots().len(),
            "Student service starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Student service received shutdown signal");
            })
            .await?;

        tracing::info!("Student service stopped");
        Ok(())
    }
}
