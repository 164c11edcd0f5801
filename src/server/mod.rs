pub mod config;
pub mod route_builder;

use crate::{
    allocation::AllocationService,
    config::Config,
    database::{DatabaseManager, DatabaseManagerImpl},
    error::AppError,
    health::HealthService,
    metrics,
    report::ReportGenerator,
    routes::{create_api_routes, create_health_routes},
    server::route_builder::request_response_logger,
    shutdown::{DatabaseShutdown, ShutdownCoordinator, ShutdownManager},
};
use axum::{Router, extract::DefaultBodyLimit, middleware};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Upper bound for allocation uploads (10MB)
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub database: Arc<dyn DatabaseManager>,
    pub health_service: Arc<HealthService>,
    pub allocation_service: Arc<AllocationService>,
    pub report_generator: ReportGenerator,
    pub shutdown_coordinator: Arc<ShutdownCoordinator>,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        if config.metrics.enabled {
            metrics::init_metrics_with_port(config.metrics.port).map_err(|e| {
                error!(
                    "Failed to start metrics server on port {}: {}",
                    config.metrics.port, e
                );
                AppError::Internal(format!("Failed to start metrics server: {}", e))
            })?;
        }

        let database_impl = Arc::new(DatabaseManagerImpl::new_from_config(&config).await?);
        let database: Arc<dyn DatabaseManager> = database_impl.clone();

        let health_service = Arc::new(HealthService::new());
        health_service.register(database_impl).await;

        Ok(Self::with_database(config, database, health_service))
    }

    /// Assemble services around an already connected database
    pub fn with_database(
        config: Config,
        database: Arc<dyn DatabaseManager>,
        health_service: Arc<HealthService>,
    ) -> Self {
        let allocation_service = Arc::new(AllocationService::new(
            database.clone(),
            config.csv.import_dialect(),
        ));
        let report_generator = ReportGenerator::new(database.clone());

        Self {
            config: Arc::new(config),
            database,
            health_service,
            allocation_service,
            report_generator,
            shutdown_coordinator: Arc::new(ShutdownCoordinator::new()),
        }
    }

    pub async fn run(&self) -> Result<(), AppError> {
        if self.config.database.migration_on_startup {
            self.database.migrate().await?;
        }

        let mut shutdown_manager = ShutdownManager::new(Duration::from_secs(30));
        shutdown_manager.register(DatabaseShutdown::new(self.database.clone()));

        let app = self.create_app();

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

        info!("Server listening on http://{}", addr);

        let shutdown_coordinator = self.shutdown_coordinator.clone();
        tokio::spawn(async move {
            shutdown_coordinator.wait_for_shutdown_signal().await;
        });

        let mut shutdown_rx = self.shutdown_coordinator.subscribe();
        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            info!("Graceful shutdown initiated");
        })
        .await;

        if let Err(e) = result {
            error!("Server error: {}", e);
        }

        shutdown_manager.shutdown_all().await;
        info!("Server shutdown complete");

        Ok(())
    }

    pub fn create_app(&self) -> Router {
        let app = Router::new()
            .nest("/health", create_health_routes())
            .nest(
                "/api",
                create_api_routes().layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
            )
            .with_state(self.clone());

        self.add_conditional_middleware(app)
    }

    fn add_conditional_middleware(&self, mut app: Router) -> Router {
        if self.config.metrics.enabled {
            app = app.layer(middleware::from_fn(metrics::metrics_middleware));
        }
        if self.config.logging.log_request {
            app = app.layer(middleware::from_fn(request_response_logger));
        }
        app
    }
}
