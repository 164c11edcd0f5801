use crate::database::DatabaseManager;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{signal, sync::watch, time::timeout};
use tracing::{error, info, warn};

/// Turns SIGINT/SIGTERM into a broadcast shutdown flag
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown_requested: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Relaxed)
    }

    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_requested
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
        {
            info!("Initiating graceful shutdown...");
            if let Err(e) = self.shutdown_tx.send(true) {
                error!("Failed to broadcast shutdown signal: {}", e);
            }
        }
    }

    /// Resolves on Ctrl+C, SIGTERM or an explicit [`initiate_shutdown`](Self::initiate_shutdown)
    pub async fn wait_for_shutdown_signal(&self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        let mut requested = self.subscribe();
        let explicit = async move {
            while !*requested.borrow_and_update() {
                if requested.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C signal"),
            _ = terminate => info!("Received terminate signal"),
            _ = explicit => info!("Shutdown requested"),
        }

        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
pub trait GracefulShutdown {
    fn name(&self) -> &str;

    async fn shutdown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Runs registered components' shutdown in registration order, each bounded by a timeout
pub struct ShutdownManager {
    components: Vec<Box<dyn GracefulShutdown + Send + Sync>>,
    timeout_duration: Duration,
}

impl ShutdownManager {
    pub fn new(timeout_duration: Duration) -> Self {
        Self {
            components: Vec::new(),
            timeout_duration,
        }
    }

    pub fn register<T>(&mut self, component: T)
    where
        T: GracefulShutdown + Send + Sync + 'static,
    {
        self.components.push(Box::new(component));
    }

    pub async fn shutdown_all(&self) {
        info!("Shutting down {} components...", self.components.len());

        for component in &self.components {
            let name = component.name();
            match timeout(self.timeout_duration, component.shutdown()).await {
                Ok(Ok(())) => info!("Successfully shut down component: {}", name),
                Ok(Err(e)) => error!("Error shutting down component {}: {}", name, e),
                Err(_) => error!("Timeout shutting down component: {}", name),
            }
        }

        info!("Shutdown complete");
    }
}

/// Closes the connection pool once the HTTP server has drained
pub struct DatabaseShutdown {
    database: Arc<dyn DatabaseManager>,
}

impl DatabaseShutdown {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }
}

#[async_trait::async_trait]
impl GracefulShutdown for DatabaseShutdown {
    fn name(&self) -> &str {
        "Database"
    }

    async fn shutdown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.database.connection().clone().close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_initiate_shutdown_notifies_subscribers() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx = coordinator.subscribe();
        assert!(!coordinator.is_shutdown_requested());

        coordinator.initiate_shutdown();
        coordinator.initiate_shutdown();

        assert!(coordinator.is_shutdown_requested());
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn test_wait_returns_after_explicit_request() {
        let coordinator = ShutdownCoordinator::new();
        let waiter = coordinator.clone();
        let handle = tokio::spawn(async move { waiter.wait_for_shutdown_signal().await });

        coordinator.initiate_shutdown();
        timeout(Duration::from_secs(1), handle)
            .await
            .expect("wait_for_shutdown_signal did not return")
            .unwrap();
    }

    struct Counting(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl GracefulShutdown for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn shutdown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Stuck;

    #[async_trait::async_trait]
    impl GracefulShutdown for Stuck {
        fn name(&self) -> &str {
            "stuck"
        }

        async fn shutdown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_manager_survives_stuck_component() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = ShutdownManager::new(Duration::from_millis(20));
        manager.register(Stuck);
        manager.register(Counting(calls.clone()));

        manager.shutdown_all().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
