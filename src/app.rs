use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::services::DatasetService;

/// Loaded dataset plus the running HTTP server
pub struct Application {
    pub dataset_service: DatasetService,
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Load the dataset once and start serving queries over it
    ///
    /// A source that cannot be read does not stop startup: the service
    /// serves an empty dataset with the failure reason until a reload
    /// succeeds.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let dataset_service =
            DatasetService::initialize(config.data_source(), config.normalization.clone()).await;
        let dataset = dataset_service.info();
        match &dataset.failure_reason {
            Some(reason) => info!("Starting without data: {}", reason),
            None => info!(
                "Dataset ready: {} observations ({:?} to {:?})",
                dataset.total_observations, dataset.min_date, dataset.max_date
            ),
        }

        let app_state = AppState {
            dataset_service: dataset_service.clone(),
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

        info!("Application initialized successfully");

        Ok(Self {
            dataset_service,
            server_handle,
        })
    }

    /// Run until the server stops (which runs indefinitely unless error)
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
