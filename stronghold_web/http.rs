use axum::{
    Router,
    routing::{get, post},
};
use std::{io::Error, net::SocketAddr};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use stronghold_app::construction::ConstructionQueueManager;
use stronghold_types::errors::ApplicationError;

use crate::handlers::{
    building_info, cancel_upgrade, complete_upgrade, process_queue, queue_status,
    register_village, start_upgrade, time_remaining, village_resources,
};

#[derive(Clone)]
pub struct AppState {
    pub manager: ConstructionQueueManager,
}

impl AppState {
    pub fn new(manager: ConstructionQueueManager) -> AppState {
        AppState { manager }
    }
}

pub struct WebRouter {}

impl WebRouter {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/villages", post(register_village))
            .route("/villages/{village_id}/resources", get(village_resources))
            .route("/villages/{village_id}/queue", get(queue_status))
            .route("/villages/{village_id}/queue/process", post(process_queue))
            .route(
                "/villages/{village_id}/buildings/{building}",
                get(building_info),
            )
            .route(
                "/villages/{village_id}/buildings/{building}/time-remaining",
                get(time_remaining),
            )
            .route(
                "/villages/{village_id}/buildings/{building}/upgrade",
                post(start_upgrade),
            )
            .route(
                "/villages/{village_id}/buildings/{building}/cancel",
                post(cancel_upgrade),
            )
            .route(
                "/villages/{village_id}/buildings/{building}/complete",
                post(complete_upgrade),
            )
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve(state: AppState, port: u16) -> Result<(), ApplicationError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(infra_error)?;
        Self::serve_with_listener(state, listener).await
    }

    /// Serves on an already bound listener, e.g. one on an ephemeral port.
    pub async fn serve_with_listener(
        state: AppState,
        listener: TcpListener,
    ) -> Result<(), ApplicationError> {
        let router = Self::router(state);

        if let Ok(addr) = listener.local_addr() {
            tracing::info!("HTTP Server started, listening on http://{}", addr);
        }
        axum::serve(listener, router).await.map_err(infra_error)?;

        Ok(())
    }
}

fn infra_error(e: Error) -> ApplicationError {
    let err = format!("{:#?}", e);
    ApplicationError::Infrastructure(err)
}
