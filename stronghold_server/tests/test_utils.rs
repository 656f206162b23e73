#[cfg(test)]
pub mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use reqwest::{Client, RequestBuilder, Response};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use uuid::Uuid;

    use stronghold_app::{
        app::{AppBus, AppContext},
        clock::ManualClock,
        config::Config,
        construction::ConstructionQueueManager,
    };
    use stronghold_db::memory::InMemoryUnitOfWorkProvider;
    use stronghold_game::models::catalog::BuildingCatalog;
    use stronghold_web::{AppState, WebRouter, handlers::PLAYER_HEADER};

    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    /// A server on an ephemeral port, backed by in-memory storage and a manual clock.
    pub struct TestApp {
        pub base_url: String,
        pub client: Client,
        pub clock: Arc<ManualClock>,
        #[allow(dead_code)]
        pub manager: ConstructionQueueManager,
    }

    #[allow(dead_code)]
    impl TestApp {
        pub fn get(&self, player_id: Uuid, path: &str) -> RequestBuilder {
            self.client
                .get(format!("{}{}", self.base_url, path))
                .header(PLAYER_HEADER, player_id.to_string())
        }

        pub fn post(&self, player_id: Uuid, path: &str) -> RequestBuilder {
            self.client
                .post(format!("{}{}", self.base_url, path))
                .header(PLAYER_HEADER, player_id.to_string())
        }

        pub async fn register_village(&self, player_id: Uuid, village_id: u32) -> Response {
            self.post(player_id, "/villages")
                .json(&json!({
                    "village_id": village_id,
                    "world_id": Uuid::new_v4(),
                    "name": format!("Village {village_id}"),
                    "x": 0,
                    "y": 0,
                }))
                .send()
                .await
                .unwrap()
        }
    }

    #[allow(dead_code)]
    pub async fn setup_web_app(config: Config) -> TestApp {
        let clock = Arc::new(ManualClock::new(t0()));
        let context = AppContext::new(
            Arc::new(config),
            Arc::new(BuildingCatalog::standard()),
            clock.clone(),
        );
        let app_bus = Arc::new(AppBus::new(
            context,
            Arc::new(InMemoryUnitOfWorkProvider::new()),
        ));
        let manager = ConstructionQueueManager::new(app_bus);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(WebRouter::serve_with_listener(
            AppState::new(manager.clone()),
            listener,
        ));

        TestApp {
            base_url: format!("http://{}", addr),
            client: Client::new(),
            clock,
            manager,
        }
    }
}
