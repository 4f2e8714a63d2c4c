//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use incubator_app::ports::{ProfileSource, SerialLink};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API routes under `/api` and adds a [`TraceLayer`] that logs each
/// HTTP request/response at the `DEBUG` level.
pub fn build<L, P>(state: AppState<L, P>) -> Router
where
    L: SerialLink + 'static,
    P: ProfileSource + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use axum::response::Response;
    use incubator_app::actuator_driver::ActuatorDriver;
    use incubator_app::reading_store::LatestReadingStore;
    use incubator_app::services::IncubatorService;
    use incubator_app::supervisor::SupervisorSettings;
    use incubator_domain::actuator::Command;
    use incubator_domain::error::IncubatorError;
    use incubator_domain::profile::{Setpoints, Species};
    use incubator_domain::reading::SensorReading;
    use incubator_domain::time::now;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct StubLink {
        failing: Arc<Mutex<HashSet<Command>>>,
    }

    impl SerialLink for StubLink {
        async fn send_command(&self, command: Command) -> Result<(), IncubatorError> {
            if self.failing.lock().unwrap().contains(&command) {
                return Err(IncubatorError::CommandFailed {
                    command,
                    source: "device disconnected".into(),
                });
            }
            Ok(())
        }
    }

    struct StubProfiles;

    impl ProfileSource for StubProfiles {
        async fn setpoints_for(
            &self,
            species: Species,
        ) -> Result<Option<Setpoints>, IncubatorError> {
            Ok((species == Species::Chicken).then(|| Setpoints::new(37.5, 60.0)))
        }
    }

    struct TestApp {
        store: LatestReadingStore,
        link: StubLink,
        router: Router,
    }

    fn test_app() -> TestApp {
        let store = LatestReadingStore::new();
        let link = StubLink::default();
        let service = IncubatorService::new(
            store.clone(),
            Arc::new(ActuatorDriver::new(link.clone())),
            StubProfiles,
            SupervisorSettings {
                tick: Duration::from_millis(50),
                shutdown_timeout: Duration::from_secs(1),
            },
        );
        TestApp {
            store,
            link,
            router: build(AppState::new(service)),
        }
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        };
        router.clone().oneshot(request.unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = test_app();
        let response = send(&app.router, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_no_content_before_first_reading() {
        let app = test_app();
        let response = send(&app.router, Method::GET, "/api/data", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn should_return_latest_reading() {
        let app = test_app();
        app.store.set(SensorReading::new(37.25, 61.5, now()));

        let response = send(&app.router, Method::GET, "/api/data", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["temperature"], json!(37.25));
        assert_eq!(body["humidity"], json!(61.5));
    }

    #[tokio::test]
    async fn should_switch_mode_and_report_status() {
        let app = test_app();

        let response = send(
            &app.router,
            Method::PUT,
            "/api/mode",
            Some(json!({"mode": "automatic"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["mode"], json!("automatic"));
        assert_eq!(body["loop_state"], json!("running"));

        let response = send(
            &app.router,
            Method::PUT,
            "/api/mode",
            Some(json!({"mode": "manual"})),
        )
        .await;
        let body = json_body(response).await;
        assert_eq!(body["mode"], json!("manual"));
        assert_eq!(body["loop_state"], json!("idle"));
    }

    #[tokio::test]
    async fn should_reject_unknown_mode() {
        let app = test_app();
        let response = send(
            &app.router,
            Method::PUT,
            "/api/mode",
            Some(json!({"mode": "turbo"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("turbo"));
    }

    #[tokio::test]
    async fn should_select_profile() {
        let app = test_app();
        let response = send(
            &app.router,
            Method::PUT,
            "/api/profile",
            Some(json!({"species": "Chicken"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["species"], json!("chicken"));
        assert_eq!(body["setpoints"]["temperature"], json!(37.5));
    }

    #[tokio::test]
    async fn should_return_not_found_for_species_without_profile() {
        let app = test_app();
        let response = send(
            &app.router,
            Method::PUT,
            "/api/profile",
            Some(json!({"species": "turkey"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_reject_unknown_species() {
        let app = test_app();
        let response = send(
            &app.router,
            Method::PUT,
            "/api/profile",
            Some(json!({"species": "ostrich"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_drive_actuator_in_manual_mode() {
        let app = test_app();
        let response = send(
            &app.router,
            Method::POST,
            "/api/actuators",
            Some(json!({"actuator": "valve", "action": "on"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["humidifier"], json!(true));

        let response = send(&app.router, Method::GET, "/api/actuators", None).await;
        let body = json_body(response).await;
        assert_eq!(body["humidifier"], json!(true));
        assert_eq!(body["fan"], json!(false));
    }

    #[tokio::test]
    async fn should_refuse_manual_actuator_in_automatic_mode() {
        let app = test_app();
        send(
            &app.router,
            Method::PUT,
            "/api/mode",
            Some(json!({"mode": "automatic"})),
        )
        .await;

        let response = send(
            &app.router,
            Method::POST,
            "/api/actuators",
            Some(json!({"actuator": "fan", "action": "activate"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn should_report_bad_gateway_when_command_fails() {
        let app = test_app();
        app.link
            .failing
            .lock()
            .unwrap()
            .insert(Command::activate(incubator_domain::actuator::Actuator::Motor));

        let response = send(
            &app.router,
            Method::POST,
            "/api/actuators",
            Some(json!({"actuator": "motor", "action": "activate"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"], json!("actuator command M1 failed"));
    }
}
