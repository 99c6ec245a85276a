use axum::Router;
use tokio::task::JoinHandle;

pub mod contact_details;
pub mod health;

/// API routes without the `/api` prefix, plus the background tasks they own.
///
/// The `/api` prefix is added by the `create_router` helper.
pub struct Routes {
    pub router: Router,
    pub token_cleanup: JoinHandle<()>,
}

pub fn routes(state: &crate::state::AppState) -> Routes {
    let (contact_details, token_cleanup) = contact_details::mount(state);

    Routes {
        router: Router::new().nest("/contactDetails", contact_details),
        token_cleanup,
    }
}

/// Router with the `/ready` endpoint; merged with the stateless app router.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment, StorageBackend};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, server::ServerConfig};
    use domain_contact_details::{Locale, VerificationConfig};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn memory_state() -> crate::state::AppState {
        crate::state::AppState {
            config: Config {
                app: app_info!(),
                environment: Environment::Development,
                server: ServerConfig::default(),
                storage: StorageBackend::Memory,
                database: None,
                verification: VerificationConfig::default(),
                default_locale: Locale::En,
            },
            db: None,
        }
    }

    async fn json_body(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_contact_details_mounted_on_memory_backend() {
        let routes = routes(&memory_state());
        let user_id = Uuid::new_v4();

        let request = Request::builder()
            .method("PUT")
            .uri(format!("/contactDetails/{user_id}"))
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "emailDetails": { "email": "user@example.org", "emailVerified": false } })
                    .to_string(),
            ))
            .unwrap();
        let response = routes.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = routes
            .router
            .oneshot(
                Request::get(format!("/contactDetails/{user_id}/verifications"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let pending = json_body(response.into_body()).await;
        assert_eq!(pending["emailAddress"], "user@example.org");

        routes.token_cleanup.abort();
    }

    #[tokio::test]
    async fn test_ready_without_database() {
        let response = ready_router(memory_state())
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response.into_body()).await["status"], "ready");
    }
}
