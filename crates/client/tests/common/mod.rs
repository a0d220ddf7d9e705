#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use recallcheck_client::{ClientConfig, SecondaryConfig};
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn config(primary: &str, secondary: &str) -> ClientConfig {
    ClientConfig {
        primary_base_url: format!("{}/api", primary),
        secondary: SecondaryConfig {
            base_url: format!("{}/open-apis", secondary),
            app_id: "cli_test".to_string(),
            app_secret: "secret".to_string(),
            app_token: "appTok".to_string(),
            table_id: "tblRecalls".to_string(),
            ..SecondaryConfig::default()
        },
        ..ClientConfig::default()
    }
}

#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Mock table registry: token endpoint plus record search.
///
/// The search handler rejects requests without the issued bearer token and
/// answers with `items` and the reported `total`.
pub fn secondary_router(
    items: serde_json::Value,
    total: usize,
    auth_hits: Hits,
    search_hits: Hits,
) -> Router {
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::Json;
    use serde_json::{json, Value};

    Router::new()
        .route(
            "/open-apis/auth/v3/tenant_access_token/internal",
            post(move |Json(body): Json<Value>| async move {
                auth_hits.bump();
                if body["app_id"] == "cli_test" && body["app_secret"] == "secret" {
                    Json(json!({
                        "code": 0,
                        "msg": "ok",
                        "tenant_access_token": "t-abc",
                        "expire": 7200
                    }))
                } else {
                    Json(json!({"code": 10014, "msg": "app secret invalid"}))
                }
            }),
        )
        .route(
            "/open-apis/bitable/v1/apps/{app}/tables/{table}/records/search",
            post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                search_hits.bump();
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer t-abc");
                if !authorized {
                    return Json(json!({"code": 99991663, "msg": "invalid access token"}));
                }
                assert_eq!(
                    body["filter"]["conditions"][0]["field_name"],
                    "batch_codes"
                );
                assert_eq!(body["filter"]["conditions"][0]["operator"], "contains");
                Json(json!({
                    "code": 0,
                    "msg": "success",
                    "data": {"items": items, "total": total, "has_more": false}
                }))
            }),
        )
}
