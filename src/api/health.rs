use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::server::PendingAuthorization;

pub async fn health(Extension(pending): Extension<Arc<PendingAuthorization>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "awaiting_callback": pending.is_waiting().await,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_pending_callback() {
        let (pending, _rx) = PendingAuthorization::new("xyz");

        let Json(body) = health(Extension(pending.clone())).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["awaiting_callback"], true);

        pending.complete(Ok("code".to_string())).await;
        let Json(body) = health(Extension(pending)).await;
        assert_eq!(body["awaiting_callback"], false);
    }
}
