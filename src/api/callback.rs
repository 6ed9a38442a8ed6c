use std::sync::Arc;

use axum::{Extension, extract::Query, http::StatusCode, response::Html};
use serde::Deserialize;

use crate::{server::PendingAuthorization, warning};

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Receives the redirect from the accounts service.
///
/// A request carrying the wrong `state` is answered with 400 and otherwise
/// ignored; the authorization keeps waiting for the genuine redirect.
pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(pending): Extension<Arc<PendingAuthorization>>,
) -> (StatusCode, Html<&'static str>) {
    if params.state.as_deref() != Some(pending.state()) {
        warning!("Ignoring callback with unexpected state");
        return (StatusCode::BAD_REQUEST, Html("<h4>Invalid authorization state.</h4>"));
    }

    let outcome = if let Some(error) = params.error {
        Err(error)
    } else if let Some(code) = params.code {
        Ok(code)
    } else {
        Err("missing authorization code".to_string())
    };

    let accepted = outcome.is_ok();
    if let Err(reason) = &outcome {
        warning!("Authorization failed: {}", reason);
    }

    if !pending.complete(outcome).await {
        return (StatusCode::OK, Html("<h4>Authorization already handled.</h4>"));
    }

    if accepted {
        (StatusCode::OK, Html("<h2>Authentication successful.</h2><p>Close browser window.</p>"))
    } else {
        (StatusCode::OK, Html("<h4>Login failed.</h4>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(
        code: Option<&str>,
        state: Option<&str>,
        error: Option<&str>,
    ) -> Query<CallbackParams> {
        Query(CallbackParams {
            code: code.map(str::to_string),
            state: state.map(str::to_string),
            error: error.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_callback_forwards_code() {
        let (pending, rx) = PendingAuthorization::new("xyz");

        let (status, page) =
            callback(params(Some("abc"), Some("xyz"), None), Extension(pending)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(page.0.contains("successful"));
        assert_eq!(rx.await.unwrap(), Ok("abc".to_string()));
    }

    #[tokio::test]
    async fn test_wrong_state_is_ignored_until_genuine_redirect() {
        let (pending, rx) = PendingAuthorization::new("xyz");

        let (status, page) = callback(
            params(Some("forged"), Some("other"), None),
            Extension(pending.clone()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(page.0.contains("Invalid"));
        assert!(pending.is_waiting().await);

        let (status, _) =
            callback(params(Some("abc"), Some("xyz"), None), Extension(pending)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(rx.await.unwrap(), Ok("abc".to_string()));
    }

    #[tokio::test]
    async fn test_only_first_callback_counts() {
        let (pending, rx) = PendingAuthorization::new("xyz");

        callback(
            params(None, Some("xyz"), Some("access_denied")),
            Extension(pending.clone()),
        )
        .await;
        let (_, second) =
            callback(params(Some("abc"), Some("xyz"), None), Extension(pending)).await;

        assert!(second.0.contains("already handled"));
        assert_eq!(rx.await.unwrap(), Err("access_denied".to_string()));
    }
}
