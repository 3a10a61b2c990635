use anyhow::Context;
use axum::{extract::State, Json};
use weconnect_api::{AuthToken, BootstrapData, NewSession, Session};

use crate::{
    extractors::{AppState, MaybeAuth, PreAuth},
    loader, Error,
};

/// Opens a session with the identity provider on behalf of the caller.
pub async fn auth(
    State(state): State<AppState>,
    Json(data): Json<NewSession>,
) -> Result<Json<AuthToken>, Error> {
    data.validate()?;
    let resp = state
        .http
        .post(format!("{}/sessions", state.endpoints.auth))
        .json(&data)
        .send()
        .await
        .context("reaching identity provider")?;
    if resp.status() == reqwest::StatusCode::UNAUTHORIZED
        || resp.status() == reqwest::StatusCode::FORBIDDEN
    {
        return Err(Error::permission_denied());
    }
    let token = resp
        .error_for_status()
        .context("opening session with identity provider")?
        .json()
        .await
        .context("parsing session token")?;
    Ok(Json(token))
}

pub async fn unauth(user: PreAuth, State(state): State<AppState>) -> Result<(), Error> {
    let resp = state
        .http
        .delete(format!("{}/sessions/{}", state.endpoints.auth, user.0 .0))
        .send()
        .await
        .context("reaching identity provider")?;
    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(Error::permission_denied());
    }
    resp.error_for_status()
        .context("revoking session with identity provider")?;
    Ok(())
}

/// Settles the caller's session status: `None` both for anonymous callers
/// and for tokens the provider no longer recognizes.
pub async fn session(
    auth: MaybeAuth,
    State(state): State<AppState>,
) -> Result<Json<Option<Session>>, Error> {
    let session = match auth.0 {
        None => None,
        Some(token) => loader::resolve_session(&state, token)
            .await
            .context("resolving session")?,
    };
    Ok(Json(session))
}

/// The pre-render payload. Infallible by contract: failures inside the
/// loader collapse to empty defaults rather than an error response.
pub async fn bootstrap(auth: MaybeAuth, State(state): State<AppState>) -> Json<BootstrapData> {
    Json(loader::bootstrap_payload(&state, auth.0).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::extractors::Endpoints;

    fn unreachable_state() -> AppState {
        // Nothing listens here: every outbound fetch fails
        AppState {
            http: reqwest::Client::new(),
            endpoints: Arc::new(Endpoints {
                trending: String::from("http://127.0.0.1:9/trending"),
                follow: String::from("http://127.0.0.1:9/follow"),
                auth: String::from("http://127.0.0.1:9"),
            }),
        }
    }

    #[tokio::test]
    async fn bootstrap_masks_upstream_failures() {
        let app = crate::app(unreachable_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/bootstrap")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        let data: BootstrapData = serde_json::from_slice(&body).unwrap();
        assert_eq!(data, BootstrapData::empty());
    }

    #[tokio::test]
    async fn session_requires_a_well_formed_token() {
        let app = crate::app(unreachable_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/session")
                    .header("authorization", "bearer not-a-uuid")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
