use anyhow::Context;
use serde::de::DeserializeOwned;
use weconnect_api::{AuthToken, BootstrapData, FollowSuggestion, Provider, Session, Trend};

use crate::extractors::AppState;

/// Resolves everything the page needs before it is considered renderable:
/// the two auxiliary widget datasets, the provider list and the caller's
/// session. Any failure anywhere degrades the whole payload to empty
/// defaults; the page renders with empty widgets and no session rather than
/// an error.
pub async fn bootstrap_payload(state: &AppState, token: Option<AuthToken>) -> BootstrapData {
    match try_bootstrap(state, token).await {
        Ok(data) => data,
        Err(err) => {
            tracing::error!(?err, "assembling bootstrap payload, serving empty defaults");
            BootstrapData::empty()
        }
    }
}

async fn try_bootstrap(
    state: &AppState,
    token: Option<AuthToken>,
) -> anyhow::Result<BootstrapData> {
    let trending: Vec<Trend> = fetch_json(state, &state.endpoints.trending)
        .await
        .context("fetching trending topics")?;
    let follow: Vec<FollowSuggestion> = fetch_json(state, &state.endpoints.follow)
        .await
        .context("fetching follow suggestions")?;
    let providers: Vec<Provider> =
        fetch_json(state, &format!("{}/providers", state.endpoints.auth))
            .await
            .context("resolving provider list")?;
    let session = match token {
        None => None,
        Some(token) => resolve_session(state, token)
            .await
            .context("resolving session")?,
    };
    Ok(BootstrapData {
        trending,
        follow,
        providers,
        session,
    })
}

/// Asks the identity provider who the token belongs to. `None` means the
/// provider does not know the token (expired or revoked).
pub async fn resolve_session(
    state: &AppState,
    token: AuthToken,
) -> anyhow::Result<Option<Session>> {
    fetch_json(
        state,
        &format!("{}/sessions/{}", state.endpoints.auth, token.0),
    )
    .await
}

async fn fetch_json<T: DeserializeOwned>(state: &AppState, url: &str) -> anyhow::Result<T> {
    Ok(state
        .http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use std::{net::SocketAddr, sync::Arc};
    use weconnect_api::{User, UserId, Uuid};

    use crate::extractors::Endpoints;

    async fn serve(app: Router) -> SocketAddr {
        let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
            .serve(app.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);
        addr
    }

    fn upstream() -> Router {
        Router::new()
            .route(
                "/trending",
                get(|| async {
                    Json(vec![Trend {
                        heading: String::from("#rustlang"),
                        ..Trend::default()
                    }])
                }),
            )
            .route(
                "/follow",
                get(|| async {
                    Json(vec![FollowSuggestion {
                        username: String::from("ferris"),
                        ..FollowSuggestion::default()
                    }])
                }),
            )
            .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route(
                "/providers",
                get(|| async {
                    Json(vec![Provider {
                        id: String::from("credentials"),
                        name: String::from("Credentials"),
                    }])
                }),
            )
            .route(
                "/sessions/:token",
                get(|Path(token): Path<String>| async move {
                    Json(Some(Session {
                        token: AuthToken(token.parse::<Uuid>().unwrap()),
                        user: User {
                            id: UserId::stub(),
                            name: String::from("alice"),
                        },
                    }))
                }),
            )
    }

    fn state_for(addr: SocketAddr, trending_path: &str) -> AppState {
        let base = format!("http://{addr}");
        AppState {
            http: reqwest::Client::new(),
            endpoints: Arc::new(Endpoints {
                trending: format!("{base}{trending_path}"),
                follow: format!("{base}/follow"),
                auth: base,
            }),
        }
    }

    #[tokio::test]
    async fn payload_resolves_every_dataset() {
        let addr = serve(upstream()).await;
        let state = state_for(addr, "/trending");

        let data = bootstrap_payload(&state, Some(AuthToken::stub())).await;
        assert_eq!(data.trending[0].heading, "#rustlang");
        assert_eq!(data.follow[0].username, "ferris");
        assert_eq!(data.providers[0].id, "credentials");
        assert_eq!(data.session.unwrap().user.name, "alice");
    }

    #[tokio::test]
    async fn one_failing_fetch_empties_everything() {
        let addr = serve(upstream()).await;
        // Trending is down; follow, providers and session would all resolve
        let state = state_for(addr, "/broken");

        let data = bootstrap_payload(&state, Some(AuthToken::stub())).await;
        assert_eq!(data, BootstrapData::empty());
    }

    #[tokio::test]
    async fn absent_token_resolves_to_no_session() {
        let addr = serve(upstream()).await;
        let state = state_for(addr, "/trending");

        let data = bootstrap_payload(&state, None).await;
        assert!(!data.trending.is_empty());
        assert!(!data.providers.is_empty());
        assert_eq!(data.session, None);
    }
}
