use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{self, request},
};
use weconnect_api::{AuthToken, Uuid};

use crate::Error;

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub endpoints: Arc<Endpoints>,
}

/// The external services this server composes. All fixed at startup.
pub struct Endpoints {
    pub trending: String,
    pub follow: String,
    pub auth: String,
}

/// Requires a well-formed bearer token; does not check it against anything.
pub struct PreAuth(pub AuthToken);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for PreAuth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<PreAuth, Error> {
        match req.headers.get(http::header::AUTHORIZATION) {
            None => Err(Error::permission_denied()),
            Some(auth) => {
                let auth = auth.to_str().map_err(|_| Error::permission_denied())?;
                let mut auth = auth.split(' ');
                if !auth
                    .next()
                    .ok_or(Error::permission_denied())?
                    .eq_ignore_ascii_case("bearer")
                {
                    return Err(Error::permission_denied());
                }
                let token = auth.next().ok_or(Error::permission_denied())?;
                if !auth.next().is_none() {
                    return Err(Error::permission_denied());
                }
                let token = Uuid::try_from(token).map_err(|_| Error::permission_denied())?;
                Ok(PreAuth(AuthToken(token)))
            }
        }
    }
}

/// Like [`PreAuth`], except a missing header is fine: anonymous callers get
/// the logged-out rendition instead of an error.
pub struct MaybeAuth(pub Option<AuthToken>);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for MaybeAuth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, state: &S) -> Result<MaybeAuth, Error> {
        if req.headers.get(http::header::AUTHORIZATION).is_none() {
            return Ok(MaybeAuth(None));
        }
        let token = PreAuth::from_request_parts(req, state).await?.0;
        Ok(MaybeAuth(Some(token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pre_auth_for(header: Option<&str>) -> Result<AuthToken, Error> {
        let mut req = http::Request::builder().uri("/");
        if let Some(h) = header {
            req = req.header(http::header::AUTHORIZATION, h);
        }
        let (mut parts, ()) = req.body(()).unwrap().into_parts();
        PreAuth::from_request_parts(&mut parts, &()).await.map(|a| a.0)
    }

    #[tokio::test]
    async fn bearer_tokens_parse_strictly() {
        let token = AuthToken::stub();
        let header = format!("bearer {}", token.0);
        assert_eq!(pre_auth_for(Some(&header)).await.unwrap(), token);
        // Scheme is case-insensitive
        let header = format!("Bearer {}", token.0);
        assert_eq!(pre_auth_for(Some(&header)).await.unwrap(), token);

        for bad in [
            "",
            "bearer",
            "basic dXNlcjpwYXNz",
            "bearer not-a-uuid",
            "bearer ffffffff-ffff-ffff-ffff-ffffffffffff extra",
        ] {
            assert!(pre_auth_for(Some(bad)).await.is_err(), "accepted {bad:?}");
        }
        assert!(pre_auth_for(None).await.is_err());
    }

    #[tokio::test]
    async fn absent_header_resolves_to_anonymous() {
        let (mut parts, ()) = http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();
        let auth = MaybeAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(auth.0, None);
    }
}
