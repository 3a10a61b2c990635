use uuid::Uuid;

use crate::{Error, User, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthToken(pub Uuid);

impl AuthToken {
    pub fn stub() -> AuthToken {
        AuthToken(STUB_UUID)
    }
}

/// Credentials submitted to open a session with the identity provider.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct NewSession {
    pub user: String,
    pub password: String,
    pub device: String,
}

impl NewSession {
    pub fn new(user: String, password: String, device: String) -> NewSession {
        NewSession {
            user,
            password,
            device,
        }
    }

    // See comments on other `validate` functions throughout weconnect-api
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.user)?;
        crate::validate_string(&self.password)?;
        crate::validate_string(&self.device)
    }
}

/// Server-verified proof of the current user's identity.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Session {
    pub token: AuthToken,
    pub user: User,
}

/// An external identity provider the login screen can offer.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
}

/// Where session resolution currently stands. Everything except the login
/// prompt is gated on `Authenticated`.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionStatus {
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionStatus {
    /// Subscription work is only ever allowed once a session is resolved and
    /// present; while resolving, or with no session, none may be established.
    pub fn allows_subscriptions(&self) -> bool {
        matches!(self, SessionStatus::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionStatus::Authenticated(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;

    fn session() -> Session {
        Session {
            token: AuthToken::stub(),
            user: User {
                id: UserId::stub(),
                name: String::from("alice"),
            },
        }
    }

    #[test]
    fn only_resolved_sessions_allow_subscriptions() {
        assert!(!SessionStatus::Loading.allows_subscriptions());
        assert!(!SessionStatus::Unauthenticated.allows_subscriptions());
        assert!(SessionStatus::Authenticated(session()).allows_subscriptions());
    }
}
