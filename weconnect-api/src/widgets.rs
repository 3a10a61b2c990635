use crate::{Provider, Session};

/// One trending topic, as served by the trending endpoint. The upstream
/// payloads are loosely shaped, hence the defaults.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Trend {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub img: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One follow suggestion, as served by the follow endpoint.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct FollowSuggestion {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default, rename = "userImg")]
    pub user_img: String,
}

/// Everything resolved before the page is considered renderable: the two
/// auxiliary widget datasets, the provider list and the caller's session.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct BootstrapData {
    pub trending: Vec<Trend>,
    pub follow: Vec<FollowSuggestion>,
    pub providers: Vec<Provider>,
    pub session: Option<Session>,
}

impl BootstrapData {
    /// The degraded payload served when any part of bootstrap resolution
    /// fails: everything empty, no session, no error surfaced.
    pub fn empty() -> BootstrapData {
        BootstrapData {
            trending: Vec::new(),
            follow: Vec::new(),
            providers: Vec::new(),
            session: None,
        }
    }
}
