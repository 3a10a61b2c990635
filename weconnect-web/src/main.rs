use lazy_static::lazy_static;
use weconnect_client::api::AuthToken;

mod api;
mod router;
mod ui;

/// Deployment API base, pre-filled in the login form. The snapshot feed
/// socket lives under the same host.
pub const DEFAULT_HOST: &str = "https://weconnect.example.org";

lazy_static! {
    pub static ref CLIENT: reqwest_middleware::ClientWithMiddleware =
        reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
            .with(reqwest_retry::RetryTransientMiddleware::new_with_policy(
                reqwest_retry::policies::ExponentialBackoff::builder().build_with_max_retries(3),
            ))
            .build();
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoginInfo {
    pub host: String,
    pub user: String,
    pub token: AuthToken,
}

fn main() {
    tracing_wasm::set_as_global_default();
    yew::Renderer::<ui::App>::new().render();
}
