use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use structopt::StructOpt;

mod error;
mod extractors;
mod handlers;
mod loader;

pub use error::Error;
use extractors::{AppState, Endpoints};

#[derive(Debug, StructOpt)]
struct Opt {
    /// Address to listen on
    #[structopt(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Endpoint serving the trending-topics dataset
    #[structopt(long, default_value = "https://www.jsonkeeper.com/b/PM97")]
    trending_url: String,

    /// Endpoint serving the follow-suggestions dataset
    #[structopt(long, default_value = "https://www.jsonkeeper.com/b/ZI5D")]
    follow_url: String,

    /// Base URL of the external identity provider
    #[structopt(long)]
    auth_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::from_args();
    let state = AppState {
        http: reqwest::Client::new(),
        endpoints: Arc::new(Endpoints {
            trending: opt.trending_url,
            follow: opt.follow_url,
            auth: opt.auth_url,
        }),
    };

    tracing::info!("listening on {}", opt.bind);
    axum::Server::bind(&opt.bind)
        .serve(app(state).into_make_service())
        .await
        .context("serving axum webserver")
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/auth", post(handlers::auth))
        .route("/api/unauth", post(handlers::unauth))
        .route("/api/session", get(handlers::session))
        .route("/api/bootstrap", get(handlers::bootstrap))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
