use anyhow::Context;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use structopt::StructOpt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

mod db;
mod error;
mod extractors;
mod handlers;

use error::Error;
use extractors::{AcceptedTokens, AppState, SqlitePool};

#[derive(Debug, StructOpt)]
#[structopt(about = "Serve the message board API")]
struct Opt {
    /// Address to listen on
    #[structopt(long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    #[structopt(long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database_url: String,

    /// Bearer token allowed to post, can be repeated. Any token is accepted
    /// when none is given.
    #[structopt(long = "token", env = "BOARD_TOKENS", use_delimiter = true)]
    tokens: Vec<String>,
}

pub fn app(db: sqlx::SqlitePool, tokens: AcceptedTokens) -> Router {
    let state = AppState {
        db: SqlitePool::new(db),
        tokens,
    };
    Router::new()
        .route(
            "/api",
            get(handlers::fetch_messages).post(handlers::post_message),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opt = Opt::from_args();
    let db = db::create_sqlx_pool(&opt.database_url).await?;
    if opt.tokens.is_empty() {
        tracing::warn!("no --token given, any bearer token will be allowed to post");
    }
    let app = app(db, AcceptedTokens::new(opt.tokens));

    tracing::info!("listening on {}", opt.listen);
    axum::Server::bind(&opt.listen)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}
