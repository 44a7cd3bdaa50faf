use anyhow::Context;
use axum::Json;
use msgboard_api::{MessagesResponse, NewMessage, PostResponse, STATUS_SUCCESS};

use crate::{
    db,
    extractors::{ApiJson, ApiQuery, Auth, SqliteConn},
    Error,
};

pub const DEFAULT_LIMIT: u32 = 12;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, serde::Deserialize)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: u32,

    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl PageParams {
    pub fn clamped_limit(&self) -> u32 {
        std::cmp::min(self.limit, MAX_LIMIT)
    }
}

pub async fn fetch_messages(
    mut conn: SqliteConn,
    ApiQuery(page): ApiQuery<PageParams>,
) -> Result<Json<MessagesResponse>, Error> {
    let messages = db::fetch_messages(
        &mut *conn,
        i64::from(page.offset),
        i64::from(page.clamped_limit()),
    )
    .await
    .with_context(|| format!("fetching messages for {page:?}"))?;
    Ok(Json(MessagesResponse::success(messages)))
}

pub async fn post_message(
    _: Auth,
    mut conn: SqliteConn,
    ApiJson(msg): ApiJson<NewMessage>,
) -> Result<Json<PostResponse>, Error> {
    msg.validate()?;
    let saved = db::insert_message(&mut *conn, &msg, chrono::Utc::now().naive_utc())
        .await
        .context("saving new message")?;
    tracing::info!(id = saved.id.0, author = %saved.author_id, "message added");
    Ok(Json(PostResponse {
        status: String::from(STATUS_SUCCESS),
        message: String::from("You added a comment. Well done."),
        error: None,
    }))
}
