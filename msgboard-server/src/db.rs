use std::{str::FromStr, time::Duration};

use anyhow::Context;
use msgboard_api::{AuthorId, Message, MessageId, NewMessage, Time};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS messages (
        message_id INTEGER PRIMARY KEY AUTOINCREMENT,
        google_plus_id TEXT NOT NULL,
        comment TEXT NOT NULL,
        created_date_time TIMESTAMP NOT NULL
    )
";

pub async fn create_sqlx_pool(db_url: &str) -> anyhow::Result<sqlx::SqlitePool> {
    let opts = SqliteConnectOptions::from_str(db_url)
        .with_context(|| format!("parsing database url {db_url:?}"))?
        .create_if_missing(true);
    // every connection to an in-memory database gets its own database
    let pool = if db_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(5))
    };
    let pool = pool
        .connect_with(opts)
        .await
        .with_context(|| format!("opening database {db_url:?}"))?;
    sqlx::query(SCHEMA)
        .execute(&pool)
        .await
        .context("creating the messages table")?;
    Ok(pool)
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    message_id: i64,
    google_plus_id: String,
    comment: String,
    created_date_time: Time,
}

impl From<MessageRow> for Message {
    fn from(r: MessageRow) -> Message {
        Message {
            id: MessageId(r.message_id),
            author_id: AuthorId(r.google_plus_id),
            comment: r.comment,
            created_at: r.created_date_time,
        }
    }
}

/// Newest messages first
pub async fn fetch_messages(
    conn: &mut sqlx::SqliteConnection,
    offset: i64,
    limit: i64,
) -> anyhow::Result<Vec<Message>> {
    Ok(sqlx::query_as::<_, MessageRow>(
        "
            SELECT message_id, google_plus_id, comment, created_date_time
            FROM messages
            ORDER BY message_id DESC
            LIMIT ? OFFSET ?
        ",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await
    .with_context(|| format!("querying messages {offset}..+{limit}"))?
    .into_iter()
    .map(Message::from)
    .collect())
}

pub async fn insert_message(
    conn: &mut sqlx::SqliteConnection,
    msg: &NewMessage,
    now: Time,
) -> anyhow::Result<Message> {
    let id = sqlx::query(
        "INSERT INTO messages (google_plus_id, comment, created_date_time) VALUES (?, ?, ?)",
    )
    .bind(msg.author_id.as_str())
    .bind(&msg.comment)
    .bind(now)
    .execute(&mut *conn)
    .await
    .with_context(|| format!("inserting message from {}", msg.author_id))?
    .last_insert_rowid();
    Ok(Message {
        id: MessageId(id),
        author_id: msg.author_id.clone(),
        comment: msg.comment.clone(),
        created_at: now,
    })
}
