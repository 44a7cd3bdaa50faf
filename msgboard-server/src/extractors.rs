use std::{
    collections::HashSet,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{self, request},
};

use crate::Error;

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: AcceptedTokens,
}

#[derive(Clone)]
pub struct SqlitePool(sqlx::SqlitePool);

impl SqlitePool {
    pub fn new(pool: sqlx::SqlitePool) -> SqlitePool {
        SqlitePool(pool)
    }

    pub async fn acquire(&self) -> Result<SqliteConn, Error> {
        Ok(SqliteConn(
            self.0.acquire().await.context("acquiring db connection")?,
        ))
    }
}

pub struct SqliteConn(sqlx::pool::PoolConnection<sqlx::Sqlite>);

#[async_trait]
impl FromRequestParts<AppState> for SqliteConn {
    type Rejection = Error;

    async fn from_request_parts(
        _req: &mut request::Parts,
        state: &AppState,
    ) -> Result<SqliteConn, Error> {
        state.db.acquire().await
    }
}

impl Deref for SqliteConn {
    type Target = sqlx::SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SqliteConn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// `axum::Json`, rejecting with the board's error envelope
#[derive(axum::extract::FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query`, rejecting with the board's error envelope
#[derive(axum::extract::FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);

/// Bearer tokens allowed to post. `None` lets any token through.
#[derive(Clone, Debug, Default)]
pub struct AcceptedTokens(Option<Arc<HashSet<String>>>);

impl AcceptedTokens {
    pub fn new(tokens: Vec<String>) -> AcceptedTokens {
        if tokens.is_empty() {
            AcceptedTokens(None)
        } else {
            AcceptedTokens(Some(Arc::new(tokens.into_iter().collect())))
        }
    }

    pub fn accepts(&self, token: &str) -> bool {
        match &self.0 {
            None => true,
            Some(tokens) => tokens.contains(token),
        }
    }
}

pub struct PreAuth(pub String);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for PreAuth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<PreAuth, Error> {
        let auth = req
            .headers
            .get(http::header::AUTHORIZATION)
            .ok_or(Error::permission_denied())?;
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
        if token.is_empty() || auth.next().is_some() {
            return Err(Error::permission_denied());
        }
        Ok(PreAuth(String::from(token)))
    }
}

/// A poster whose token is accepted
pub struct Auth;

#[async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, state: &AppState) -> Result<Auth, Error> {
        let token = PreAuth::from_request_parts(req, state).await?.0;
        if state.tokens.accepts(&token) {
            Ok(Auth)
        } else {
            Err(Error::permission_denied())
        }
    }
}
