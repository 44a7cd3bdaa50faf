use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Url;

use crate::{
    api::{
        AuthorId, AuthorMetadata, Message, MessagesResponse, NewMessage, PostResponse,
        ProfileResponse,
    },
    FetchError, LookupError, PageRequest,
};

const PROFILE_FIELDS: &str = "displayName,image";
const WHOAMI_FIELDS: &str = "displayName,id,image";

/// The board's messages API
#[async_trait(?Send)]
pub trait MessageSource {
    async fn fetch_page(&self, page: PageRequest) -> Result<Vec<Message>, FetchError>;

    async fn post_message(&self, token: &str, msg: &NewMessage)
        -> Result<PostResponse, FetchError>;
}

/// The external profile API
#[async_trait(?Send)]
pub trait ProfileSource {
    async fn lookup(&self, author: &AuthorId) -> Result<AuthorMetadata, LookupError>;

    /// Profile of the user owning `token`
    async fn whoami(&self, token: &str) -> Result<AuthorMetadata, LookupError>;
}

#[derive(Clone, Debug)]
pub struct HttpBoard {
    client: reqwest::Client,
    api_url: Url,
}

impl HttpBoard {
    pub fn new(client: reqwest::Client, api_url: &str) -> anyhow::Result<HttpBoard> {
        let api_url =
            Url::parse(api_url).map_err(|e| anyhow!("invalid messages API url {api_url:?}: {e}"))?;
        Ok(HttpBoard { client, api_url })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }
}

pub fn messages_url(api_url: &Url, page: PageRequest) -> Url {
    let mut url = api_url.clone();
    url.query_pairs_mut()
        .append_pair("limit", &page.limit.to_string())
        .append_pair("offset", &page.offset.to_string());
    url
}

async fn send(req: reqwest::RequestBuilder) -> Result<(u16, String), FetchError> {
    let resp = req.send().await?;
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    Ok((status, body))
}

fn check_status(status: u16) -> Result<(), FetchError> {
    match status {
        200..=299 => Ok(()),
        s => Err(FetchError::Transport(s)),
    }
}

pub fn parse_messages(status: u16, body: &str) -> Result<Vec<Message>, FetchError> {
    check_status(status)?;
    let resp: MessagesResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    resp.into_result().map_err(FetchError::Application)
}

pub fn parse_post(status: u16, body: &str) -> Result<PostResponse, FetchError> {
    check_status(status)?;
    let resp: PostResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    match resp.error {
        Some(e) => Err(FetchError::Application(e)),
        None => Ok(resp),
    }
}

#[async_trait(?Send)]
impl MessageSource for HttpBoard {
    async fn fetch_page(&self, page: PageRequest) -> Result<Vec<Message>, FetchError> {
        let (status, body) = send(self.client.get(messages_url(&self.api_url, page))).await?;
        parse_messages(status, &body)
    }

    async fn post_message(
        &self,
        token: &str,
        msg: &NewMessage,
    ) -> Result<PostResponse, FetchError> {
        let req = self
            .client
            .post(self.api_url.clone())
            .bearer_auth(token)
            .json(msg);
        let (status, body) = send(req).await?;
        let resp = parse_post(status, &body)?;
        tracing::info!(status = %resp.status, message = %resp.message, "posted message");
        Ok(resp)
    }
}

#[derive(Clone, Debug)]
pub struct HttpProfiles {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl HttpProfiles {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: String,
    ) -> anyhow::Result<HttpProfiles> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow!("invalid profile API url {base_url:?}: {e}"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("profile API url {base_url} cannot hold a path"));
        }
        Ok(HttpProfiles {
            client,
            base_url,
            api_key,
        })
    }
}

/// `<base>/people/<who>?fields=<fields>&key=<api_key>`
pub fn profile_url(base_url: &Url, who: &str, fields: &str, api_key: &str) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("people").push(who);
    }
    url.query_pairs_mut()
        .append_pair("fields", fields)
        .append_pair("key", api_key);
    url
}

/// Parse a profile response. `author` is the id that was asked for, or `None`
/// to take it from the response's `id` field.
pub fn parse_profile(
    status: u16,
    body: &str,
    author: Option<&AuthorId>,
) -> Result<AuthorMetadata, LookupError> {
    check_status(status)?;
    let resp: ProfileResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    if let Some(err) = resp.error {
        return Err(FetchError::Application(err.message));
    }
    let author_id = match (author, resp.id) {
        (Some(a), _) => a.clone(),
        (None, Some(id)) => AuthorId(id),
        (None, None) => return Err(FetchError::Malformed(String::from("profile has no id"))),
    };
    let display_name = resp
        .display_name
        .ok_or_else(|| FetchError::Malformed(String::from("profile has no display name")))?;
    let avatar_url = resp
        .image
        .ok_or_else(|| FetchError::Malformed(String::from("profile has no image")))?
        .url;
    Ok(AuthorMetadata {
        author_id,
        display_name,
        avatar_url,
    })
}

#[async_trait(?Send)]
impl ProfileSource for HttpProfiles {
    async fn lookup(&self, author: &AuthorId) -> Result<AuthorMetadata, LookupError> {
        let url = profile_url(&self.base_url, author.as_str(), PROFILE_FIELDS, &self.api_key);
        tracing::debug!(%author, "looking up author profile");
        let (status, body) = send(self.client.get(url)).await?;
        parse_profile(status, &body, Some(author))
    }

    async fn whoami(&self, token: &str) -> Result<AuthorMetadata, LookupError> {
        let url = profile_url(&self.base_url, "me", WHOAMI_FIELDS, &self.api_key);
        let (status, body) = send(self.client.get(url).bearer_auth(token)).await?;
        parse_profile(status, &body, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MessageId;

    #[test]
    fn builds_messages_url() {
        let api = Url::parse("http://localhost:3000/api").unwrap();
        assert_eq!(
            messages_url(&api, PageRequest { offset: 24, limit: 12 }).as_str(),
            "http://localhost:3000/api?limit=12&offset=24"
        );
    }

    #[test]
    fn builds_profile_url() {
        for base in [
            "https://www.googleapis.com/plus/v1",
            "https://www.googleapis.com/plus/v1/",
        ] {
            let base = Url::parse(base).unwrap();
            assert_eq!(
                profile_url(&base, "106027280718489289045", PROFILE_FIELDS, "KEY").as_str(),
                "https://www.googleapis.com/plus/v1/people/106027280718489289045?fields=displayName%2Cimage&key=KEY"
            );
        }
    }

    #[test]
    fn messages_success() {
        let body = r#"{"status": "success", "messages": [
            {"comment": "a", "created_date_time": "2012-07-23T08:28:01.574010", "message_id": 2, "google_plus_id": "12345"},
            {"comment": "b", "created_date_time": "2012-07-23T08:27:01.000000", "message_id": 1, "google_plus_id": "67890"}
        ]}"#;
        let msgs = parse_messages(200, body).unwrap();
        // server order is kept
        assert_eq!(
            msgs.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![MessageId(2), MessageId(1)]
        );
    }

    #[test]
    fn messages_errors() {
        assert_eq!(parse_messages(503, "{}"), Err(FetchError::Transport(503)));
        assert_eq!(
            parse_messages(404, r#"{"error": "nope"}"#),
            Err(FetchError::Transport(404))
        );
        assert_eq!(
            parse_messages(200, r#"{"error": "testError"}"#),
            Err(FetchError::Application(String::from("testError")))
        );
        assert!(matches!(
            parse_messages(200, "<html>"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn post_errors() {
        let ok = parse_post(200, r#"{"status": "success", "message": "Added"}"#).unwrap();
        assert_eq!(ok.message, "Added");
        assert_eq!(
            parse_post(200, r#"{"status": "error", "error": "Comment is empty"}"#),
            Err(FetchError::Application(String::from("Comment is empty")))
        );
        assert_eq!(parse_post(401, ""), Err(FetchError::Transport(401)));
    }

    #[test]
    fn profile_parsing() {
        let author = AuthorId::from("999");
        let meta = parse_profile(
            200,
            r#"{"displayName": "Dave", "image": {"url": "https://img/a.jpg?sz=50"}}"#,
            Some(&author),
        )
        .unwrap();
        assert_eq!(meta.author_id, author);
        assert_eq!(meta.display_name, "Dave");
        assert_eq!(meta.avatar_url, "https://img/a.jpg?sz=50");

        assert_eq!(
            parse_profile(200, r#"{"error": {"message": "Not Found"}}"#, Some(&author)),
            Err(FetchError::Application(String::from("Not Found")))
        );
        assert!(matches!(
            parse_profile(200, r#"{"displayName": "Dave"}"#, Some(&author)),
            Err(FetchError::Malformed(_))
        ));
        assert_eq!(
            parse_profile(403, "", Some(&author)),
            Err(FetchError::Transport(403))
        );
    }

    #[test]
    fn whoami_takes_id_from_response() {
        let meta = parse_profile(
            200,
            r#"{"id": "108456725833219286408", "displayName": "Dave", "image": {"url": "u"}}"#,
            None,
        )
        .unwrap();
        assert_eq!(meta.author_id, AuthorId::from("108456725833219286408"));
        assert!(matches!(
            parse_profile(200, r#"{"displayName": "Dave", "image": {"url": "u"}}"#, None),
            Err(FetchError::Malformed(_))
        ));
    }
}
