use futures::{
    future::LocalBoxFuture,
    stream::{FuturesUnordered, StreamExt},
    FutureExt,
};
use reqwest::Url;

use crate::{
    api::{AuthorId, AuthorMetadata},
    KvStore, LookupError, MetadataCache, ProfileSource,
};

/// Size, in pixels, avatars are displayed at
pub const AVATAR_SIZE: u32 = 80;

/// Look `author` up and write the result through to the cache. Failures are
/// logged and returned; the caller keeps the placeholders.
pub async fn enrich<P, S>(
    profiles: &P,
    cache: &MetadataCache<S>,
    author: &AuthorId,
) -> Result<AuthorMetadata, LookupError>
where
    P: ProfileSource + ?Sized,
    S: KvStore,
{
    match profiles.lookup(author).await {
        Ok(meta) => {
            if let Err(err) = cache.store(&meta) {
                tracing::warn!(%author, ?err, "failed caching author metadata");
            }
            Ok(meta)
        }
        Err(err) => {
            tracing::warn!(%author, %err, "failed looking up author profile");
            Err(err)
        }
    }
}

/// Start one lookup per author, in the given order. Results come out of the
/// returned stream in completion order.
pub fn enrich_all<'a, P, S>(
    profiles: &'a P,
    cache: &'a MetadataCache<S>,
    authors: Vec<AuthorId>,
) -> FuturesUnordered<LocalBoxFuture<'a, (AuthorId, Result<AuthorMetadata, LookupError>)>>
where
    P: ProfileSource + ?Sized,
    S: KvStore,
{
    authors
        .into_iter()
        .map(|author| {
            async move {
                let res = enrich(profiles, cache, &author).await;
                (author, res)
            }
            .boxed_local()
        })
        .collect()
}

/// Drain `lookups`, calling `on_resolved` for each successful one
pub async fn for_each_resolved<'a>(
    mut lookups: FuturesUnordered<
        LocalBoxFuture<'a, (AuthorId, Result<AuthorMetadata, LookupError>)>,
    >,
    mut on_resolved: impl FnMut(AuthorMetadata),
) {
    while let Some((_, res)) = lookups.next().await {
        if let Ok(meta) = res {
            on_resolved(meta);
        }
    }
}

/// `url` with its `sz` query parameter set to `size`. Relative urls, like
/// the placeholder avatar, are returned as is.
pub fn sized_avatar_url(url: &str, size: u32) -> String {
    let mut parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return String::from(url),
    };
    let kept = parsed
        .query_pairs()
        .filter(|(k, _)| k != "sz")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect::<Vec<_>>();
    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("sz", &size.to_string());
    String::from(parsed)
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap};

    use async_trait::async_trait;

    use super::*;
    use crate::{FetchError, MemoryStore, UNKNOWN_PHOTO};

    #[derive(Default)]
    struct Profiles {
        known: HashMap<AuthorId, AuthorMetadata>,
        calls: RefCell<Vec<AuthorId>>,
    }

    #[async_trait(?Send)]
    impl ProfileSource for Profiles {
        async fn lookup(&self, author: &AuthorId) -> Result<AuthorMetadata, LookupError> {
            self.calls.borrow_mut().push(author.clone());
            self.known
                .get(author)
                .cloned()
                .ok_or_else(|| FetchError::Application(String::from("Not Found")))
        }

        async fn whoami(&self, _token: &str) -> Result<AuthorMetadata, LookupError> {
            Err(FetchError::Transport(401))
        }
    }

    fn dave() -> AuthorMetadata {
        AuthorMetadata {
            author_id: AuthorId::from("108456725833219286408"),
            display_name: String::from("Dave"),
            avatar_url: String::from("https://img/dave.jpg?sz=50"),
        }
    }

    #[tokio::test]
    async fn writes_through_on_success() {
        let mut profiles = Profiles::default();
        profiles.known.insert(dave().author_id, dave());
        let cache = MetadataCache::new(MemoryStore::new());

        let got = enrich(&profiles, &cache, &dave().author_id).await.unwrap();
        assert_eq!(got, dave());
        assert_eq!(cache.lookup(&dave().author_id), Some(dave()));
    }

    #[tokio::test]
    async fn leaves_cache_alone_on_failure() {
        let profiles = Profiles::default();
        let store = MemoryStore::new();
        let cache = MetadataCache::new(store.clone());
        let err = enrich(&profiles, &cache, &AuthorId::from("999")).await;
        assert_eq!(err, Err(FetchError::Application(String::from("Not Found"))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn dispatches_in_order() {
        let mut profiles = Profiles::default();
        profiles.known.insert(dave().author_id, dave());
        let cache = MetadataCache::new(MemoryStore::new());
        let authors = vec![AuthorId::from("999"), dave().author_id, AuthorId::from("777")];

        let mut resolved = Vec::new();
        for_each_resolved(enrich_all(&profiles, &cache, authors.clone()), |m| {
            resolved.push(m)
        })
        .await;
        assert_eq!(resolved, vec![dave()]);
        assert_eq!(*profiles.calls.borrow(), authors);
    }

    #[test]
    fn avatar_sizes() {
        assert_eq!(
            sized_avatar_url("https://img.example/a.jpg?sz=50", AVATAR_SIZE),
            "https://img.example/a.jpg?sz=80"
        );
        assert_eq!(
            sized_avatar_url("https://img.example/a.jpg", AVATAR_SIZE),
            "https://img.example/a.jpg?sz=80"
        );
        assert_eq!(
            sized_avatar_url("https://img.example/a.jpg?x=1&sz=50", 120),
            "https://img.example/a.jpg?x=1&sz=120"
        );
        assert_eq!(sized_avatar_url(UNKNOWN_PHOTO, AVATAR_SIZE), UNKNOWN_PHOTO);
    }
}
