use crate::{
    api::{AuthorId, NewMessage, PostResponse},
    apply_to_all, enrich_all, for_each_resolved, AnnotatedMessage, Feed, FetchError, KvStore,
    MessageSource, MetadataCache, ProfileSource, Render,
};

/// Drives a feed end to end for consumers that can await each page: fetch,
/// resolve authors through the cache, look up the unknown ones, and keep the
/// list of shown messages up to date.
pub struct Session<M, P, S> {
    feed: Feed,
    cache: MetadataCache<S>,
    messages: M,
    profiles: P,
    shown: Vec<AnnotatedMessage>,
}

impl<M, P, S> Session<M, P, S>
where
    M: MessageSource,
    P: ProfileSource,
    S: KvStore,
{
    pub fn new(feed: Feed, cache: MetadataCache<S>, messages: M, profiles: P) -> Self {
        Session {
            feed,
            cache,
            messages,
            profiles,
            shown: Vec::new(),
        }
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn cache(&self) -> &MetadataCache<S> {
        &self.cache
    }

    pub fn shown(&self) -> &[AnnotatedMessage] {
        &self.shown
    }

    /// Show the last saved first page, before the network answers
    pub fn first_paint(&mut self) -> &[AnnotatedMessage] {
        let batch = self.cache.load_last_full_batch();
        tracing::debug!(len = batch.len(), "painting cached first page");
        self.shown = self.cache.resolve(batch).messages;
        &self.shown
    }

    /// Load the next page, or the page at `offset` if given. Returns what was
    /// rendered, with authors already looked up, or `None` if nothing was.
    ///
    /// This waits for every author lookup of the page before returning, so a
    /// single slow profile delays the whole page. Callers that must paint
    /// right away drive `Feed` and `enrich` themselves and patch as lookups
    /// land, the way the web app does.
    pub async fn load(&mut self, offset: Option<u64>) -> Option<Render<AnnotatedMessage>> {
        let req = self.feed.request_page(offset)?;
        let result = self.messages.fetch_page(req).await;
        let render = self.feed.complete(result)?;
        if render.is_replace() {
            if let Err(err) = self.cache.save_last_full_batch(render.items()) {
                tracing::warn!(?err, "failed saving first page");
            }
        }

        let mut unresolved = Vec::new();
        let mut render = render.map(|msgs| {
            let resolution = self.cache.resolve(msgs);
            unresolved = resolution.unresolved;
            resolution.messages
        });
        let lookups = enrich_all(&self.profiles, &self.cache, unresolved);
        let mut resolved = Vec::new();
        for_each_resolved(lookups, |meta| resolved.push(meta)).await;
        for meta in resolved {
            match &mut render {
                Render::Replace(v) | Render::Append(v) => apply_to_all(v, &meta),
            };
            // earlier pages may show the same author
            apply_to_all(&mut self.shown, &meta);
        }

        let render = render.without_shown(&self.shown);
        render.clone().apply_to(&mut self.shown);
        Some(render)
    }

    /// Load the next page
    pub async fn next_page(&mut self) -> Option<Render<AnnotatedMessage>> {
        self.load(None).await
    }

    /// Reload from the first page
    pub async fn reload(&mut self) -> Option<Render<AnnotatedMessage>> {
        self.load(Some(0)).await
    }

    /// Post a message, then reload so it shows up
    pub async fn post(
        &mut self,
        token: &str,
        author: AuthorId,
        comment: String,
    ) -> Result<PostResponse, FetchError> {
        let msg = NewMessage {
            author_id: author,
            comment,
        };
        let resp = self.messages.post_message(token, &msg).await?;
        self.reload().await;
        Ok(resp)
    }
}
