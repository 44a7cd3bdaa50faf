use anyhow::Context;

use crate::{
    api::{AuthorId, AuthorMetadata, Message, MessageId},
    FeedItem, KvStore,
};

/// Display name used until an author's profile has been looked up
pub const UNKNOWN_NAME: &str = "Unknown";

/// Avatar used until an author's profile has been looked up
pub const UNKNOWN_PHOTO: &str = "images/no_photo_gitcat.png";

/// Store key holding the most recent offset-0 batch
pub const MESSAGES_KEY: &str = "messages-key";

// Ids shorter than this get the fallback colors
const MIN_COLORED_ID_LEN: usize = 5;

/// Colors of an author's post-it notes, derived from fixed positions of the
/// author id so that an author always gets the same pair
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ColorPair {
    pub author: char,
    pub comment: char,
}

impl ColorPair {
    pub const FALLBACK: ColorPair = ColorPair {
        author: '0',
        comment: '1',
    };

    pub fn for_author(id: &AuthorId) -> ColorPair {
        let chars = id.as_str().chars().collect::<Vec<_>>();
        if chars.len() < MIN_COLORED_ID_LEN {
            return ColorPair::FALLBACK;
        }
        ColorPair {
            author: chars[3],
            comment: chars[chars.len() - 1],
        }
    }

    /// Index of the author color in a palette of `n` entries
    pub fn author_index(&self, n: usize) -> usize {
        palette_index(self.author, n)
    }

    /// Index of the comment color in a palette of `n` entries
    pub fn comment_index(&self, n: usize) -> usize {
        palette_index(self.comment, n)
    }
}

fn palette_index(c: char, n: usize) -> usize {
    match n {
        0 => 0,
        n => c.to_digit(36).unwrap_or(u32::from(c)) as usize % n,
    }
}

/// A message along with the display fields the view needs. The display fields
/// are not authoritative and get patched once the author is looked up.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnnotatedMessage {
    pub message: Message,
    pub display_name: String,
    pub avatar_url: String,
    pub colors: ColorPair,
}

impl FeedItem for AnnotatedMessage {
    fn message_id(&self) -> MessageId {
        self.message.id
    }
}

impl AnnotatedMessage {
    pub fn unknown(message: Message) -> AnnotatedMessage {
        let colors = ColorPair::for_author(&message.author_id);
        AnnotatedMessage {
            message,
            display_name: String::from(UNKNOWN_NAME),
            avatar_url: String::from(UNKNOWN_PHOTO),
            colors,
        }
    }

    pub fn known(message: Message, meta: &AuthorMetadata) -> AnnotatedMessage {
        let mut res = AnnotatedMessage::unknown(message);
        res.apply(meta);
        res
    }

    /// Patch the display fields if this message is from `meta`'s author.
    /// Returns whether anything was patched.
    pub fn apply(&mut self, meta: &AuthorMetadata) -> bool {
        if self.message.author_id != meta.author_id {
            return false;
        }
        self.display_name = meta.display_name.clone();
        self.avatar_url = meta.avatar_url.clone();
        true
    }
}

/// Patch every message of `meta`'s author, returning how many were patched
pub fn apply_to_all(messages: &mut [AnnotatedMessage], meta: &AuthorMetadata) -> usize {
    messages
        .iter_mut()
        .map(|m| m.apply(meta))
        .filter(|patched| *patched)
        .count()
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolution {
    pub messages: Vec<AnnotatedMessage>,

    /// Authors that were not in the store, in order of first appearance,
    /// each listed once
    pub unresolved: Vec<AuthorId>,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct StoredAuthor {
    display_name: String,
    image_url: String,
}

#[derive(Clone, Debug)]
pub struct MetadataCache<S> {
    store: S,
}

impl<S: KvStore> MetadataCache<S> {
    pub fn new(store: S) -> MetadataCache<S> {
        MetadataCache { store }
    }

    pub fn store_ref(&self) -> &S {
        &self.store
    }

    /// Cached metadata for `author`. Missing and malformed records both
    /// read as `None`.
    pub fn lookup(&self, author: &AuthorId) -> Option<AuthorMetadata> {
        let raw = self.store.get(author.as_str())?;
        match serde_json::from_str::<StoredAuthor>(&raw) {
            Ok(a) => Some(AuthorMetadata {
                author_id: author.clone(),
                display_name: a.display_name,
                avatar_url: a.image_url,
            }),
            Err(err) => {
                tracing::debug!(%author, ?err, "ignoring malformed cached author record");
                None
            }
        }
    }

    pub fn resolve(&self, messages: Vec<Message>) -> Resolution {
        let mut unresolved: Vec<AuthorId> = Vec::new();
        let messages = messages
            .into_iter()
            .map(|m| match self.lookup(&m.author_id) {
                Some(meta) => AnnotatedMessage::known(m, &meta),
                None => {
                    if !unresolved.contains(&m.author_id) {
                        unresolved.push(m.author_id.clone());
                    }
                    AnnotatedMessage::unknown(m)
                }
            })
            .collect();
        Resolution {
            messages,
            unresolved,
        }
    }

    pub fn store(&self, meta: &AuthorMetadata) -> anyhow::Result<()> {
        let record = serde_json::to_string(&StoredAuthor {
            display_name: meta.display_name.clone(),
            image_url: meta.avatar_url.clone(),
        })
        .context("serializing author record")?;
        self.store
            .set(meta.author_id.as_str(), record)
            .with_context(|| format!("storing metadata for author {}", meta.author_id))
    }

    pub fn save_last_full_batch(&self, messages: &[Message]) -> anyhow::Result<()> {
        let json = serde_json::to_string(messages).context("serializing message batch")?;
        self.store
            .set(MESSAGES_KEY, json)
            .context("storing last full message batch")
    }

    /// The last batch saved with `save_last_full_batch`, or an empty list
    pub fn load_last_full_batch(&self) -> Vec<Message> {
        let raw = match self.store.get(MESSAGES_KEY) {
            Some(raw) => raw,
            None => return Vec::new(),
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(?err, "ignoring malformed cached message batch");
            Vec::new()
        })
    }
}
