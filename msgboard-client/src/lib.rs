mod cache;
pub use cache::{
    apply_to_all, AnnotatedMessage, ColorPair, MetadataCache, Resolution, MESSAGES_KEY,
    UNKNOWN_NAME, UNKNOWN_PHOTO,
};

mod config;
pub use config::{BoardConfig, DEFAULT_PROFILE_URL};

mod enrich;
pub use enrich::{enrich, enrich_all, for_each_resolved, sized_avatar_url, AVATAR_SIZE};

mod error;
pub use error::{FetchError, LookupError};

mod feed;
pub use feed::{Feed, FeedItem, FeedState, PageRequest, Render, DEFAULT_PAGE_SIZE};

pub mod scroll;

mod session;
pub use session::Session;

mod source;
pub use source::{HttpBoard, HttpProfiles, MessageSource, ProfileSource};

mod store;
pub use store::{KvStore, MemoryStore};

pub mod api {
    pub use msgboard_api::*;
}
