use std::collections::HashSet;

use crate::{
    api::{Message, MessageId},
    FetchError,
};

pub const DEFAULT_PAGE_SIZE: u64 = 12;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeedState {
    /// Ready to fetch
    Idle,

    /// A page fetch is in flight
    Loading,

    /// The server returned an empty page; only a reload from offset 0 fetches
    /// again
    Exhausted,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

/// Anything shown in a feed, identified by its message id
pub trait FeedItem {
    fn message_id(&self) -> MessageId;
}

impl FeedItem for Message {
    fn message_id(&self) -> MessageId {
        self.id
    }
}

/// What the view should do with a freshly fetched page
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Render<T> {
    /// First page: replace everything shown
    Replace(Vec<T>),

    /// Later page: add after what is shown
    Append(Vec<T>),
}

impl<T> Render<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Render::Replace(v) | Render::Append(v) => v,
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, Render::Replace(_))
    }

    pub fn map<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> Render<U> {
        match self {
            Render::Replace(v) => Render::Replace(f(v)),
            Render::Append(v) => Render::Append(f(v)),
        }
    }

}

impl<T: FeedItem> Render<T> {
    /// Drop appended items whose id is already in `shown`. Offset paging
    /// shifts when messages are posted between two fetches, so a later page
    /// can start with messages already on screen.
    pub fn without_shown(self, shown: &[T]) -> Render<T> {
        match self {
            Render::Replace(v) => Render::Replace(v),
            Render::Append(v) => {
                let mut seen = shown.iter().map(T::message_id).collect::<HashSet<_>>();
                let before = v.len();
                let v = v
                    .into_iter()
                    .filter(|m| seen.insert(m.message_id()))
                    .collect::<Vec<_>>();
                if v.len() != before {
                    tracing::debug!(dropped = before - v.len(), "page overlaps shown messages");
                }
                Render::Append(v)
            }
        }
    }

    /// Apply this instruction to the list currently shown; a message id is
    /// never shown twice
    pub fn apply_to(self, shown: &mut Vec<T>) {
        match self.without_shown(shown) {
            Render::Replace(v) => *shown = v,
            Render::Append(mut v) => shown.append(&mut v),
        }
    }
}

/// Pagination state machine of a message feed. It hands out at most one
/// `PageRequest` at a time and decides how each completed page is rendered.
#[derive(Clone, Debug)]
pub struct Feed {
    state: FeedState,
    next_offset: u64,
    page_size: u64,
    in_flight: Option<PageRequest>,
}

impl Default for Feed {
    fn default() -> Feed {
        Feed::new(DEFAULT_PAGE_SIZE)
    }
}

impl Feed {
    /// A page size of 0 is taken as 1, so that the offset always advances
    pub fn new(page_size: u64) -> Feed {
        Feed {
            state: FeedState::Idle,
            next_offset: 0,
            page_size: page_size.max(1),
            in_flight: None,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn in_flight(&self) -> Option<PageRequest> {
        self.in_flight
    }

    /// Ask for the next page, or for the page at `offset` if given. Returns
    /// the request to dispatch, or `None` if no fetch may start now.
    pub fn request_page(&mut self, offset: Option<u64>) -> Option<PageRequest> {
        match self.state {
            FeedState::Idle => (),
            FeedState::Loading => {
                tracing::debug!(
                    ?offset,
                    in_flight = ?self.in_flight,
                    "page already loading, ignoring request"
                );
                return None;
            }
            FeedState::Exhausted if offset == Some(0) => (),
            FeedState::Exhausted => {
                tracing::debug!(?offset, "feed exhausted, ignoring request");
                return None;
            }
        }
        if let Some(offset) = offset {
            self.next_offset = offset;
        }
        let req = PageRequest {
            offset: self.next_offset,
            limit: self.page_size,
        };
        self.state = FeedState::Loading;
        self.in_flight = Some(req);
        tracing::debug!(?req, "requesting page");
        Some(req)
    }

    /// Start over from the first page, even if the feed was exhausted
    pub fn reload(&mut self) -> Option<PageRequest> {
        self.request_page(Some(0))
    }

    /// Record the outcome of the in-flight request
    pub fn complete(
        &mut self,
        result: Result<Vec<Message>, FetchError>,
    ) -> Option<Render<Message>> {
        let req = match (self.state, self.in_flight.take()) {
            (FeedState::Loading, Some(req)) => req,
            (state, _) => {
                tracing::warn!(?state, "got a page completion with no page in flight");
                return None;
            }
        };
        match result {
            Err(err) => {
                tracing::warn!(?req, %err, "failed fetching page");
                self.state = FeedState::Idle;
                None
            }
            Ok(messages) if messages.is_empty() => {
                tracing::info!(?req, "reached the end of the feed");
                self.state = FeedState::Exhausted;
                (req.offset == 0).then(|| Render::Replace(messages))
            }
            Ok(messages) => {
                self.state = FeedState::Idle;
                self.next_offset = req.offset + self.page_size;
                Some(match req.offset {
                    0 => Render::Replace(messages),
                    _ => Render::Append(messages),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthorId, MessageId, Time};

    const PAGE: u64 = 12;

    fn msgs(n: i64) -> Vec<Message> {
        (0..n)
            .map(|i| Message {
                id: MessageId(i),
                author_id: AuthorId::from("12345"),
                comment: format!("comment {i}"),
                created_at: Time::from_timestamp_opt(1_000_000 + i, 0).unwrap(),
            })
            .collect()
    }

    #[test]
    fn first_page_replaces() {
        let mut feed = Feed::new(PAGE);
        assert_eq!(feed.state(), FeedState::Idle);
        let req = feed.request_page(None).unwrap();
        assert_eq!(req, PageRequest { offset: 0, limit: PAGE });
        assert_eq!(feed.state(), FeedState::Loading);
        let render = feed.complete(Ok(msgs(2))).unwrap();
        assert_eq!(render, Render::Replace(msgs(2)));
        assert_eq!(feed.state(), FeedState::Idle);
        assert_eq!(feed.next_offset(), PAGE);
    }

    #[test]
    fn later_pages_append() {
        let mut feed = Feed::new(PAGE);
        feed.request_page(None).unwrap();
        feed.complete(Ok(msgs(12))).unwrap();
        let req = feed.request_page(None).unwrap();
        assert_eq!(req.offset, PAGE);
        let render = feed.complete(Ok(msgs(3))).unwrap();
        assert!(!render.is_replace());
        assert_eq!(render.items().len(), 3);
        assert_eq!(feed.next_offset(), 2 * PAGE);
    }

    #[test]
    fn no_second_request_while_loading() {
        let mut feed = Feed::new(PAGE);
        assert!(feed.request_page(None).is_some());
        assert_eq!(feed.request_page(None), None);
        assert_eq!(feed.request_page(Some(0)), None);
        assert_eq!(feed.reload(), None);
        assert_eq!(feed.in_flight(), Some(PageRequest { offset: 0, limit: PAGE }));
    }

    #[test]
    fn empty_page_exhausts_until_reload() {
        let mut feed = Feed::new(PAGE);
        feed.request_page(None).unwrap();
        feed.complete(Ok(msgs(12))).unwrap();
        feed.request_page(None).unwrap();
        assert_eq!(feed.complete(Ok(Vec::new())), None);
        assert_eq!(feed.state(), FeedState::Exhausted);

        // scroll-driven requests are ignored
        assert_eq!(feed.request_page(None), None);
        assert_eq!(feed.request_page(Some(PAGE)), None);
        assert_eq!(feed.state(), FeedState::Exhausted);

        // but an explicit reload goes through
        let req = feed.reload().unwrap();
        assert_eq!(req.offset, 0);
        assert_eq!(feed.complete(Ok(msgs(1))), Some(Render::Replace(msgs(1))));
        assert_eq!(feed.state(), FeedState::Idle);
        assert_eq!(feed.next_offset(), PAGE);
    }

    #[test]
    fn empty_first_page_clears_view() {
        let mut feed = Feed::new(PAGE);
        feed.request_page(None).unwrap();
        assert_eq!(feed.complete(Ok(Vec::new())), Some(Render::Replace(Vec::new())));
        assert_eq!(feed.state(), FeedState::Exhausted);
    }

    #[test]
    fn failures_are_retryable() {
        for err in [
            FetchError::Network(String::from("offline")),
            FetchError::Transport(500),
            FetchError::Application(String::from("testError")),
            FetchError::Malformed(String::from("not json")),
        ] {
            let mut feed = Feed::new(PAGE);
            feed.request_page(None).unwrap();
            feed.complete(Ok(msgs(12))).unwrap();
            feed.request_page(None).unwrap();
            assert_eq!(feed.complete(Err(err)), None);
            assert_eq!(feed.state(), FeedState::Idle);
            assert_eq!(feed.next_offset(), PAGE);
            assert_eq!(feed.request_page(None).unwrap().offset, PAGE);
        }
    }

    #[test]
    fn zero_page_size_still_advances() {
        let mut feed = Feed::new(0);
        assert_eq!(feed.page_size(), 1);
        assert_eq!(feed.request_page(None).unwrap().limit, 1);
        feed.complete(Ok(msgs(1))).unwrap();
        assert_eq!(feed.request_page(None).unwrap().offset, 1);
    }

    #[test]
    fn overlapping_page_is_not_shown_twice() {
        let ids = |v: &[Message]| v.iter().map(|m| m.id.0).collect::<Vec<_>>();
        let mut shown = msgs(3);
        // a post landed between the two fetches, shifting the next page by one
        let render = Render::Append(msgs(5).split_off(2)).without_shown(&shown);
        assert_eq!(ids(render.items()), vec![3, 4]);
        render.apply_to(&mut shown);
        assert_eq!(ids(&shown), vec![0, 1, 2, 3, 4]);

        // duplicates within the page itself go too
        let mut page = msgs(6).split_off(4);
        page.extend(msgs(6).split_off(5));
        Render::Append(page).apply_to(&mut shown);
        assert_eq!(ids(&shown), vec![0, 1, 2, 3, 4, 5]);

        // a first page replaces, whatever was shown
        Render::Replace(msgs(2)).apply_to(&mut shown);
        assert_eq!(ids(&shown), vec![0, 1]);
    }

    #[test]
    fn stray_completion_is_ignored() {
        let mut feed = Feed::new(PAGE);
        assert_eq!(feed.complete(Ok(msgs(3))), None);
        assert_eq!(feed.state(), FeedState::Idle);
        assert_eq!(feed.next_offset(), 0);
    }

    #[test]
    fn offset_only_moves_by_page_size() {
        bolero::check!()
            .with_type::<Vec<(u8, bool)>>()
            .for_each(|steps| {
                let mut feed = Feed::new(PAGE);
                let mut last = feed.next_offset();
                for (len, fail) in steps {
                    let reload = feed.state() == FeedState::Exhausted;
                    let req = match reload {
                        true => feed.reload(),
                        false => feed.request_page(None),
                    }
                    .expect("feed is never left loading");
                    assert_eq!(req.offset, if reload { 0 } else { last });
                    let res = match fail {
                        true => Err(FetchError::Transport(503)),
                        false => Ok(msgs(i64::from(*len % 13))),
                    };
                    let got_page = matches!(&res, Ok(m) if !m.is_empty());
                    feed.complete(res);
                    assert_ne!(feed.state(), FeedState::Loading);
                    if got_page {
                        assert_eq!(feed.next_offset(), req.offset + PAGE);
                    } else {
                        assert_eq!(feed.next_offset(), req.offset);
                    }
                    last = feed.next_offset();
                }
            });
    }
}
