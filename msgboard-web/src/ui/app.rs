use std::rc::Rc;

use gloo_storage::{LocalStorage, Storage};
use msgboard_client::{
    api::{AuthorId, AuthorMetadata, Message, NewMessage, PostResponse},
    apply_to_all, enrich, scroll, AnnotatedMessage, Feed, FeedState, FetchError, HttpBoard,
    HttpProfiles, LookupError, MessageSource, MetadataCache, PageRequest, ProfileSource,
};
use wasm_bindgen::{closure::Closure, JsCast};
use yew::prelude::*;

use crate::{storage::BrowserStore, ui, LoginInfo};

const KEY_LOGIN: &str = "login";

pub enum AppMsg {
    ScrolledToBottom,
    PageFetched(Result<Vec<Message>, FetchError>),
    AuthorResolved(Result<AuthorMetadata, LookupError>),

    SignIn(String),
    SignedIn(String, Result<AuthorMetadata, LookupError>),
    SignOut,

    Post(String),
    Posted(Result<PostResponse, FetchError>),
}

pub struct App {
    feed: Feed,
    cache: Rc<MetadataCache<BrowserStore>>,
    board: Rc<HttpBoard>,
    profiles: Rc<HttpProfiles>,
    shown: Rc<Vec<AnnotatedMessage>>,
    login: Option<LoginInfo>,
    pending_reload: bool,
    error: Option<String>,
    scroll_listener: Option<Closure<dyn Fn()>>,
}

impl App {
    fn request_page(&mut self, ctx: &Context<Self>, offset: Option<u64>) {
        if let Some(req) = self.feed.request_page(offset) {
            fetch_page(ctx, self.board.clone(), req);
        }
    }

    fn reload(&mut self, ctx: &Context<Self>) {
        match self.feed.state() {
            // picked up when the page in flight lands
            FeedState::Loading => self.pending_reload = true,
            FeedState::Idle | FeedState::Exhausted => self.request_page(ctx, Some(0)),
        }
    }

    fn page_fetched(&mut self, ctx: &Context<Self>, result: Result<Vec<Message>, FetchError>) {
        if let Some(render) = self.feed.complete(result) {
            if render.is_replace() {
                if let Err(err) = self.cache.save_last_full_batch(render.items()) {
                    tracing::warn!(?err, "failed saving first page");
                }
            }
            let mut unresolved = Vec::new();
            let render = render.map(|msgs| {
                let resolution = self.cache.resolve(msgs);
                unresolved = resolution.unresolved;
                resolution.messages
            });
            render.apply_to(Rc::make_mut(&mut self.shown));
            for author in unresolved {
                lookup_author(ctx, self.profiles.clone(), self.cache.clone(), author);
            }
        }
        if self.pending_reload {
            self.pending_reload = false;
            self.request_page(ctx, Some(0));
        }
    }

    fn listen_for_scroll(ctx: &Context<Self>) -> Option<Closure<dyn Fn()>> {
        let window = web_sys::window()?;
        let link = ctx.link().clone();
        let listener = Closure::<dyn Fn()>::new(move || {
            if is_window_at_bottom() {
                link.send_message(AppMsg::ScrolledToBottom);
            }
        });
        if let Err(err) =
            window.add_event_listener_with_callback("scroll", listener.as_ref().unchecked_ref())
        {
            tracing::error!(?err, "failed listening for scroll events");
            return None;
        }
        Some(listener)
    }
}

fn is_window_at_bottom() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let scroll = window.scroll_y().unwrap_or(0.);
    let viewport = window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or(0.);
    let document = window
        .document()
        .and_then(|d| d.document_element())
        .map(|e| f64::from(e.scroll_height()))
        .unwrap_or(0.);
    scroll::is_at_bottom(scroll, viewport, document)
}

fn fetch_page(ctx: &Context<App>, board: Rc<HttpBoard>, req: PageRequest) {
    ctx.link().send_future(async move {
        tracing::debug!(?req, "fetching page");
        AppMsg::PageFetched(board.fetch_page(req).await)
    });
}

fn lookup_author(
    ctx: &Context<App>,
    profiles: Rc<HttpProfiles>,
    cache: Rc<MetadataCache<BrowserStore>>,
    author: AuthorId,
) {
    ctx.link().send_future(async move {
        AppMsg::AuthorResolved(enrich(&*profiles, &*cache, &author).await)
    });
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let cfg = crate::board_config();
        let board = HttpBoard::new(crate::CLIENT.clone(), &cfg.api_url);
        let profiles = HttpProfiles::new(crate::CLIENT.clone(), &cfg.profile_url, cfg.api_key);
        let (board, profiles) = match (board, profiles) {
            (Ok(b), Ok(p)) => (Rc::new(b), Rc::new(p)),
            (Err(err), _) | (_, Err(err)) => {
                tracing::error!(?err, "invalid board configuration");
                panic!("invalid board configuration: {err:#}");
            }
        };

        let cache = Rc::new(MetadataCache::new(BrowserStore));
        let shown = cache.resolve(cache.load_last_full_batch()).messages;
        let mut this = App {
            feed: Feed::new(cfg.page_size),
            cache,
            board,
            profiles,
            shown: Rc::new(shown),
            login: LocalStorage::get(KEY_LOGIN).ok(),
            pending_reload: false,
            error: None,
            scroll_listener: App::listen_for_scroll(ctx),
        };
        this.request_page(ctx, Some(0));
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::ScrolledToBottom => {
                self.request_page(ctx, None);
                return false;
            }
            AppMsg::PageFetched(result) => self.page_fetched(ctx, result),
            AppMsg::AuthorResolved(Ok(meta)) => {
                return apply_to_all(Rc::<Vec<AnnotatedMessage>>::make_mut(&mut self.shown), &meta) > 0;
            }
            // placeholders stay, the failure was already logged
            AppMsg::AuthorResolved(Err(_)) => return false,
            AppMsg::SignIn(token) => {
                let profiles = self.profiles.clone();
                ctx.link().send_future(async move {
                    let res = profiles.whoami(&token).await;
                    AppMsg::SignedIn(token, res)
                });
                return false;
            }
            AppMsg::SignedIn(token, Ok(me)) => {
                let login = LoginInfo { token, me };
                if let Err(err) = LocalStorage::set(KEY_LOGIN, &login) {
                    tracing::warn!(?err, "failed saving login info to LocalStorage");
                }
                tracing::info!(author = %login.me.author_id, "signed in");
                self.login = Some(login);
                self.error = None;
            }
            AppMsg::SignedIn(_, Err(err)) => {
                tracing::warn!(%err, "failed signing in");
                self.error = Some(format!("Could not sign in: {err}"));
            }
            AppMsg::SignOut => {
                LocalStorage::delete(KEY_LOGIN);
                self.login = None;
            }
            AppMsg::Post(comment) => {
                let Some(login) = &self.login else {
                    return false;
                };
                let msg = NewMessage {
                    author_id: login.me.author_id.clone(),
                    comment,
                };
                if let Err(err) = msg.validate() {
                    self.error = Some(err.to_string());
                    return true;
                }
                let board = self.board.clone();
                let token = login.token.clone();
                ctx.link().send_future(async move {
                    AppMsg::Posted(board.post_message(&token, &msg).await)
                });
                return false;
            }
            AppMsg::Posted(Ok(_)) => {
                self.error = None;
                self.reload(ctx);
            }
            AppMsg::Posted(Err(err)) => {
                tracing::warn!(%err, "failed posting message");
                self.error = Some(format!("Could not post: {err}"));
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let status = match self.feed.state() {
            FeedState::Loading => "Loading...",
            FeedState::Exhausted => "No more messages",
            FeedState::Idle => "",
        };
        html! {
            <div class="message-board">
                if let Some(error) = &self.error {
                    <div class="error-banner" role="alert">{ error.clone() }</div>
                }
                { match &self.login {
                    Some(login) => html! {
                        <ui::PostBox
                            me={login.me.clone()}
                            on_post={ctx.link().callback(AppMsg::Post)}
                            on_sign_out={ctx.link().callback(|_| AppMsg::SignOut)}
                        />
                    },
                    None => html! {
                        <ui::SignIn on_submit={ctx.link().callback(AppMsg::SignIn)} />
                    },
                } }
                <ui::MessageList messages={self.shown.clone()} />
                <div class="feed-status">{ status }</div>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        if let (Some(window), Some(listener)) = (web_sys::window(), self.scroll_listener.take()) {
            let _ = window
                .remove_event_listener_with_callback("scroll", listener.as_ref().unchecked_ref());
        }
    }
}
