use msgboard_client::{api::AuthorMetadata, BoardConfig, DEFAULT_PROFILE_URL};

mod storage;
mod ui;

lazy_static::lazy_static! {
    pub static ref CLIENT: reqwest::Client = reqwest::Client::new();
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoginInfo {
    pub token: String,
    pub me: AuthorMetadata,
}

/// Board and profile API locations, fixed at build time. The messages API
/// defaults to `/api` on the page's origin.
pub fn board_config() -> BoardConfig {
    let api_url = match option_env!("BOARD_API_URL") {
        Some(url) => String::from(url),
        None => {
            let origin = web_sys::window()
                .and_then(|w| w.location().origin().ok())
                .unwrap_or_default();
            format!("{origin}/api")
        }
    };
    BoardConfig {
        profile_url: String::from(option_env!("PROFILE_API_URL").unwrap_or(DEFAULT_PROFILE_URL)),
        api_key: String::from(option_env!("PROFILE_API_KEY").unwrap_or("")),
        ..BoardConfig::new(api_url)
    }
}

fn main() {
    tracing_wasm::set_as_global_default();
    yew::Renderer::<ui::App>::new().render();
}
