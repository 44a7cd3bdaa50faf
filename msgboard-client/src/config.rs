use crate::{HttpBoard, HttpProfiles, DEFAULT_PAGE_SIZE};

pub const DEFAULT_PROFILE_URL: &str = "https://www.googleapis.com/plus/v1/";

/// Where the board and the profile API live
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct BoardConfig {
    /// Messages endpoint, eg. `https://example.org/api`
    pub api_url: String,

    #[serde(default = "default_profile_url")]
    pub profile_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_profile_url() -> String {
    String::from(DEFAULT_PROFILE_URL)
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl BoardConfig {
    pub fn new(api_url: String) -> BoardConfig {
        BoardConfig {
            api_url,
            profile_url: default_profile_url(),
            api_key: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn board(&self, client: reqwest::Client) -> anyhow::Result<HttpBoard> {
        HttpBoard::new(client, &self.api_url)
    }

    pub fn profiles(&self, client: reqwest::Client) -> anyhow::Result<HttpProfiles> {
        HttpProfiles::new(client, &self.profile_url, self.api_key.clone())
    }
}
