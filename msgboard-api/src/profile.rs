//! Responses of the external profile API, restricted to the fields the board
//! asks for with `fields=displayName,image` (plus `id` for `people/me`).

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ProfileResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ProfileImage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProfileError>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ProfileImage {
    pub url: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ProfileError {
    #[serde(default)]
    pub message: String,
}
