//! Typed wrappers and request bodies for the study-room REST endpoints the forms talk to.
//!
//! Every wrapper returns `Ok` only for a `2xx` answer; anything else becomes
//! [`TransportError::Status`].

use crate::client::{ApiResponse, Transport};
use crate::error::{Result, TransportError};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const AUTH_MAIL_PATH: &str = "/api/v1/auth/mail";
pub const NICKNAME_PATH: &str = "/api/v1/users/nickname";
pub const USERS_PATH: &str = "/api/v1/users";
pub const POSTS_PATH: &str = "/api/v1/posts";
pub const ROOMS_PATH: &str = "/api/v1/rooms";

/// `type` sent along with a verification mail request.
const JOIN_MAIL_TYPE: &str = "join";

/// Kind of recruitment post. Serialized as the server's enum names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    FindingMembers,
    FindingRooms,
}

impl PostType {
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::FindingMembers => "FINDING_MEMBERS",
            PostType::FindingRooms => "FINDING_ROOMS",
        }
    }
}

/// Body of `POST /api/v1/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub user_id: u64,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub is_recruited: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub room_id: Option<u64>,
}

/// Body of `POST /api/v1/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub nickname: String,
    pub password: String,
}

/// One entry of the room listing, as the recruit form needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyRoom {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub max_users: u32,
    #[serde(default)]
    pub member_number: u32,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub cam_enabled: bool,
}

/// Asks the server to mail a join verification code. Expects `201`.
pub async fn send_email_code<T: Transport + ?Sized>(transport: &T, email: &str) -> Result<ApiResponse> {
    transport
        .post(AUTH_MAIL_PATH, json!({ "email": email, "type": JOIN_MAIL_TYPE }))
        .await?
        .into_success()
}

/// Checks a mailed code against the email. Expects `200`.
pub async fn check_email_code<T: Transport + ?Sized>(
    transport: &T,
    email: &str,
    code: &str,
) -> Result<ApiResponse> {
    let path = with_query(AUTH_MAIL_PATH, &[("email", email), ("code", code)])?;
    transport.get(&path).await?.into_success()
}

/// Nickname availability. `200` means the nickname is free.
pub async fn check_nickname<T: Transport + ?Sized>(transport: &T, nickname: &str) -> Result<ApiResponse> {
    let path = with_query(NICKNAME_PATH, &[("nickname", nickname)])?;
    transport.get(&path).await?.into_success()
}

/// Room listing; rooms live under `data.content`.
pub async fn list_rooms<T: Transport + ?Sized>(transport: &T) -> Result<Vec<StudyRoom>> {
    let response = transport.get(ROOMS_PATH).await?.into_success()?;
    let content = response
        .data
        .get("data")
        .and_then(|data| data.get("content"))
        .cloned()
        .ok_or_else(|| TransportError::ParseError("Missing `data.content` in room listing".to_string()))?;
    Ok(serde_json::from_value(content)?)
}

/// Appends url-encoded query pairs to `path`.
pub fn with_query(path: &str, pairs: &[(&str, &str)]) -> Result<String> {
    // Only the query serializer is used; the origin is discarded.
    let mut url = reqwest::Url::parse("http://localhost/")
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
    url.query_pairs_mut().extend_pairs(pairs.iter().copied());
    match url.query() {
        Some(query) if !query.is_empty() => Ok(format!("{}?{}", path, query)),
        _ => Ok(path.to_string()),
    }
}
