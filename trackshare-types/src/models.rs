use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identifier of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Stable identifier of a shared post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Profile data of a signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
}

/// A shared track as shown in the profile's shares list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "postId")]
    pub id: PostId,
    #[serde(rename = "songName")]
    pub title: String,
    #[serde(rename = "artist")]
    pub creator: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Result of looking up a profile owner by username
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerLookup {
    Found(UserId),
    NotFound,
}

// Request/Response types for API

/// Body of `GET /user/id/username/{name}`; an absent, null or zero `userId`
/// means no such user
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdResponse {
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl From<UserIdResponse> for OwnerLookup {
    fn from(response: UserIdResponse) -> Self {
        match response.user_id {
            Some(id) if id.0 != 0 => OwnerLookup::Found(id),
            _ => OwnerLookup::NotFound,
        }
    }
}

/// JSON error body the server sends with a failing status
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}
