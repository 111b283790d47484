use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

pub type Id = String;

/// Which server collection an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Lost,
    Found,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Lost => "lost",
            ItemKind::Found => "found",
        }
    }

    /// Path prefix of the kind-scoped collection, e.g. `/api/lost-item`.
    pub fn collection(&self) -> &'static str {
        match self {
            ItemKind::Lost => "lost-item",
            ItemKind::Found => "found-item",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ClientError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lost" => Ok(ItemKind::Lost),
            "found" => Ok(ItemKind::Found),
            other => Err(ClientError::validation(format!("unknown item type '{other}'"))),
        }
    }
}

/// Server-defined status. Unknown values are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemStatus {
    Active,
    Pending,
    Matched,
    Returned,
    Other(String),
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Active
    }
}

impl From<String> for ItemStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "active" => ItemStatus::Active,
            "pending" => ItemStatus::Pending,
            "matched" => ItemStatus::Matched,
            "returned" => ItemStatus::Returned,
            _ => ItemStatus::Other(s),
        }
    }
}

impl From<ItemStatus> for String {
    fn from(s: ItemStatus) -> Self {
        match s {
            ItemStatus::Active => "Active".into(),
            ItemStatus::Pending => "Pending".into(),
            ItemStatus::Matched => "matched".into(),
            ItemStatus::Returned => "returned".into(),
            ItemStatus::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(alias = "_id")]
    pub id: Id,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub other_info: Vec<String>,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default, alias = "uploadedBy", alias = "userId")]
    pub owner_id: Id,
    pub created_at: DateTime<Utc>,
}

/// An item tagged with the collection it was fetched from. The tag is assigned
/// at the fetch call site and is never inferred from the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OwnedItem {
    Lost(Item),
    Found(Item),
}

impl OwnedItem {
    pub fn tagged(kind: ItemKind, item: Item) -> Self {
        match kind {
            ItemKind::Lost => OwnedItem::Lost(item),
            ItemKind::Found => OwnedItem::Found(item),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            OwnedItem::Lost(_) => ItemKind::Lost,
            OwnedItem::Found(_) => ItemKind::Found,
        }
    }

    pub fn item(&self) -> &Item {
        match self {
            OwnedItem::Lost(i) | OwnedItem::Found(i) => i,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, rename = "lostItems", alias = "lostItemIds")]
    pub lost_item_ids: Vec<Id>,
    #[serde(default, rename = "foundItems", alias = "foundItemIds")]
    pub found_item_ids: Vec<Id>,
}

/// Candidate match as returned by the matching endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedItem {
    #[serde(alias = "_id")]
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub location: Option<String>,
    pub uploaded_by: Id,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub other_info: Option<Vec<String>>,
}

/// A match after uploader resolution and display normalisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMatch {
    pub id: Id,
    pub name: String,
    pub image: String,
    pub location: String,
    pub uploaded_by: Id,
    pub uploader_email: String,
    pub created_at: DateTime<Utc>,
    pub created_display: String,
    pub description: String,
    pub other_info: Vec<String>,
}

/// Payload for report creation; `id` and `createdAt` are assigned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other_info: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public user info; only the email is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRequest {
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionResponse {
    #[serde(alias = "description")]
    pub caption: String,
}
