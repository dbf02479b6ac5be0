use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile from `users/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub pronouns: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub user_icon: String,
    #[serde(default)]
    pub current_avatar_image_url: String,
    #[serde(default)]
    pub current_avatar_thumbnail_image_url: String,
    /// Upstream sends this one in snake_case
    #[serde(default, rename = "date_joined")]
    pub date_joined: Option<String>,
    #[serde(default)]
    pub platform: String,
}

/// World from `worlds/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct World {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub occupants: u64,
    #[serde(default)]
    pub visits: u64,
    #[serde(default)]
    pub favorites: u64,
    #[serde(default)]
    pub heat: u8,
    #[serde(default)]
    pub popularity: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub release_status: String,
    #[serde(default)]
    pub thumbnail_image_url: String,
    #[serde(default, rename = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Group from `groups/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_code: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub online_member_count: u64,
    #[serde(default)]
    pub icon_url: String,
    #[serde(default)]
    pub banner_url: String,
    #[serde(default)]
    pub join_state: String,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Avatar from `avatars/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub release_status: String,
    #[serde(default)]
    pub thumbnail_image_url: String,
    #[serde(default, rename = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// File metadata from `file/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub versions: Vec<FileVersion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileVersion {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub file: Option<FileDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    #[serde(default)]
    pub size_in_bytes: u64,
    #[serde(default)]
    pub url: String,
}

/// Group membership entry from `users/{id}/groups` and
/// `users/{id}/groups/represented`.
///
/// Every field is defaulted because the represented-group endpoint answers
/// with an empty object when the user represents nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserGroup {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_code: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub is_representing: bool,
    #[serde(default)]
    pub icon_url: String,
    #[serde(default)]
    pub icon_id: Option<String>,
}

impl UserGroup {
    /// The represented-group endpoint signals "none" with an empty object
    pub fn is_empty(&self) -> bool {
        self.group_id.is_empty()
    }
}

/// Friends-list entry from `auth/user/friends`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_description: String,
    /// `offline`, `private`, `traveling`, or an instance descriptor
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub user_icon: String,
    #[serde(default)]
    pub current_avatar_thumbnail_image_url: String,
}
