use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of bookmarked content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Video,
    Article,
    Tweet,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Article => "article",
            ContentType::Tweet => "tweet",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(ContentType::Image),
            "video" => Some(ContentType::Video),
            "article" => Some(ContentType::Article),
            "tweet" => Some(ContentType::Tweet),
            _ => None,
        }
    }
}

/// A registered user. The password hash never leaves the storage layer
/// through any serialized surface.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Parameters for creating a new user at signup.
#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
}

/// A stored content item with its tag titles resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub content_id: Uuid,
    pub user_id: Uuid,
    pub link: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Parameters for creating or replacing a content item. Tag names are raw
/// (already validated) strings; the store reconciles them to tag ids before
/// anything is persisted.
#[derive(Debug, Clone)]
pub struct ContentParams {
    pub link: String,
    pub content_type: ContentType,
    pub title: String,
    pub display_text: Option<String>,
    pub tag_names: Vec<String>,
}

/// Public view of a shared content item. Carries only fields intended to be
/// public; the sharer is identified by first name alone.
#[derive(Debug, Clone, Serialize)]
pub struct SharedContent {
    pub link: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    pub tags: Vec<String>,
    pub shared_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_round_trips_known_values() {
        for raw in ["image", "video", "article", "tweet"] {
            let parsed = ContentType::parse(raw).unwrap();
            assert_eq!(parsed.as_str(), raw);
        }
        assert!(ContentType::parse("audio").is_none());
        assert!(ContentType::parse("Article").is_none());
    }
}
