//! Share link lifecycle: publish, unpublish, and public resolution.

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use sqlx::Row;
use uuid::Uuid;

use super::error::{is_unique_violation, Result, StoreError};
use super::models::{ContentType, SharedContent};
use super::Database;

/// Fixed length of the URL-safe share hash.
pub const SHARE_HASH_LEN: usize = 12;

/// Collisions on a 12-char alphanumeric hash are astronomically unlikely;
/// the retry bound exists so a broken RNG cannot spin forever.
const MAX_HASH_ATTEMPTS: usize = 8;

fn generate_hash() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_HASH_LEN)
        .map(char::from)
        .collect()
}

impl Database {
    /// Publish a content item, returning its share hash. Publishing is
    /// idempotent: if the item is already shared the existing hash is
    /// returned, so previously distributed links stay valid. `Forbidden`
    /// when the caller does not own the content.
    pub async fn publish_content(&self, content_id: &Uuid, owner: &Uuid) -> Result<String> {
        self.content_owned_by(content_id, owner).await?;

        if let Some(existing) = self.hash_for_content(content_id).await? {
            return Ok(existing);
        }

        let now = Utc::now().timestamp();
        for _ in 0..MAX_HASH_ATTEMPTS {
            let hash = generate_hash();
            let result = sqlx::query(
                r#"
                INSERT INTO links (hash, content_id, user_id, created_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&hash)
            .bind(content_id.to_string())
            .bind(owner.to_string())
            .bind(now)
            .execute(&**self)
            .await;

            match result {
                Ok(_) => return Ok(hash),
                Err(e) if is_unique_violation(&e) => {
                    // Either the generated hash collided, or a concurrent
                    // publish already created the link for this content.
                    if let Some(existing) = self.hash_for_content(content_id).await? {
                        return Ok(existing);
                    }
                    tracing::warn!(content_id = %content_id, "share hash collision, regenerating");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::HashSpaceExhausted)
    }

    /// Remove the share link for a content item. Idempotent: unpublishing
    /// an item that is not shared is not an error.
    pub async fn unpublish_content(&self, content_id: &Uuid, owner: &Uuid) -> Result<()> {
        self.content_owned_by(content_id, owner).await?;

        sqlx::query("DELETE FROM links WHERE content_id = ?1")
            .bind(content_id.to_string())
            .execute(&**self)
            .await?;

        Ok(())
    }

    /// Resolve a share hash to the public view of its content item. The
    /// only read in the system reachable without a credential.
    pub async fn resolve_share(&self, hash: &str) -> Result<SharedContent> {
        let row = sqlx::query(
            r#"
            SELECT c.content_id, c.link, c.content_type, c.title, c.display_text, u.first_name
            FROM links l
            JOIN contents c ON c.content_id = l.content_id
            JOIN users u ON u.user_id = l.user_id
            WHERE l.hash = ?1
            "#,
        )
        .bind(hash)
        .fetch_optional(&**self)
        .await?
        .ok_or(StoreError::NotFound)?;

        let content_id =
            Uuid::parse_str(&row.get::<String, _>("content_id")).expect("invalid content_id UUID");
        let raw_type: String = row.get("content_type");
        let tags = self.tag_titles_for_content(&content_id).await?;

        Ok(SharedContent {
            link: row.get("link"),
            content_type: ContentType::parse(&raw_type).expect("invalid content_type in database"),
            title: row.get("title"),
            display_text: row.get("display_text"),
            tags,
            shared_by: row.get("first_name"),
        })
    }

    pub(crate) async fn hash_for_content(&self, content_id: &Uuid) -> Result<Option<String>> {
        let row = sqlx::query("SELECT hash FROM links WHERE content_id = ?1")
            .bind(content_id.to_string())
            .fetch_optional(&**self)
            .await?;
        Ok(row.map(|r| r.get("hash")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::content_queries::tests::{article, test_user};
    use super::super::tests::setup_test_db;
    use super::*;

    #[tokio::test]
    async fn publish_then_resolve_matches_source() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;
        let content = db
            .create_content(&owner, article("Ten Char Title", &["tech-news"]))
            .await
            .unwrap();

        let hash = db
            .publish_content(&content.content_id, &owner)
            .await
            .unwrap();
        assert_eq!(hash.len(), SHARE_HASH_LEN);

        let shared = db.resolve_share(&hash).await.unwrap();
        assert_eq!(shared.link, content.link);
        assert_eq!(shared.content_type, content.content_type);
        assert_eq!(shared.title, content.title);
        assert_eq!(shared.tags, content.tags);
        assert_eq!(shared.shared_by, "Test");
    }

    #[tokio::test]
    async fn publish_twice_returns_same_hash() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;
        let content = db
            .create_content(&owner, article("Ten Char Title", &[]))
            .await
            .unwrap();

        let first = db
            .publish_content(&content.content_id, &owner)
            .await
            .unwrap();
        let second = db
            .publish_content(&content.content_id, &owner)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unpublish_revokes_and_is_idempotent() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;
        let content = db
            .create_content(&owner, article("Ten Char Title", &[]))
            .await
            .unwrap();

        let hash = db
            .publish_content(&content.content_id, &owner)
            .await
            .unwrap();

        db.unpublish_content(&content.content_id, &owner)
            .await
            .unwrap();
        let err = db.resolve_share(&hash).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        // Unpublishing an already-unpublished item is a no-op
        db.unpublish_content(&content.content_id, &owner)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cross_owner_publish_forbidden() {
        let db = setup_test_db().await;
        let a = test_user(&db, "a@example.com").await;
        let b = test_user(&db, "b@example.com").await;
        let content = db
            .create_content(&a, article("Ten Char Title", &[]))
            .await
            .unwrap();

        let err = db
            .publish_content(&content.content_id, &b)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden));

        let err = db
            .unpublish_content(&content.content_id, &b)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden));
    }

    #[tokio::test]
    async fn deleting_content_revokes_its_share() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;
        let content = db
            .create_content(&owner, article("Ten Char Title", &[]))
            .await
            .unwrap();

        let hash = db
            .publish_content(&content.content_id, &owner)
            .await
            .unwrap();
        db.delete_content(&content.content_id, &owner).await.unwrap();

        let err = db.resolve_share(&hash).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn unknown_hash_is_not_found() {
        let db = setup_test_db().await;
        let err = db.resolve_share("doesnotexist").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
