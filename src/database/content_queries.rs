use std::collections::HashMap;

use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use super::error::{is_unique_violation, Result, StoreError};
use super::models::{Content, ContentParams, ContentType};
use super::Database;

fn row_to_content(r: &sqlx::sqlite::SqliteRow) -> Content {
    let raw_type: String = r.get("content_type");
    Content {
        content_id: Uuid::parse_str(&r.get::<String, _>("content_id"))
            .expect("invalid content_id UUID"),
        user_id: Uuid::parse_str(&r.get::<String, _>("user_id")).expect("invalid user_id UUID"),
        link: r.get("link"),
        content_type: ContentType::parse(&raw_type).expect("invalid content_type in database"),
        title: r.get("title"),
        display_text: r.get("display_text"),
        tags: Vec::new(),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

impl Database {
    /// Create a content item for `owner`. Tag names are reconciled to ids
    /// first; the content row and its tag references are then written in a
    /// single transaction, so a failure never leaves the item half-written.
    /// Fails with `DuplicateTitle` when the owner already has an item with
    /// this title.
    pub async fn create_content(&self, owner: &Uuid, params: ContentParams) -> Result<Content> {
        let tag_ids = self.reconcile_tags(&params.tag_names).await?;

        let content_id = Uuid::new_v4();
        let now = Utc::now().timestamp();

        let mut tx = self.begin().await.map_err(StoreError::from)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO contents (content_id, user_id, link, content_type, title, display_text, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(content_id.to_string())
        .bind(owner.to_string())
        .bind(&params.link)
        .bind(params.content_type.as_str())
        .bind(&params.title)
        .bind(&params.display_text)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(StoreError::DuplicateTitle),
            Err(e) => return Err(e.into()),
        }

        for tag_id in &tag_ids {
            sqlx::query("INSERT INTO content_tags (content_id, tag_id) VALUES (?1, ?2)")
                .bind(content_id.to_string())
                .bind(tag_id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(StoreError::from)?;

        let tags = self.tag_titles_for_content(&content_id).await?;
        Ok(Content {
            content_id,
            user_id: *owner,
            link: params.link,
            content_type: params.content_type,
            title: params.title,
            display_text: params.display_text,
            tags,
            created_at: now,
            updated_at: now,
        })
    }

    /// List an owner's content items in insertion order, with tag titles
    /// resolved. An owner with zero items yields an empty list, not an
    /// error.
    pub async fn list_content(
        &self,
        owner: &Uuid,
        type_filter: Option<ContentType>,
    ) -> Result<Vec<Content>> {
        let rows = match type_filter {
            Some(content_type) => {
                sqlx::query(
                    r#"
                    SELECT content_id, user_id, link, content_type, title, display_text, created_at, updated_at
                    FROM contents
                    WHERE user_id = ?1 AND content_type = ?2
                    ORDER BY rowid
                    "#,
                )
                .bind(owner.to_string())
                .bind(content_type.as_str())
                .fetch_all(&**self)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT content_id, user_id, link, content_type, title, display_text, created_at, updated_at
                    FROM contents
                    WHERE user_id = ?1
                    ORDER BY rowid
                    "#,
                )
                .bind(owner.to_string())
                .fetch_all(&**self)
                .await?
            }
        };

        let mut contents: Vec<Content> = rows.iter().map(row_to_content).collect();
        if contents.is_empty() {
            return Ok(contents);
        }

        // One bulk read for the tag titles of the selected items
        let tag_rows = match type_filter {
            Some(content_type) => {
                sqlx::query(
                    r#"
                    SELECT ct.content_id, t.title
                    FROM content_tags ct
                    JOIN tags t ON t.tag_id = ct.tag_id
                    JOIN contents c ON c.content_id = ct.content_id
                    WHERE c.user_id = ?1 AND c.content_type = ?2
                    ORDER BY ct.rowid
                    "#,
                )
                .bind(owner.to_string())
                .bind(content_type.as_str())
                .fetch_all(&**self)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT ct.content_id, t.title
                    FROM content_tags ct
                    JOIN tags t ON t.tag_id = ct.tag_id
                    JOIN contents c ON c.content_id = ct.content_id
                    WHERE c.user_id = ?1
                    ORDER BY ct.rowid
                    "#,
                )
                .bind(owner.to_string())
                .fetch_all(&**self)
                .await?
            }
        };

        let mut by_content: HashMap<String, Vec<String>> = HashMap::new();
        for row in &tag_rows {
            by_content
                .entry(row.get("content_id"))
                .or_default()
                .push(row.get("title"));
        }

        for content in &mut contents {
            if let Some(tags) = by_content.remove(&content.content_id.to_string()) {
                content.tags = tags;
            }
        }

        Ok(contents)
    }

    /// Replace a content item's fields and tag set. `NotFound` when the item
    /// does not exist, `Forbidden` when the stored owner differs from the
    /// caller, `DuplicateTitle` when the new title collides with another
    /// item of the same owner.
    pub async fn update_content(
        &self,
        content_id: &Uuid,
        owner: &Uuid,
        params: ContentParams,
    ) -> Result<Content> {
        self.content_owned_by(content_id, owner).await?;

        let tag_ids = self.reconcile_tags(&params.tag_names).await?;
        let now = Utc::now().timestamp();

        let mut tx = self.begin().await.map_err(StoreError::from)?;

        let updated = sqlx::query(
            r#"
            UPDATE contents
            SET link = ?1, content_type = ?2, title = ?3, display_text = ?4, updated_at = ?5
            WHERE content_id = ?6
            "#,
        )
        .bind(&params.link)
        .bind(params.content_type.as_str())
        .bind(&params.title)
        .bind(&params.display_text)
        .bind(now)
        .bind(content_id.to_string())
        .execute(&mut *tx)
        .await;

        match updated {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(StoreError::DuplicateTitle),
            Err(e) => return Err(e.into()),
        }

        sqlx::query("DELETE FROM content_tags WHERE content_id = ?1")
            .bind(content_id.to_string())
            .execute(&mut *tx)
            .await?;

        for tag_id in &tag_ids {
            sqlx::query("INSERT INTO content_tags (content_id, tag_id) VALUES (?1, ?2)")
                .bind(content_id.to_string())
                .bind(tag_id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(StoreError::from)?;

        let tags = self.tag_titles_for_content(content_id).await?;
        let row = self
            .content_by_id(content_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(Content { tags, ..row })
    }

    /// Delete a content item, its tag references, and any share link
    /// pointing at it, in one transaction. Same `NotFound`/`Forbidden`
    /// semantics as update.
    pub async fn delete_content(&self, content_id: &Uuid, owner: &Uuid) -> Result<()> {
        self.content_owned_by(content_id, owner).await?;

        let mut tx = self.begin().await.map_err(StoreError::from)?;

        // A dangling share link referencing deleted content would stay
        // publicly resolvable; it goes first.
        sqlx::query("DELETE FROM links WHERE content_id = ?1")
            .bind(content_id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM content_tags WHERE content_id = ?1")
            .bind(content_id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM contents WHERE content_id = ?1")
            .bind(content_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(StoreError::from)?;
        Ok(())
    }

    /// Fetch a content row (tags unresolved) by id.
    pub(crate) async fn content_by_id(&self, content_id: &Uuid) -> Result<Option<Content>> {
        let row = sqlx::query(
            r#"
            SELECT content_id, user_id, link, content_type, title, display_text, created_at, updated_at
            FROM contents
            WHERE content_id = ?1
            "#,
        )
        .bind(content_id.to_string())
        .fetch_optional(&**self)
        .await?;

        Ok(row.as_ref().map(row_to_content))
    }

    /// The ownership gate shared by every mutating content operation: the
    /// authenticated caller's id is compared against the stored owner
    /// reference, never a client-supplied owner field.
    pub(crate) async fn content_owned_by(&self, content_id: &Uuid, owner: &Uuid) -> Result<Content> {
        let content = self
            .content_by_id(content_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        if content.user_id != *owner {
            return Err(StoreError::Forbidden);
        }
        Ok(content)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::super::models::CreateUserParams;
    use super::super::tests::setup_test_db;
    use super::*;

    pub(crate) async fn test_user(db: &Database, email: &str) -> Uuid {
        db.create_user(CreateUserParams {
            first_name: "Test".to_string(),
            last_name: None,
            email: email.to_string(),
            password_hash: "$2b$10$fakefakefakefakefakefake".to_string(),
        })
        .await
        .unwrap()
        .user_id
    }

    pub(crate) fn article(title: &str, tags: &[&str]) -> ContentParams {
        ContentParams {
            link: "https://example.com/post".to_string(),
            content_type: ContentType::Article,
            title: title.to_string(),
            display_text: Some("worth a read".to_string()),
            tag_names: tags.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_and_list_with_tags() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;

        let created = db
            .create_content(&owner, article("Ten Char Title", &["tech-news", "reading-list"]))
            .await
            .unwrap();
        assert_eq!(created.tags.len(), 2);

        let listed = db.list_content(&owner, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Ten Char Title");
        assert_eq!(listed[0].tags.len(), 2);
        assert!(listed[0].tags.contains(&"tech-news".to_string()));
    }

    #[tokio::test]
    async fn duplicate_title_same_owner_conflicts() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;

        db.create_content(&owner, article("Ten Char Title", &[]))
            .await
            .unwrap();
        let err = db
            .create_content(&owner, article("Ten Char Title", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTitle));
    }

    #[tokio::test]
    async fn same_title_different_owner_is_fine() {
        let db = setup_test_db().await;
        let a = test_user(&db, "a@example.com").await;
        let b = test_user(&db, "b@example.com").await;

        db.create_content(&a, article("Ten Char Title", &[]))
            .await
            .unwrap();
        db.create_content(&b, article("Ten Char Title", &[]))
            .await
            .unwrap();

        assert_eq!(db.list_content(&a, None).await.unwrap().len(), 1);
        assert_eq!(db.list_content(&b, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_filters_by_type() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;

        db.create_content(&owner, article("Ten Char Title", &["tech-news"]))
            .await
            .unwrap();
        let mut video = article("Another Long Title", &["video-queue"]);
        video.content_type = ContentType::Video;
        db.create_content(&owner, video).await.unwrap();

        let articles = db
            .list_content(&owner, Some(ContentType::Article))
            .await
            .unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].content_type, ContentType::Article);
        assert_eq!(articles[0].tags, vec!["tech-news".to_string()]);

        let videos = db
            .list_content(&owner, Some(ContentType::Video))
            .await
            .unwrap();
        assert_eq!(videos[0].tags, vec!["video-queue".to_string()]);

        let tweets = db
            .list_content(&owner, Some(ContentType::Tweet))
            .await
            .unwrap();
        assert!(tweets.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_and_tags() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;

        let created = db
            .create_content(&owner, article("Ten Char Title", &["tech-news"]))
            .await
            .unwrap();

        let mut params = article("A Fresh New Title", &["reading-list"]);
        params.link = "https://example.com/other".to_string();
        let updated = db
            .update_content(&created.content_id, &owner, params)
            .await
            .unwrap();

        assert_eq!(updated.title, "A Fresh New Title");
        assert_eq!(updated.link, "https://example.com/other");
        assert_eq!(updated.tags, vec!["reading-list".to_string()]);

        // The replaced tag stays in the shared vocabulary
        let ids = db
            .reconcile_tags(&["tech-news".to_string()])
            .await
            .unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn update_title_collision_conflicts() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;

        db.create_content(&owner, article("Ten Char Title", &[]))
            .await
            .unwrap();
        let other = db
            .create_content(&owner, article("Another Long Title", &[]))
            .await
            .unwrap();

        let err = db
            .update_content(&other.content_id, &owner, article("Ten Char Title", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTitle));
    }

    #[tokio::test]
    async fn cross_owner_update_and_delete_forbidden() {
        let db = setup_test_db().await;
        let a = test_user(&db, "a@example.com").await;
        let b = test_user(&db, "b@example.com").await;

        let created = db
            .create_content(&a, article("Ten Char Title", &[]))
            .await
            .unwrap();

        let err = db
            .update_content(&created.content_id, &b, article("Hijacked Title", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden));

        let err = db.delete_content(&created.content_id, &b).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden));

        // Content unchanged
        let listed = db.list_content(&a, None).await.unwrap();
        assert_eq!(listed[0].title, "Ten Char Title");
    }

    #[tokio::test]
    async fn missing_content_is_not_found() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;

        let err = db
            .update_content(&Uuid::new_v4(), &owner, article("Ten Char Title", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let err = db.delete_content(&Uuid::new_v4(), &owner).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_item_and_tag_references() {
        let db = setup_test_db().await;
        let owner = test_user(&db, "a@example.com").await;

        let created = db
            .create_content(&owner, article("Ten Char Title", &["tech-news"]))
            .await
            .unwrap();
        db.delete_content(&created.content_id, &owner).await.unwrap();

        assert!(db.list_content(&owner, None).await.unwrap().is_empty());
        let titles = db.tag_titles_for_content(&created.content_id).await.unwrap();
        assert!(titles.is_empty());
    }
}
