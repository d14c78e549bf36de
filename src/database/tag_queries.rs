//! Tag reconciliation: turn a free-text set of tag names into a fully
//! resolved set of tag ids, creating missing tags exactly once.
//!
//! Tags are an open, append-only vocabulary shared across all users. Nothing
//! in here ever deletes or renames a tag.

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use super::error::{is_unique_violation, Result};
use super::Database;

impl Database {
    /// Resolve tag names to tag ids, creating any that do not exist yet.
    ///
    /// Duplicate names within one call are tolerated (deduped before
    /// lookup). The returned ids carry no guaranteed order. Idempotent: a
    /// second call with the same names creates zero new tags.
    pub async fn reconcile_tags(&self, names: &[String]) -> Result<Vec<Uuid>> {
        let mut requested: Vec<&str> = Vec::new();
        for name in names {
            let trimmed = name.trim();
            if !trimmed.is_empty() && !requested.contains(&trimmed) {
                requested.push(trimmed);
            }
        }
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        // One bulk read for everything already in the vocabulary
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT tag_id, title FROM tags WHERE title IN (");
        let mut sep = qb.separated(", ");
        for name in &requested {
            sep.push_bind(*name);
        }
        qb.push(")");

        let rows = qb.build().fetch_all(&**self).await?;

        let mut ids = Vec::with_capacity(requested.len());
        let mut existing_titles = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.get("tag_id");
            ids.push(Uuid::parse_str(&id).expect("invalid tag_id UUID"));
            existing_titles.push(row.get::<String, _>("title"));
        }

        for name in requested {
            if existing_titles.iter().any(|t| t.as_str() == name) {
                continue;
            }
            ids.push(self.create_or_fetch_tag(name).await?);
        }

        Ok(ids)
    }

    /// Insert a tag, falling back to re-reading it when a concurrent
    /// reconciliation won the race on the title uniqueness constraint. A
    /// benign tag race must never fail the surrounding content write.
    pub(crate) async fn create_or_fetch_tag(&self, title: &str) -> Result<Uuid> {
        let tag_id = Uuid::new_v4();
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO tags (tag_id, title, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(tag_id.to_string())
        .bind(title)
        .bind(now)
        .execute(&**self)
        .await;

        match result {
            Ok(_) => Ok(tag_id),
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(title, "tag already created concurrently, re-reading");
                let row = sqlx::query("SELECT tag_id FROM tags WHERE title = ?1")
                    .bind(title)
                    .fetch_one(&**self)
                    .await?;
                let id: String = row.get("tag_id");
                Ok(Uuid::parse_str(&id).expect("invalid tag_id UUID"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) async fn tag_titles_for_content(&self, content_id: &Uuid) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT t.title
            FROM content_tags ct
            JOIN tags t ON t.tag_id = ct.tag_id
            WHERE ct.content_id = ?1
            ORDER BY ct.rowid
            "#,
        )
        .bind(content_id.to_string())
        .fetch_all(&**self)
        .await?;

        Ok(rows.iter().map(|r| r.get("title")).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::super::tests::setup_test_db;
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    async fn tag_count(db: &Database) -> i64 {
        sqlx::query("SELECT COUNT(*) AS count FROM tags")
            .fetch_one(&**db)
            .await
            .unwrap()
            .get("count")
    }

    #[tokio::test]
    async fn creates_missing_tags_once() {
        let db = setup_test_db().await;

        let first = db
            .reconcile_tags(&names(&["rust-lang", "reading-list"]))
            .await
            .unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(tag_count(&db).await, 2);

        // Second call with the same names resolves to the same ids and
        // creates nothing new.
        let second = db
            .reconcile_tags(&names(&["rust-lang", "reading-list"]))
            .await
            .unwrap();
        assert_eq!(
            first.iter().collect::<HashSet<_>>(),
            second.iter().collect::<HashSet<_>>()
        );
        assert_eq!(tag_count(&db).await, 2);
    }

    #[tokio::test]
    async fn dedupes_names_within_one_call() {
        let db = setup_test_db().await;

        let ids = db
            .reconcile_tags(&names(&["rust-lang", " rust-lang ", "rust-lang"]))
            .await
            .unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(tag_count(&db).await, 1);
    }

    #[tokio::test]
    async fn mixes_existing_and_new_tags() {
        let db = setup_test_db().await;

        let existing = db.reconcile_tags(&names(&["rust-lang"])).await.unwrap();
        let mixed = db
            .reconcile_tags(&names(&["rust-lang", "databases"]))
            .await
            .unwrap();

        assert_eq!(mixed.len(), 2);
        assert!(mixed.contains(&existing[0]));
        assert_eq!(tag_count(&db).await, 2);
    }

    #[tokio::test]
    async fn insert_race_falls_back_to_read() {
        let db = setup_test_db().await;

        // Simulate the concurrent winner
        let winner = db.create_or_fetch_tag("rust-lang").await.unwrap();
        // The loser's insert hits the uniqueness constraint and re-reads
        let loser = db.create_or_fetch_tag("rust-lang").await.unwrap();

        assert_eq!(winner, loser);
        assert_eq!(tag_count(&db).await, 1);
    }

    #[tokio::test]
    async fn empty_input_is_empty_output() {
        let db = setup_test_db().await;
        let ids = db.reconcile_tags(&[]).await.unwrap();
        assert!(ids.is_empty());
        assert_eq!(tag_count(&db).await, 0);
    }
}
