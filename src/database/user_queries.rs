use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use super::error::{is_unique_violation, Result, StoreError};
use super::models::{CreateUserParams, User};
use super::Database;

fn row_to_user(r: &sqlx::sqlite::SqliteRow) -> User {
    User {
        user_id: Uuid::parse_str(&r.get::<String, _>("user_id")).expect("invalid user_id UUID"),
        first_name: r.get("first_name"),
        last_name: r.get("last_name"),
        email: r.get("email"),
        password_hash: r.get("password_hash"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

impl Database {
    /// Create a new user. Fails with `EmailTaken` when the email is already
    /// registered -- email uniqueness is enforced by the schema, not by a
    /// read-then-write check.
    pub async fn create_user(&self, params: CreateUserParams) -> Result<User> {
        let user_id = Uuid::new_v4();
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO users (user_id, first_name, last_name, email, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(user_id.to_string())
        .bind(&params.first_name)
        .bind(&params.last_name)
        .bind(&params.email)
        .bind(&params.password_hash)
        .bind(now)
        .bind(now)
        .execute(&**self)
        .await;

        match result {
            Ok(_) => Ok(User {
                user_id,
                first_name: params.first_name,
                last_name: params.last_name,
                email: params.email,
                password_hash: params.password_hash,
                created_at: now,
                updated_at: now,
            }),
            Err(e) if is_unique_violation(&e) => Err(StoreError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, first_name, last_name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&**self)
        .await?;

        Ok(row.as_ref().map(row_to_user))
    }

    pub async fn user_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, first_name, last_name, email, password_hash, created_at, updated_at
            FROM users
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&**self)
        .await?;

        Ok(row.as_ref().map(row_to_user))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup_test_db;
    use super::*;

    fn params(email: &str) -> CreateUserParams {
        CreateUserParams {
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            email: email.to_string(),
            password_hash: "$2b$10$fakefakefakefakefakefake".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_fetch_user() {
        let db = setup_test_db().await;

        let user = db.create_user(params("ada@example.com")).await.unwrap();
        assert_eq!(user.email, "ada@example.com");

        let by_email = db
            .user_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.user_id, user.user_id);

        let by_id = db.user_by_id(&user.user_id).await.unwrap().unwrap();
        assert_eq!(by_id.email, user.email);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let db = setup_test_db().await;

        db.create_user(params("ada@example.com")).await.unwrap();
        let err = db.create_user(params("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));

        // No second row was created
        let user = db.user_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(user.first_name, "Ada");
    }

    #[tokio::test]
    async fn missing_user_is_none_not_error() {
        let db = setup_test_db().await;
        assert!(db.user_by_email("nobody@example.com").await.unwrap().is_none());
        assert!(db.user_by_id(&Uuid::new_v4()).await.unwrap().is_none());
    }
}
