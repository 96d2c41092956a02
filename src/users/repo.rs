use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewUser, User};

/// Credential store: the only owner of user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Create a new user with an already hashed password. `None` means the
    /// email is already taken.
    async fn create(&self, user: NewUser) -> anyhow::Result<Option<User>>;

    /// Delete a user by email; returns whether a row was removed.
    async fn delete_by_email(&self, email: &str) -> anyhow::Result<bool>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, first_name, last_name, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn delete_by_email(&self, email: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
