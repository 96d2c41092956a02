use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{InputFilter, InputPatch, InputRecord, NewInput};

#[async_trait]
pub trait InputStore: Send + Sync {
    async fn find(&self, filter: &InputFilter) -> anyhow::Result<Vec<InputRecord>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<InputRecord>>;

    async fn create(&self, input: NewInput) -> anyhow::Result<InputRecord>;

    /// Returns `false` when no record has this id.
    async fn update(&self, id: Uuid, patch: InputPatch) -> anyhow::Result<bool>;

    /// Returns `false` when no record has this id.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

pub struct PgInputStore {
    db: PgPool,
}

impl PgInputStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InputStore for PgInputStore {
    async fn find(&self, filter: &InputFilter) -> anyhow::Result<Vec<InputRecord>> {
        let rows = sqlx::query_as::<_, InputRecord>(
            r#"
            SELECT id, age, income, savings, contribution, retirement_age, expenses, username
            FROM inputs
            WHERE ($1::TEXT IS NULL OR username = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(filter.username.as_deref())
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<InputRecord>> {
        let row = sqlx::query_as::<_, InputRecord>(
            r#"
            SELECT id, age, income, savings, contribution, retirement_age, expenses, username
            FROM inputs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn create(&self, input: NewInput) -> anyhow::Result<InputRecord> {
        let row = sqlx::query_as::<_, InputRecord>(
            r#"
            INSERT INTO inputs (id, age, income, savings, contribution, retirement_age, expenses, username)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, age, income, savings, contribution, retirement_age, expenses, username
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.age)
        .bind(input.income)
        .bind(input.savings)
        .bind(input.contribution)
        .bind(input.retirement_age)
        .bind(input.expenses)
        .bind(&input.username)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: InputPatch) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE inputs
               SET age            = COALESCE($2, age),
                   income         = COALESCE($3, income),
                   savings        = COALESCE($4, savings),
                   contribution   = COALESCE($5, contribution),
                   retirement_age = COALESCE($6, retirement_age),
                   expenses       = COALESCE($7, expenses)
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.age)
        .bind(patch.income)
        .bind(patch.savings)
        .bind(patch.contribution)
        .bind(patch.retirement_age)
        .bind(patch.expenses)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM inputs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
