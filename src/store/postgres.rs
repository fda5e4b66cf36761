use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{MealStore, StoreError, StoreResult, UserStore};
use crate::config::AppConfig;
use crate::meals::repo_types::{Meal, MealFields};
use crate::users::repo_types::{NewUser, User};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

/// Name of the unique constraint a write tripped over, if that is what failed.
fn unique_violation(e: &sqlx::Error) -> Option<String> {
    let db = e.as_database_error()?;
    if db.code().is_some_and(|code| code == UNIQUE_VIOLATION) {
        Some(db.constraint().unwrap_or_default().to_string())
    } else {
        None
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, session_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, session_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(constraint) if constraint.contains("session") => {
                StoreError::already_exists("Session", user.session_id.clone())
            }
            Some(_) => StoreError::already_exists("User", user.email.clone()),
            None => StoreError::Database(e),
        })
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, session_id, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, session_id, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_session(&self, session_id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, session_id, created_at
            FROM users
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl MealStore for PgStore {
    async fn list_meals(&self, owner: Uuid) -> StoreResult<Vec<Meal>> {
        let rows = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, name, description, meal_datetime, in_diet, created_at
            FROM meals
            WHERE user_id = $1
            ORDER BY meal_datetime DESC, created_at DESC, id DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_meal(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Meal>> {
        let meal = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, name, description, meal_datetime, in_diet, created_at
            FROM meals
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(meal)
    }

    async fn create_meal(&self, owner: Uuid, fields: MealFields) -> StoreResult<Meal> {
        let meal = sqlx::query_as::<_, Meal>(
            r#"
            INSERT INTO meals (id, user_id, name, description, meal_datetime, in_diet)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, description, meal_datetime, in_diet, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.meal_datetime)
        .bind(fields.in_diet)
        .fetch_one(&self.pool)
        .await?;
        Ok(meal)
    }

    async fn meal_exists(&self, id: Uuid) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM meals WHERE id = $1)"#)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn update_meal(&self, owner: Uuid, id: Uuid, fields: MealFields) -> StoreResult<u64> {
        let done = sqlx::query(
            r#"
            UPDATE meals
               SET name = $3, description = $4, meal_datetime = $5, in_diet = $6
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.meal_datetime)
        .bind(fields.in_diet)
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected())
    }

    async fn delete_meal(&self, owner: Uuid, id: Uuid) -> StoreResult<u64> {
        let done = sqlx::query(r#"DELETE FROM meals WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}
