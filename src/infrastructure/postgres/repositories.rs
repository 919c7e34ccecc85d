use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::{
    domain::user::{CreateUserCommand, UpdateUserCommand, User, UserId, UserRepository},
    shared::errors::DomainError,
};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, cmd: CreateUserCommand) -> Result<User, DomainError> {
        let CreateUserCommand {
            clerk_id,
            email,
            username,
            first_name,
            last_name,
            photo,
        } = cmd;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (clerk_id, email, username, first_name, last_name, photo)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, clerk_id, email, username, first_name, last_name, photo,
                      created_time, updated_time
            "#,
        )
        .bind(&clerk_id)
        .bind(&email)
        .bind(&username)
        .bind(&first_name)
        .bind(&last_name)
        .bind(&photo)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Unexpected(e.to_string()))?;

        Ok(row.into())
    }

    async fn update_by_clerk_id(
        &self,
        clerk_id: &str,
        cmd: UpdateUserCommand,
    ) -> Result<User, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET username = $2,
                first_name = $3,
                last_name = $4,
                photo = $5,
                updated_time = now()
            WHERE clerk_id = $1
            RETURNING id, clerk_id, email, username, first_name, last_name, photo,
                      created_time, updated_time
            "#,
        )
        .bind(clerk_id)
        .bind(&cmd.username)
        .bind(&cmd.first_name)
        .bind(&cmd.last_name)
        .bind(&cmd.photo)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Unexpected(e.to_string()))?;

        row.map(User::from).ok_or(DomainError::UserNotFound)
    }

    async fn delete_by_clerk_id(&self, clerk_id: &str) -> Result<User, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            DELETE FROM users
            WHERE clerk_id = $1
            RETURNING id, clerk_id, email, username, first_name, last_name, photo,
                      created_time, updated_time
            "#,
        )
        .bind(clerk_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Unexpected(e.to_string()))?;

        row.map(User::from).ok_or(DomainError::UserNotFound)
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    clerk_id: String,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    photo: String,
    created_time: DateTime<Utc>,
    updated_time: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            clerk_id: row.clerk_id,
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            photo: row.photo,
            created_at: row.created_time,
            updated_at: row.updated_time,
        }
    }
}
