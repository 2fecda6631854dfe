//! SQLite implementation of the UserRepository trait.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

use pb_core::domain::entities::user::{NewUser, Role, User, UserCredentials};
use pb_core::errors::{ConflictError, DomainError};
use pb_core::repositories::UserRepository;
use pb_shared::utils::timestamp::format_db_timestamp;

use super::{get_column, get_timestamp, query_error};

const SELECT_COLUMNS: &str = "SELECT id, username, firstName, lastName, role, hashedPassword, \
     createdAt, updatedAt FROM users";

/// SQLite implementation of UserRepository
#[derive(Clone)]
pub struct SqliteUserRepository {
    /// Database connection pool
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new SQLite user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &SqliteRow) -> Result<User, DomainError> {
        let role: String = get_column(row, "role")?;

        Ok(User {
            id: get_column(row, "id")?,
            username: get_column(row, "username")?,
            first_name: get_column(row, "firstName")?,
            last_name: get_column(row, "lastName")?,
            role: role.parse::<Role>().map_err(DomainError::internal)?,
            created_at: get_timestamp(row, "createdAt")?,
            updated_at: get_timestamp(row, "updatedAt")?,
        })
    }

    fn row_to_credentials(row: &SqliteRow) -> Result<UserCredentials, DomainError> {
        Ok(UserCredentials {
            user: Self::row_to_user(row)?,
            hashed_password: get_column(row, "hashedPassword")?,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find user by id", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let query = format!("{} WHERE username = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find user by username", e))?;

        row.as_ref().map(Self::row_to_credentials).transpose()
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, DomainError> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                .bind(username)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| query_error("check username", e))?;

        Ok(exists == 1)
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let created_at = format_db_timestamp(user.created_at);

        let query = r#"
            INSERT INTO users (username, firstName, lastName, role, hashedPassword, createdAt, updatedAt)
            VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.as_str())
            .bind(&user.hashed_password)
            .bind(&created_at)
            .bind(&created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration of the same name
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    DomainError::Conflict(ConflictError::UsernameTaken)
                }
                e => query_error("create user", e),
            })?;

        let id = result.last_insert_rowid();
        tracing::debug!(user_id = id, "User row inserted");

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::internal("Inserted user is missing"))
    }
}
