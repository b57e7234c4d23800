//! Database repository for user management operations.
//!
//! Provides CRUD operations for user identity records. Lookups return
//! `None` rather than erroring when no row matches; uniqueness is enforced
//! by the database constraints on email and phone.

use crate::database::models::{CreateUser, User};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const USER_COLUMNS: &str =
    "id, email, phone, password_hash, full_name, is_active, is_verified, is_superuser, \
     created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database.
    ///
    /// New users start inactive and unverified; both flags flip together
    /// on successful registration OTP verification.
    pub async fn create_user(&self, user: CreateUser) -> Result<User> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users \
             (email, phone, password_hash, full_name, is_active, is_verified, is_superuser, \
              created_at, updated_at) \
             VALUES (?, ?, ?, ?, 0, 0, 0, ?, ?) \
             RETURNING *",
        )
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Retrieves a user by their unique identifier.
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their phone number.
    pub async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = ?"
        ))
        .bind(phone)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Checks if an email already exists in the system.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Checks if a phone number already exists in the system.
    pub async fn phone_exists(&self, phone: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE phone = ?")
            .bind(phone)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Marks the user verified and active, returning the updated record.
    ///
    /// This is the only transition out of the unverified registration state.
    pub async fn verify_user(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET is_verified = 1, is_active = 1, updated_at = ? \
             WHERE email = ? \
             RETURNING *",
        )
        .bind(Utc::now())
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Replaces the stored password hash for a user.
    pub async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<u64> {
        let rows_affected =
            sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(id)
                .execute(self.pool)
                .await?
                .rows_affected();

        Ok(rows_affected)
    }

    /// Deletes a user. Dependent OTPs and refresh tokens are removed by
    /// the cascade constraints. Not used by the auth workflows.
    pub async fn delete_user(&self, id: i64) -> Result<u64> {
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    async fn setup_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn new_user(email: &str, phone: Option<&str>) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            phone: phone.map(str::to_string),
            password_hash: "hash".to_string(),
            full_name: None,
        }
    }

    #[tokio::test]
    async fn test_lookups_by_id_email_and_phone() {
        let pool = setup_pool().await;
        let repo = UserRepository::new(&pool);

        let created = repo
            .create_user(new_user("a@x.com", Some("+2348012345678")))
            .await
            .unwrap();
        assert!(!created.is_active);
        assert!(!created.is_verified);

        assert!(repo.get_user_by_id(created.id).await.unwrap().is_some());
        assert!(repo.get_user_by_email("a@x.com").await.unwrap().is_some());
        assert!(
            repo.get_user_by_phone("+2348012345678")
                .await
                .unwrap()
                .is_some()
        );
        assert!(repo.get_user_by_email("b@x.com").await.unwrap().is_none());

        assert!(repo.email_exists("a@x.com").await.unwrap());
        assert!(!repo.email_exists("b@x.com").await.unwrap());
        assert!(repo.phone_exists("+2348012345678").await.unwrap());
        assert!(!repo.phone_exists("+2348000000000").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_hits_unique_constraint() {
        let pool = setup_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create_user(new_user("a@x.com", None)).await.unwrap();
        let err = repo
            .create_user(new_user("a@x.com", None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("UNIQUE constraint failed"));
    }

    #[tokio::test]
    async fn test_verify_user_flips_both_flags() {
        let pool = setup_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create_user(new_user("a@x.com", None)).await.unwrap();
        let verified = repo.verify_user("a@x.com").await.unwrap().unwrap();
        assert!(verified.is_verified);
        assert!(verified.is_active);

        assert!(repo.verify_user("missing@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let pool = setup_pool().await;
        let repo = UserRepository::new(&pool);

        let user = repo.create_user(new_user("a@x.com", None)).await.unwrap();
        let rows = repo.update_password_hash(user.id, "new-hash").await.unwrap();
        assert_eq!(rows, 1);

        let reloaded = repo.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new-hash");
    }
}
