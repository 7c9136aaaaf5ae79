//! User storage and management.

use anyhow::Result;
use tracing::debug;

use crate::auth::directory::{StoreFuture, UserDirectory};
use crate::db::Db;
use crate::db::schema::UserRecord;
use crate::types::{UserId, Username};

/// User store for database operations.
#[derive(Clone)]
pub struct UserStore {
    db: Db,
}

impl UserStore {
    /// Create a new user store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a new account from an already-hashed password.
    ///
    /// Fails if the username is taken (unique index on `user.username`).
    pub async fn create_user(&self, username: &Username, password_hash: &str) -> Result<UserRecord> {
        let user = UserRecord {
            user_id: UserId::generate(),
            username: username.clone(),
            password_hash: password_hash.to_string(),
        };

        let query = r#"
            CREATE user CONTENT {
                user_id: $user_id,
                username: $username,
                password_hash: $password_hash
            } RETURN NONE
        "#;

        self.db
            .query(query)
            .bind(("user_id", user.user_id.clone().into_inner()))
            .bind(("username", user.username.clone().into_inner()))
            .bind(("password_hash", user.password_hash.clone()))
            .await?
            .check()?;

        debug!("Created user {} ({})", user.user_id, user.username);
        Ok(user)
    }

    /// Get a user by principal.
    pub async fn get_user_by_id(&self, user_id: &UserId) -> Result<Option<UserRecord>> {
        let query = r#"
            SELECT user_id, username, password_hash FROM user
            WHERE user_id = $user_id
            LIMIT 1
        "#;

        let mut res = self.db
            .query(query)
            .bind(("user_id", user_id.as_str().to_string()))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Get a user by login name. Matching is case-sensitive.
    pub async fn get_user_by_username(&self, username: &Username) -> Result<Option<UserRecord>> {
        let query = r#"
            SELECT user_id, username, password_hash FROM user
            WHERE username = $username
            LIMIT 1
        "#;

        let mut res = self.db
            .query(query)
            .bind(("username", username.as_str().to_string()))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }
}

impl UserDirectory for UserStore {
    fn find_user_by_id<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, Option<UserRecord>> {
        Box::pin(self.get_user_by_id(user_id))
    }

    fn find_user_by_username<'a>(
        &'a self,
        username: &'a Username,
    ) -> StoreFuture<'a, Option<UserRecord>> {
        Box::pin(self.get_user_by_username(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_connection, ensure_schema, DatabaseConfig};

    async fn setup_test_db() -> Db {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = setup_test_db().await;
        let store = UserStore::new(db);

        let created = store
            .create_user(&Username::new("alice"), "hash-a")
            .await
            .unwrap();

        let by_name = store
            .get_user_by_username(&Username::new("alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.user_id, created.user_id);
        assert_eq!(by_name.password_hash, "hash-a");

        let by_id = store.get_user_by_id(&created.user_id).await.unwrap().unwrap();
        assert_eq!(by_id.username, Username::new("alice"));
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let db = setup_test_db().await;
        let store = UserStore::new(db);

        assert!(store.get_user_by_id(&UserId::new("nobody")).await.unwrap().is_none());
        assert!(
            store
                .get_user_by_username(&Username::new("nobody"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_username_is_case_sensitive() {
        let db = setup_test_db().await;
        let store = UserStore::new(db);

        store.create_user(&Username::new("alice"), "h").await.unwrap();

        assert!(
            store
                .get_user_by_username(&Username::new("Alice"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = setup_test_db().await;
        let store = UserStore::new(db);

        store.create_user(&Username::new("alice"), "h1").await.unwrap();
        let second = store.create_user(&Username::new("alice"), "h2").await;

        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_user_directory_trait() {
        let db = setup_test_db().await;
        let store = UserStore::new(db);
        let created = store.create_user(&Username::new("bob"), "h").await.unwrap();

        let directory: &dyn UserDirectory = &store;
        let found = directory.find_user_by_id(&created.user_id).await.unwrap();
        assert!(found.is_some());
    }
}
