//! Accounts and bearer sessions
//!
//! Passwords are hashed with Argon2id; sessions are opaque random tokens
//! with an expiry, looked up on every authenticated request.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Duration;
use rusqlite::{params, OptionalExtension, Row};

use super::types::from_millis;
use super::{
    is_constraint_violation, now_millis, parse_column, Id, NewUser, Role, Store, StoreError,
    StoreResult, User,
};

const USER_COLUMNS: &str = "id, name, email, role, created_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: parse_column(row, 3)?,
        created_at: from_millis(row.get(4)?),
    })
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Hashing(e.to_string()))
}

/// Verify a password against an Argon2id hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Run an Argon2 computation on the blocking pool, away from the store lock
async fn run_hasher<T, F>(work: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| StoreError::Hashing(format!("hashing task failed: {}", e)))
}

impl Store {
    /// Register a new account. Emails are unique, case-insensitively.
    pub async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let password = new.password.clone();
        let hash = run_hasher(move || hash_password(&password)).await??;
        let email = new.email.trim().to_lowercase();
        let now = now_millis();

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO users (name, email, password_hash, role, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![new.name.trim(), email, hash, new.role.as_str(), now],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Conflict(format!("Email '{}' is already registered", email))
            } else {
                StoreError::Database(e)
            }
        })?;

        let id = conn.last_insert_rowid();
        tracing::info!(user_id = id, role = %new.role, "User registered");

        Ok(User {
            id,
            name: new.name.trim().to_string(),
            email,
            role: new.role,
            created_at: from_millis(now),
        })
    }

    /// Look up an account by id
    pub async fn get_user(&self, id: Id) -> StoreResult<User> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
            params![id],
            row_to_user,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found("User", id))
    }

    /// Check an email/password pair; `None` when either is wrong
    pub async fn verify_credentials(&self, email: &str, password: &str) -> StoreResult<Option<User>> {
        let found = {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!(
                    "SELECT {}, password_hash FROM users WHERE email = ?",
                    USER_COLUMNS
                ),
                params![email.trim().to_lowercase()],
                |row| Ok((row_to_user(row)?, row.get::<_, String>(5)?)),
            )
            .optional()?
        };

        let Some((user, hash)) = found else {
            return Ok(None);
        };
        let password = password.to_string();
        let valid = run_hasher(move || verify_password(&password, &hash)).await?;
        Ok(valid.then_some(user))
    }

    /// All accounts, oldest first
    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_user)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Promote or demote an account
    pub async fn set_role(&self, id: Id, role: Role) -> StoreResult<User> {
        {
            let conn = self.conn.lock().await;
            let changed = conn.execute(
                "UPDATE users SET role = ? WHERE id = ?",
                params![role.as_str(), id],
            )?;
            if changed == 0 {
                return Err(StoreError::not_found("User", id));
            }
        }

        tracing::info!(user_id = id, role = %role, "User role changed");
        self.get_user(id).await
    }

    /// Create the admin account unless an account with that email exists
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str) -> StoreResult<User> {
        let existing = {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                params![email.trim().to_lowercase()],
                row_to_user,
            )
            .optional()?
        };

        match existing {
            Some(user) if user.is_admin() => Ok(user),
            Some(user) => self.set_role(user.id, Role::Admin).await,
            None => {
                self.create_user(NewUser {
                    name: name.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                    role: Role::Admin,
                })
                .await
            }
        }
    }

    /// Issue a bearer token valid for `ttl`. Sessions that have already
    /// expired are dropped on the way.
    pub async fn create_session(&self, user_id: Id, ttl: Duration) -> StoreResult<String> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let now = now_millis();

        let conn = self.conn.lock().await;
        let purged = conn.execute("DELETE FROM sessions WHERE expires_at <= ?", params![now])?;
        if purged > 0 {
            tracing::debug!(purged, "Expired sessions purged");
        }
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
            params![token, user_id, now, now + ttl.num_milliseconds()],
        )?;

        Ok(token)
    }

    /// Resolve a bearer token to its account; expired tokens are purged
    pub async fn user_for_token(&self, token: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().await;
        let found = conn
            .query_row(
                "SELECT u.id, u.name, u.email, u.role, u.created_at, s.expires_at
                 FROM sessions s JOIN users u ON u.id = s.user_id
                 WHERE s.token = ?",
                params![token],
                |row| Ok((row_to_user(row)?, row.get::<_, i64>(5)?)),
            )
            .optional()?;

        match found {
            Some((user, expires_at)) if expires_at > now_millis() => Ok(Some(user)),
            Some(_) => {
                conn.execute("DELETE FROM sessions WHERE token = ?", params![token])?;
                tracing::debug!("Expired session purged");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Revoke a bearer token
    pub async fn delete_session(&self, token: &str) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM sessions WHERE token = ?", params![token])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Lucia".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret-pass", "not a hash"));
    }

    #[tokio::test]
    async fn test_create_and_verify() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user(new_user("Lucia@Example.org")).await.unwrap();
        assert_eq!(user.email, "lucia@example.org");

        let ok = store
            .verify_credentials("LUCIA@example.org", "correct horse")
            .await
            .unwrap();
        assert_eq!(ok.map(|u| u.id), Some(user.id));

        let bad = store
            .verify_credentials("lucia@example.org", "wrong")
            .await
            .unwrap();
        assert!(bad.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = Store::open_in_memory().unwrap();
        store.create_user(new_user("a@example.org")).await.unwrap();
        let err = store.create_user(new_user("A@example.org")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_sessions() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user(new_user("s@example.org")).await.unwrap();

        let token = store.create_session(user.id, Duration::hours(1)).await.unwrap();
        let found = store.user_for_token(&token).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        store.delete_session(&token).await.unwrap();
        assert!(store.user_for_token(&token).await.unwrap().is_none());

        let expired = store
            .create_session(user.id, Duration::milliseconds(-1))
            .await
            .unwrap();
        assert!(store.user_for_token(&expired).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_session_purges_expired_ones() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user(new_user("p@example.org")).await.unwrap();

        for _ in 0..3 {
            store
                .create_session(user.id, Duration::milliseconds(-1))
                .await
                .unwrap();
        }
        store.create_session(user.id, Duration::hours(1)).await.unwrap();

        let conn = store.conn.lock().await;
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_login_does_not_hold_the_store_lock_while_hashing() {
        let store = std::sync::Arc::new(Store::open_in_memory().unwrap());
        store.create_user(new_user("h@example.org")).await.unwrap();

        let login_store = std::sync::Arc::clone(&store);
        let login = tokio::spawn(async move {
            login_store
                .verify_credentials("h@example.org", "correct horse")
                .await
                .unwrap();
            std::time::Instant::now()
        });

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let login_running = !login.is_finished();
        assert!(store.ping().await);
        let ping_done = std::time::Instant::now();
        let login_done = login.await.unwrap();

        // a ping issued mid-login answers before the hash is checked
        if login_running {
            assert!(ping_done < login_done);
        }
    }

    #[tokio::test]
    async fn test_ensure_admin_promotes_existing() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user(new_user("boss@example.org")).await.unwrap();

        let admin = store
            .ensure_admin("Boss", "boss@example.org", "ignored")
            .await
            .unwrap();
        assert_eq!(admin.id, user.id);
        assert!(admin.is_admin());

        let again = store
            .ensure_admin("Boss", "boss@example.org", "ignored")
            .await
            .unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }
}
