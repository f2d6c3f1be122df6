//! Identity providers.
//!
//! The core only consumes the resulting user id; how users are stored and
//! verified is up to the provider.

use crate::env::storage::{CURRENT_USER_KEY, USERS_KEY};
use crate::storage::store::{KeyValueStore, load_json, save_json};
use crate::storage::types::{IdentityError, UserIdentity};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError>;

    async fn register(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError>;

    async fn logout(&self) -> Result<(), IdentityError>;

    async fn current_user(&self) -> Result<Option<UserIdentity>, IdentityError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    id: String,
    email: String,
    password_hash: String,
}

impl StoredUser {
    fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id.clone(),
            email: self.email.clone(),
        }
    }
}

/// Users kept in the key-value store, with SHA-256 password digests salted
/// by user id.
pub struct LocalIdentityProvider {
    store: Arc<dyn KeyValueStore>,
}

impl LocalIdentityProvider {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn users(&self) -> Result<Vec<StoredUser>, IdentityError> {
        Ok(load_json(&*self.store, USERS_KEY)?.unwrap_or_default())
    }

    fn sign_in(&self, user: &StoredUser) -> Result<UserIdentity, IdentityError> {
        let identity = user.identity();
        save_json(&*self.store, CURRENT_USER_KEY, &identity)?;
        Ok(identity)
    }
}

fn password_hash(user_id: &str, password: &str) -> String {
    let digest = Sha256::digest(format!("{}:{}", user_id, password).as_bytes());
    format!("{:x}", digest)
}

fn validate_input(email: &str, password: &str) -> Result<(), IdentityError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(IdentityError::InvalidInput("A valid email address is required."));
    }
    if password.is_empty() {
        return Err(IdentityError::InvalidInput("Password is required."));
    }
    Ok(())
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn login(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError> {
        let users = self.users()?;
        let user = users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .filter(|u| u.password_hash == password_hash(&u.id, password))
            .ok_or(IdentityError::InvalidCredentials)?;

        info!("User {} signed in", user.id);
        self.sign_in(user)
    }

    async fn register(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError> {
        validate_input(email, password)?;
        let email = email.trim();

        let mut users = self.users()?;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(IdentityError::EmailTaken);
        }

        let mut stamp = chrono::Utc::now().timestamp_millis();
        while users.iter().any(|u| u.id == format!("user-{}", stamp)) {
            stamp += 1;
        }
        let id = format!("user-{}", stamp);
        let user = StoredUser {
            password_hash: password_hash(&id, password),
            email: email.to_string(),
            id,
        };

        users.push(user.clone());
        save_json(&*self.store, USERS_KEY, &users)?;
        info!("Registered user {}", user.id);
        self.sign_in(&user)
    }

    async fn logout(&self) -> Result<(), IdentityError> {
        self.store.remove(CURRENT_USER_KEY)?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<UserIdentity>, IdentityError> {
        Ok(load_json(&*self.store, CURRENT_USER_KEY)?)
    }
}
