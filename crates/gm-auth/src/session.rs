//! Session management.

use crate::{AuthError, AuthToken, Audience, UserProfile};
use gm_cache::Cache;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Keys the storefront persists on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Guest cart records.
    pub cart: String,
    pub user_token: String,
    pub admin_token: String,
    /// Signed-in shopper profile.
    pub user: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            cart: "cart".to_string(),
            user_token: "user_token".to_string(),
            admin_token: "admin_token".to_string(),
            user: "user".to_string(),
        }
    }
}

impl StorageKeys {
    pub fn token_key(&self, audience: Audience) -> &str {
        match audience {
            Audience::Shopper => &self.user_token,
            Audience::Admin => &self.admin_token,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    user: Option<UserProfile>,
    user_token: Option<AuthToken>,
    admin_token: Option<AuthToken>,
}

/// Who is signed in, persisted in the client store.
///
/// Cloning shares the same state, so every service holding a clone sees a
/// sign-in or sign-out immediately. The shopper counts as signed in only
/// when both the profile and the token are present.
///
/// # Example
///
/// ```rust,ignore
/// let session = Session::init(cache, StorageKeys::default())?;
/// if !session.is_authenticated() {
///     session.sign_in(profile, token)?;
/// }
/// session.teardown()?;
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    cache: Cache,
    keys: Rc<StorageKeys>,
    state: Rc<RefCell<State>>,
}

impl Session {
    /// Restore the session persisted under `keys`.
    ///
    /// A stored profile that no longer parses is treated as signed out.
    pub fn init(cache: Cache, keys: StorageKeys) -> Result<Self, AuthError> {
        let user_token = cache
            .get_text(&keys.user_token)?
            .and_then(AuthToken::new);
        let admin_token = cache
            .get_text(&keys.admin_token)?
            .and_then(AuthToken::new);
        let user = match cache.get::<UserProfile>(&keys.user) {
            Ok(user) => user,
            Err(gm_cache::CacheError::SerializeError(e)) => {
                tracing::warn!(key = %keys.user, error = %e, "ignoring unreadable profile");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let session = Self {
            cache,
            keys: Rc::new(keys),
            state: Rc::new(RefCell::new(State {
                user,
                user_token,
                admin_token,
            })),
        };
        tracing::debug!(
            shopper = session.is_authenticated(),
            admin = session.is_admin(),
            "session restored"
        );
        Ok(session)
    }

    /// A signed-out session over an in-memory store.
    pub fn in_memory() -> Self {
        Self {
            cache: Cache::in_memory(),
            keys: Rc::new(StorageKeys::default()),
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// The store the session persists to, shared with the guest cart.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Persist a shopper sign-in.
    pub fn sign_in(&self, user: UserProfile, token: AuthToken) -> Result<(), AuthError> {
        self.cache.set(&self.keys.user, &user)?;
        self.cache.set_text(&self.keys.user_token, token.as_str())?;
        tracing::info!(user_id = %user.id, "shopper signed in");
        let mut state = self.state.borrow_mut();
        state.user = Some(user);
        state.user_token = Some(token);
        Ok(())
    }

    /// Persist an admin sign-in.
    pub fn sign_in_admin(&self, token: AuthToken) -> Result<(), AuthError> {
        self.cache.set_text(&self.keys.admin_token, token.as_str())?;
        tracing::info!("admin signed in");
        self.state.borrow_mut().admin_token = Some(token);
        Ok(())
    }

    /// Sign the shopper out: forget the token and the profile.
    ///
    /// In-memory state is cleared even if the store fails.
    pub fn teardown(&self) -> Result<(), AuthError> {
        {
            let mut state = self.state.borrow_mut();
            state.user = None;
            state.user_token = None;
        }
        self.cache.delete(&self.keys.user)?;
        self.cache.delete(&self.keys.user_token)?;
        tracing::info!("shopper signed out");
        Ok(())
    }

    /// Sign the admin out.
    pub fn sign_out_admin(&self) -> Result<(), AuthError> {
        self.state.borrow_mut().admin_token = None;
        self.cache.delete(&self.keys.admin_token)?;
        tracing::info!("admin signed out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        let state = self.state.borrow();
        state.user.is_some() && state.user_token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().admin_token.is_some()
    }

    pub fn user(&self) -> Option<UserProfile> {
        let state = self.state.borrow();
        state.user_token.as_ref().and(state.user.clone())
    }

    /// The current token for `audience`.
    pub fn token(&self, audience: Audience) -> Option<AuthToken> {
        let state = self.state.borrow();
        match audience {
            Audience::Shopper => state.user.as_ref().and(state.user_token.clone()),
            Audience::Admin => state.admin_token.clone(),
        }
    }
}
