//! Persisted authentication state.
//!
//! The session is logged in only when the flag is set *and* the stored
//! profile decodes. Anything else is cleared on read, so corrupted state
//! always degrades to "logged out".

use std::sync::Arc;

use shared::models::Customer;
use tracing::{error, info, warn};

use crate::{
    error::PreferenceError,
    preferences::{MemoryPreferences, PreferenceEdit, PreferenceStore},
};

/// Boolean login flag.
pub const KEY_IS_LOGGED_IN: &str = "is_logged_in";
/// Customer profile as a JSON string.
pub const KEY_USER_DATA: &str = "user_data";
/// Bearer token issued at login.
pub const KEY_AUTH_TOKEN: &str = "auth_token";

/// Single source of truth for who is signed in.
#[derive(Debug, Clone)]
pub struct SessionStore {
    prefs: Arc<dyn PreferenceStore>,
}

impl SessionStore {
    /// Session kept in `prefs`.
    #[must_use]
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { prefs }
    }

    /// Session backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPreferences::new()))
    }

    /// True when a readable profile is stored; see [`SessionStore::current_user`].
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// The stored profile, if the session is logged in and the profile decodes.
    ///
    /// A set flag with a missing or undecodable profile clears every session key.
    #[must_use]
    pub fn current_user(&self) -> Option<Customer> {
        if self.prefs.get_bool(KEY_IS_LOGGED_IN) != Some(true) {
            return None;
        }

        let Some(raw) = self.prefs.get_string(KEY_USER_DATA) else {
            warn!("logged-in flag set without a stored profile, clearing session");
            self.self_heal();
            return None;
        };

        match serde_json::from_str::<Customer>(&raw) {
            Ok(customer) => Some(customer),
            Err(err) => {
                warn!(error = %err, "stored profile is corrupt, clearing session");
                self.self_heal();
                None
            }
        }
    }

    /// Mark the session logged in with `profile`, dropping any previous token.
    ///
    /// # Errors
    /// Returns [`PreferenceError`] if the store cannot be written.
    pub fn persist(&self, profile: &Customer) -> Result<(), PreferenceError> {
        self.persist_with_token(profile, None)
    }

    /// Store the profile and optional bearer token in one commit.
    ///
    /// # Errors
    /// Returns [`PreferenceError`] if the store cannot be written.
    pub fn persist_with_token(
        &self,
        profile: &Customer,
        token: Option<&str>,
    ) -> Result<(), PreferenceError> {
        let user_data = serde_json::to_string(profile)?;
        let edit = PreferenceEdit::new()
            .put_bool(KEY_IS_LOGGED_IN, true)
            .put_string(KEY_USER_DATA, user_data);
        let edit = match token.filter(|token| !token.is_empty()) {
            Some(token) => edit.put_string(KEY_AUTH_TOKEN, token),
            None => edit.remove(KEY_AUTH_TOKEN),
        };

        self.prefs.commit(edit)?;
        info!(customer_id = profile.id, "session persisted");
        Ok(())
    }

    /// Replace the stored bearer token.
    ///
    /// # Errors
    /// Returns [`PreferenceError`] if the store cannot be written.
    pub fn persist_token(&self, token: &str) -> Result<(), PreferenceError> {
        self.prefs.put_string(KEY_AUTH_TOKEN, token)
    }

    /// Bearer token issued at login.
    ///
    /// `None` unless the session is authenticated, so a token left behind by
    /// a corrupt session is never handed out.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        self.prefs
            .get_string(KEY_AUTH_TOKEN)
            .filter(|token| !token.is_empty())
    }

    /// Remove all session state. Safe to call repeatedly.
    ///
    /// # Errors
    /// Returns [`PreferenceError`] if the store cannot be written.
    pub fn clear(&self) -> Result<(), PreferenceError> {
        self.prefs.commit(
            PreferenceEdit::new()
                .remove(KEY_IS_LOGGED_IN)
                .remove(KEY_USER_DATA)
                .remove(KEY_AUTH_TOKEN),
        )?;
        info!("session cleared");
        Ok(())
    }

    /// Identifier of the signed-in customer.
    #[must_use]
    pub fn current_user_id(&self) -> Option<i64> {
        self.current_user().map(|user| user.id)
    }

    /// Display name of the signed-in user, or `User`.
    #[must_use]
    pub fn current_user_name(&self) -> String {
        self.current_user()
            .map_or_else(|| "User".to_string(), |user| user.display_name())
    }

    /// Email of the signed-in customer, or empty.
    #[must_use]
    pub fn current_user_email(&self) -> String {
        self.current_user().map(|user| user.email).unwrap_or_default()
    }

    fn self_heal(&self) {
        if let Err(err) = self.clear() {
            error!(error = %err, "failed to clear corrupt session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn demo_customer() -> Customer {
        serde_json::from_value(json!({
            "id": 14,
            "firstName": "Demo",
            "lastName": "User",
            "email": "demo@example.com",
            "membershipTier": "gold",
            "loyaltyPoints": 1250,
            "accountBalance": "25.50"
        }))
        .unwrap()
    }

    fn store_with(prefs: &Arc<MemoryPreferences>) -> SessionStore {
        SessionStore::new(prefs.clone())
    }

    #[test]
    fn test_fresh_session_is_logged_out() {
        let session = SessionStore::in_memory();
        assert!(!session.is_authenticated());
        assert_eq!(session.current_user(), None);
        assert_eq!(session.current_user_name(), "User");
        assert_eq!(session.current_user_email(), "");
        assert_eq!(session.auth_token(), None);
    }

    #[test]
    fn test_persist_then_read_back() {
        let session = SessionStore::in_memory();
        let customer = demo_customer();
        session.persist(&customer).unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.current_user(), Some(customer));
        assert_eq!(session.current_user_id(), Some(14));
        assert_eq!(session.current_user_name(), "Demo User");
        assert_eq!(session.current_user_email(), "demo@example.com");
    }

    #[test]
    fn test_persist_with_token_and_relogin_drops_token() {
        let session = SessionStore::in_memory();
        session
            .persist_with_token(&demo_customer(), Some("tok-1"))
            .unwrap();
        assert_eq!(session.auth_token().as_deref(), Some("tok-1"));

        session.persist(&demo_customer()).unwrap();
        assert_eq!(session.auth_token(), None);

        session.persist_token("tok-2").unwrap();
        assert_eq!(session.auth_token().as_deref(), Some("tok-2"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let prefs = Arc::new(MemoryPreferences::new());
        let session = store_with(&prefs);
        session
            .persist_with_token(&demo_customer(), Some("tok"))
            .unwrap();

        for _ in 0..3 {
            session.clear().unwrap();
            assert!(!session.is_authenticated());
            assert!(prefs.is_empty());
        }
    }

    #[test]
    fn test_corrupt_profile_self_heals() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs.insert_raw(KEY_IS_LOGGED_IN, json!(true));
        prefs.insert_raw(KEY_USER_DATA, json!("{not valid json"));
        prefs.insert_raw(KEY_AUTH_TOKEN, json!("tok"));
        let session = store_with(&prefs);

        assert!(!session.is_authenticated());
        assert!(prefs.is_empty());
        assert!(!session.is_authenticated());
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_token_is_withheld_without_a_valid_profile() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs.insert_raw(KEY_AUTH_TOKEN, json!("tok-orphan"));
        let session = store_with(&prefs);
        assert_eq!(session.auth_token(), None);

        prefs.insert_raw(KEY_IS_LOGGED_IN, json!(true));
        prefs.insert_raw(KEY_USER_DATA, json!("{corrupt"));
        assert_eq!(session.auth_token(), None);
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_profile_with_wrong_shape_self_heals() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs.insert_raw(KEY_IS_LOGGED_IN, json!(true));
        prefs.insert_raw(KEY_USER_DATA, json!(r#"{"firstName":"No id"}"#));
        let session = store_with(&prefs);

        assert_eq!(session.current_user(), None);
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_flag_without_profile_self_heals() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs.insert_raw(KEY_IS_LOGGED_IN, json!(true));
        let session = store_with(&prefs);

        assert!(!session.is_authenticated());
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_profile_without_flag_is_logged_out() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs.insert_raw(KEY_USER_DATA, json!(r#"{"id":1}"#));
        let session = store_with(&prefs);

        assert!(!session.is_authenticated());
        assert_eq!(prefs.len(), 1);
    }
}
