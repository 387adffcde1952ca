//! The signed-in user's credentials, passed explicitly to whatever needs them.

use secrecy::SecretString;
use std::fmt;
use std::sync::Arc;

use crate::api::{AuthData, User};

/// Token and user for the current session.
///
/// `epoch` changes every time credentials change. Background work captures
/// the epoch it started under and its result is dropped if the epoch has
/// moved on by the time it completes.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<Arc<SecretString>>,
    user: Option<User>,
    epoch: u64,
}

impl Session {
    /// Session seeded with a token whose user has not been loaded yet.
    pub fn with_token(token: SecretString) -> Self {
        Self {
            token: Some(Arc::new(token)),
            user: None,
            epoch: 0,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_deref()
    }

    /// Shared token handle for moving into a background task.
    pub fn credentials(&self) -> Option<Arc<SecretString>> {
        self.token.clone()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn has_preferences(&self) -> bool {
        self.user.as_ref().is_some_and(User::has_preferences)
    }

    /// Install credentials from a login or registration response.
    pub fn sign_in(&mut self, auth: AuthData) {
        self.token = Some(Arc::new(auth.token));
        self.user = Some(auth.user);
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Replace the user record, keeping the token. Does not change the epoch.
    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Forget token and user. In-flight results from before this call are
    /// now stale.
    pub fn invalidate(&mut self) {
        self.token = None;
        self.user = None;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Whether work started under `epoch` still belongs to this session.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user.as_ref().map(|u| u.id))
            .field("epoch", &self.epoch)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn auth(token: &str, with_prefs: bool) -> AuthData {
        let prefs = if with_prefs {
            r#""preferences": {"authors": [{"id": 1, "name": "Ada"}], "categories": []},"#
        } else {
            ""
        };
        let json = format!(
            r#"{{"user": {{"id": 9, "name": "N", "email": "n@example.com", {prefs} "is_admin": 0}},
                "token": "{token}", "token_type": "Bearer"}}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_sign_in_and_invalidate_bump_epoch() {
        let mut s = Session::default();
        assert!(!s.is_authenticated());
        let start = s.epoch();

        s.sign_in(auth("abc", false));
        assert!(s.is_authenticated());
        assert_eq!(s.token().map(|t| t.expose_secret().to_string()), Some("abc".into()));
        assert!(!s.is_current(start));

        let signed_in = s.epoch();
        s.invalidate();
        assert!(!s.is_authenticated());
        assert!(s.user().is_none());
        assert!(!s.is_current(signed_in));
    }

    #[test]
    fn test_has_preferences_follows_user() {
        let mut s = Session::default();
        assert!(!s.has_preferences());
        s.sign_in(auth("t", true));
        assert!(s.has_preferences());
    }

    #[test]
    fn test_debug_masks_token() {
        let s = Session::with_token(SecretString::from("hunter2".to_string()));
        let debug = format!("{:?}", s);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
