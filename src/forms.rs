//! Local state and validation for the sign-in, registration and preference
//! forms. Validation is synchronous and never touches the network.

use secrecy::SecretString;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::api::{PreferenceIds, User};

/// At least this many authors and this many categories must be picked.
pub const MIN_PREFERENCE_SELECTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all fields")]
    MissingField(&'static str),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("You must accept the terms of service")]
    TermsNotAccepted,
    #[error("Please select at least {required} news sources ({selected} selected)")]
    TooFewAuthors { required: usize, selected: usize },
    #[error("Please select at least {required} categories ({selected} selected)")]
    TooFewCategories { required: usize, selected: usize },
}

// ============================================================================
// Sign-in / registration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Name,
    Email,
    Password,
    Confirmation,
    AcceptTerms,
}

impl AuthField {
    pub fn label(self) -> &'static str {
        match self {
            AuthField::Name => "Name",
            AuthField::Email => "Email",
            AuthField::Password => "Password",
            AuthField::Confirmation => "Confirm password",
            AuthField::AcceptTerms => "Accept terms of service",
        }
    }

    /// Rendered as bullets instead of characters.
    pub fn is_masked(self) -> bool {
        matches!(self, AuthField::Password | AuthField::Confirmation)
    }
}

const LOGIN_FIELDS: &[AuthField] = &[AuthField::Email, AuthField::Password];
const REGISTER_FIELDS: &[AuthField] = &[
    AuthField::Name,
    AuthField::Email,
    AuthField::Password,
    AuthField::Confirmation,
    AuthField::AcceptTerms,
];

/// Validated form contents, ready to send.
pub enum Credentials {
    Login {
        email: String,
        password: SecretString,
    },
    Register {
        name: String,
        email: String,
        password: SecretString,
        confirmation: SecretString,
    },
}

#[derive(Debug, Clone)]
pub struct AuthForm {
    mode: AuthMode,
    name: String,
    email: String,
    password: String,
    confirmation: String,
    accept_terms: bool,
    focus: usize,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            confirmation: String::new(),
            accept_terms: false,
            focus: 0,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => LOGIN_FIELDS,
            AuthMode::Register => REGISTER_FIELDS,
        }
    }

    pub fn focused(&self) -> AuthField {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn value(&self, field: AuthField) -> &str {
        match field {
            AuthField::Name => &self.name,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
            AuthField::Confirmation => &self.confirmation,
            AuthField::AcceptTerms => "",
        }
    }

    pub fn terms_accepted(&self) -> bool {
        self.accept_terms
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focused() {
            AuthField::Name => Some(&mut self.name),
            AuthField::Email => Some(&mut self.email),
            AuthField::Password => Some(&mut self.password),
            AuthField::Confirmation => Some(&mut self.confirmation),
            AuthField::AcceptTerms => None,
        }
    }

    /// Type into the focused field. On the terms checkbox, space toggles it.
    pub fn insert_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        match self.focused_text() {
            Some(text) => text.push(c),
            None if c == ' ' => self.accept_terms = !self.accept_terms,
            None => {}
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    /// Clear password fields, e.g. after a failed attempt.
    pub fn clear_secrets(&mut self) {
        self.password.clear();
        self.confirmation.clear();
    }

    pub fn validate(&self) -> Result<Credentials, FormError> {
        for &field in self.fields() {
            if field != AuthField::AcceptTerms && self.value(field).trim().is_empty() {
                return Err(FormError::MissingField(field.label()));
            }
        }

        match self.mode {
            AuthMode::Login => Ok(Credentials::Login {
                email: self.email.trim().to_string(),
                password: SecretString::from(self.password.clone()),
            }),
            AuthMode::Register => {
                if self.password != self.confirmation {
                    return Err(FormError::PasswordMismatch);
                }
                if !self.accept_terms {
                    return Err(FormError::TermsNotAccepted);
                }
                Ok(Credentials::Register {
                    name: self.name.trim().to_string(),
                    email: self.email.trim().to_string(),
                    password: SecretString::from(self.password.clone()),
                    confirmation: SecretString::from(self.confirmation.clone()),
                })
            }
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// Author and category picks on the preferences screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceSelection {
    authors: BTreeSet<i64>,
    categories: BTreeSet<i64>,
}

impl PreferenceSelection {
    /// Start from the user's saved preferences, if any.
    pub fn from_user(user: &User) -> Self {
        Self {
            authors: user.preferences.authors.iter().map(|a| a.id).collect(),
            categories: user.preferences.categories.iter().map(|c| c.id).collect(),
        }
    }

    pub fn toggle_author(&mut self, id: i64) {
        if !self.authors.remove(&id) {
            self.authors.insert(id);
        }
    }

    pub fn toggle_category(&mut self, id: i64) {
        if !self.categories.remove(&id) {
            self.categories.insert(id);
        }
    }

    pub fn has_author(&self, id: i64) -> bool {
        self.authors.contains(&id)
    }

    pub fn has_category(&self, id: i64) -> bool {
        self.categories.contains(&id)
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn validate(&self) -> Result<PreferenceIds, FormError> {
        if self.authors.len() < MIN_PREFERENCE_SELECTIONS {
            return Err(FormError::TooFewAuthors {
                required: MIN_PREFERENCE_SELECTIONS,
                selected: self.authors.len(),
            });
        }
        if self.categories.len() < MIN_PREFERENCE_SELECTIONS {
            return Err(FormError::TooFewCategories {
                required: MIN_PREFERENCE_SELECTIONS,
                selected: self.categories.len(),
            });
        }
        Ok(PreferenceIds {
            author_ids: self.authors.iter().copied().collect(),
            category_ids: self.categories.iter().copied().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn type_str(form: &mut AuthForm, s: &str) {
        for c in s.chars() {
            form.insert_char(c);
        }
    }

    #[test]
    fn test_login_requires_both_fields() {
        let mut form = AuthForm::new(AuthMode::Login);
        assert_eq!(
            form.validate().err(),
            Some(FormError::MissingField("Email"))
        );
        type_str(&mut form, "a@example.com");
        form.focus_next();
        assert_eq!(
            form.validate().err(),
            Some(FormError::MissingField("Password"))
        );
        type_str(&mut form, "secret");
        match form.validate() {
            Ok(Credentials::Login { email, password }) => {
                assert_eq!(email, "a@example.com");
                assert_eq!(password.expose_secret(), "secret");
            }
            _ => panic!("expected login credentials"),
        }
    }

    fn filled_register() -> AuthForm {
        let mut form = AuthForm::new(AuthMode::Register);
        type_str(&mut form, "Ada");
        form.focus_next();
        type_str(&mut form, "ada@example.com");
        form.focus_next();
        type_str(&mut form, "pw1");
        form.focus_next();
        type_str(&mut form, "pw1");
        form.focus_next();
        form
    }

    #[test]
    fn test_register_password_mismatch() {
        let mut form = filled_register();
        form.focus_prev();
        form.backspace();
        form.insert_char('2');
        assert_eq!(form.validate().err(), Some(FormError::PasswordMismatch));
    }

    #[test]
    fn test_register_requires_terms() {
        let mut form = filled_register();
        assert_eq!(form.focused(), AuthField::AcceptTerms);
        assert_eq!(form.validate().err(), Some(FormError::TermsNotAccepted));
        form.insert_char(' ');
        assert!(form.terms_accepted());
        assert!(matches!(form.validate(), Ok(Credentials::Register { .. })));
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = AuthForm::new(AuthMode::Login);
        form.focus_prev();
        assert_eq!(form.focused(), AuthField::Password);
        form.focus_next();
        assert_eq!(form.focused(), AuthField::Email);
    }

    #[test]
    fn test_preferences_need_three_of_each() {
        let mut sel = PreferenceSelection::default();
        for id in [1, 2] {
            sel.toggle_author(id);
        }
        assert_eq!(
            sel.validate().err(),
            Some(FormError::TooFewAuthors {
                required: 3,
                selected: 2
            })
        );
        sel.toggle_author(3);
        for id in [10, 11, 12] {
            sel.toggle_category(id);
        }
        sel.toggle_category(11);
        assert!(matches!(
            sel.validate(),
            Err(FormError::TooFewCategories { selected: 2, .. })
        ));
        sel.toggle_category(13);
        let ids = sel.validate().unwrap();
        assert_eq!(ids.author_ids, vec![1, 2, 3]);
        assert_eq!(ids.category_ids, vec![10, 12, 13]);
    }
}
