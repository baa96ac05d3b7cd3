//! Login form state.
//!
//! `LoginForm` owns the field values, which fields have been touched, the
//! current validation errors and the form-level submit error. Every edit
//! re-runs the validator; errors are only shown for touched fields.

use std::collections::BTreeSet;
use std::fmt;

use crate::auth::{Credentials, Field, ValidationErrors, GUEST_EMAIL, GUEST_PASSWORD};

/// Maximum length for email input (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Clone, Default)]
pub struct LoginForm {
    email: String,
    password: String,
    touched: BTreeSet<Field>,
    errors: ValidationErrors,
    submit_error: Option<String>,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("touched", &self.touched)
            .field("errors", &self.errors)
            .field("submit_error", &self.submit_error)
            .finish()
    }
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a remembered email, untouched
    pub fn with_email(email: impl Into<String>) -> Self {
        let mut form = Self::new();
        form.email = sanitize(Field::Email, &email.into());
        form.errors = form.current_errors();
        form
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Email => &self.email,
            Field::Password => &self.password,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.email.clone(), self.password.clone())
    }

    /// Replace a field's value, dropping characters the input rules reject
    pub fn set_value(&mut self, field: Field, value: &str) {
        *self.value_mut(field) = sanitize(field, value);
        self.after_edit();
    }

    pub fn set_email(&mut self, email: &str) {
        self.set_value(Field::Email, email);
    }

    pub fn set_password(&mut self, password: &str) {
        self.set_value(Field::Password, password);
    }

    /// Append one typed character. Returns false if it was rejected.
    pub fn push_char(&mut self, field: Field, c: char) -> bool {
        if !can_add_char(field, self.value(field).chars().count(), c) {
            return false;
        }
        self.value_mut(field).push(c);
        self.after_edit();
        true
    }

    pub fn pop_char(&mut self, field: Field) {
        if self.value_mut(field).pop().is_some() {
            self.after_edit();
        }
    }

    pub fn clear_password(&mut self) {
        self.password.clear();
        self.touched.remove(&Field::Password);
        self.errors = self.current_errors();
    }

    /// Mark a field as visited so its error becomes visible
    pub fn blur(&mut self, field: Field) {
        self.touched.insert(field);
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    /// Run the validator and replace the error set. Returns true when valid.
    pub fn validate(&mut self) -> bool {
        self.errors = self.current_errors();
        self.errors.is_empty()
    }

    /// All current errors, touched or not
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Error to display inline for a field
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if self.is_touched(field) {
            self.errors.get(field)
        } else {
            None
        }
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn set_submit_error(&mut self, message: Option<String>) {
        self.submit_error = message;
    }

    /// Touch every field and validate. Yields credentials only when valid.
    pub fn submit(&mut self) -> Result<Credentials, ValidationErrors> {
        self.touched.extend(Field::ALL);
        self.submit_error = None;
        if self.validate() {
            Ok(self.credentials())
        } else {
            Err(self.errors.clone())
        }
    }

    /// Fill in the demo account, touched and validated, with prior errors cleared
    pub fn fill_guest(&mut self) {
        self.email = GUEST_EMAIL.to_string();
        self.password = GUEST_PASSWORD.to_string();
        self.touched.extend(Field::ALL);
        self.submit_error = None;
        self.validate();
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }

    fn after_edit(&mut self) {
        self.submit_error = None;
        self.errors = self.current_errors();
    }

    fn current_errors(&self) -> ValidationErrors {
        self.credentials().validate().err().unwrap_or_default()
    }
}

// ============================================================================
// Input validation helpers
// ============================================================================

fn max_length(field: Field) -> usize {
    match field {
        Field::Email => MAX_EMAIL_LENGTH,
        Field::Password => MAX_PASSWORD_LENGTH,
    }
}

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a typed character should be accepted into a field
pub fn can_add_char(field: Field, current_len: usize, c: char) -> bool {
    current_len < max_length(field) && is_valid_input_char(c)
}

fn sanitize(field: Field, value: &str) -> String {
    value
        .chars()
        .filter(|c| is_valid_input_char(*c))
        .take(max_length(field))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::{EMAIL_INVALID, EMAIL_REQUIRED, PASSWORD_REQUIRED};

    fn type_str(form: &mut LoginForm, field: Field, s: &str) {
        for c in s.chars() {
            form.push_char(field, c);
        }
    }

    #[test]
    fn test_can_add_char() {
        assert!(can_add_char(Field::Email, 0, 'a'));
        assert!(can_add_char(Field::Email, 253, 'z'));
        assert!(!can_add_char(Field::Email, 254, 'a'));

        assert!(can_add_char(Field::Password, 127, '!'));
        assert!(!can_add_char(Field::Password, 128, 'a'));

        // Control characters rejected
        assert!(!can_add_char(Field::Email, 0, '\x00'));
        assert!(!can_add_char(Field::Password, 0, '\n'));
        assert!(!can_add_char(Field::Password, 0, '\t'));
    }

    #[test]
    fn test_errors_hidden_until_touched() {
        let mut form = LoginForm::new();
        type_str(&mut form, Field::Email, "ada");

        assert_eq!(form.errors().get(Field::Email), Some(EMAIL_INVALID));
        assert_eq!(form.visible_error(Field::Email), None);

        form.blur(Field::Email);
        assert_eq!(form.visible_error(Field::Email), Some(EMAIL_INVALID));
    }

    #[test]
    fn test_edit_revalidates() {
        let mut form = LoginForm::new();
        form.blur(Field::Email);
        type_str(&mut form, Field::Email, "ada@example");
        assert_eq!(form.visible_error(Field::Email), Some(EMAIL_INVALID));

        type_str(&mut form, Field::Email, ".com");
        assert_eq!(form.visible_error(Field::Email), None);

        for _ in 0.."ada@example.com".len() {
            form.pop_char(Field::Email);
        }
        assert_eq!(form.visible_error(Field::Email), Some(EMAIL_REQUIRED));
    }

    #[test]
    fn test_submit_invalid_email() {
        let mut form = LoginForm::new();
        form.set_email("nope");
        form.set_password("secret");

        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get(Field::Email), Some(EMAIL_INVALID));
        assert_eq!(form.visible_error(Field::Email), Some(EMAIL_INVALID));
        assert_eq!(form.visible_error(Field::Password), None);
    }

    #[test]
    fn test_submit_empty_password() {
        let mut form = LoginForm::with_email("ada@example.com");
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get(Field::Password), Some(PASSWORD_REQUIRED));
        assert_eq!(form.visible_error(Field::Password), Some(PASSWORD_REQUIRED));
    }

    #[test]
    fn test_submit_valid() {
        let mut form = LoginForm::new();
        form.set_email("ada@example.com");
        form.set_password("hunter2");
        let creds = form.submit().unwrap();
        assert_eq!(creds, Credentials::new("ada@example.com", "hunter2"));
    }

    #[test]
    fn test_fill_guest_clears_prior_errors() {
        let mut form = LoginForm::new();
        form.set_email("bad");
        let _ = form.submit();
        form.set_submit_error(Some("Login failed".to_string()));
        assert!(form.visible_error(Field::Email).is_some());

        form.fill_guest();

        assert_eq!(form.email(), GUEST_EMAIL);
        assert_eq!(form.password(), GUEST_PASSWORD);
        assert!(form.is_touched(Field::Email));
        assert!(form.is_touched(Field::Password));
        assert!(form.errors().is_empty());
        assert_eq!(form.submit_error(), None);
    }

    #[test]
    fn test_set_value_sanitizes() {
        let mut form = LoginForm::new();
        form.set_email("ada@exa\nmple.com");
        assert_eq!(form.email(), "ada@example.com");

        form.set_password(&"p".repeat(MAX_PASSWORD_LENGTH + 10));
        assert_eq!(form.password().len(), MAX_PASSWORD_LENGTH);
    }

    #[test]
    fn test_edit_clears_submit_error() {
        let mut form = LoginForm::with_email("ada@example.com");
        form.set_submit_error(Some("Invalid email or password".to_string()));
        form.push_char(Field::Password, 'x');
        assert_eq!(form.submit_error(), None);
    }

    #[test]
    fn test_clear_password() {
        let mut form = LoginForm::new();
        form.fill_guest();
        form.clear_password();
        assert_eq!(form.password(), "");
        assert!(!form.is_touched(Field::Password));
        assert_eq!(form.visible_error(Field::Password), None);
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut form = LoginForm::new();
        form.set_password("hunter2");
        assert!(!format!("{:?}", form).contains("hunter2"));
    }
}
