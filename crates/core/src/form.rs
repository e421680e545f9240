//! Form field rules and error collection.
//!
//! Handlers validate a whole form before touching the store, so every broken
//! field is reported at once.

use std::collections::BTreeMap;

use crate::error::DomainError;

/// Key under which errors without a field are reported.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Errors collected while validating one form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<DomainError>,
}

impl FormErrors {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Records an error.
    pub fn push(&mut self, error: DomainError) {
        self.errors.push(error);
    }

    /// Records the error of a failed check, if any.
    pub fn check(&mut self, result: Result<(), DomainError>) {
        if let Err(error) = result {
            self.push(error);
        }
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Recorded errors in insertion order.
    #[must_use]
    pub fn errors(&self) -> &[DomainError] {
        &self.errors
    }

    /// Whether an error has been recorded for `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field() == Some(field))
    }

    /// `Ok(value)` when empty, otherwise the collected errors.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Messages grouped by field name; field-less errors go under
    /// [`NON_FIELD_ERRORS`].
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in &self.errors {
            let key = error.field().unwrap_or(NON_FIELD_ERRORS);
            let message = match error {
                DomainError::InvalidAmount(detail) => detail.clone(),
                other => other.to_string(),
            };
            map.entry(key.to_string()).or_default().push(message);
        }
        map
    }
}

impl From<DomainError> for FormErrors {
    fn from(error: DomainError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

const REQUIRED: &str = "This field is required.";

/// Rejects blank values.
///
/// # Errors
///
/// Returns a `Validation` error on `field` when `value` is empty.
pub fn required(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        Err(DomainError::validation(field, REQUIRED))
    } else {
        Ok(())
    }
}

/// Rejects blank values and values longer than `max` characters.
///
/// # Errors
///
/// Returns a `Validation` error on `field`.
pub fn required_max_len(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    required(field, value)?;
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::validation(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        ));
    }
    Ok(())
}

/// Username rule: 1..=150 letters, digits, or `@ . + - _`.
///
/// # Errors
///
/// Returns a `Validation` error on `username`.
pub fn username(value: &str) -> Result<(), DomainError> {
    required_max_len("username", value, 150)?;
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if value.chars().all(allowed) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ))
    }
}

/// Email rule: `local@domain.tld` with no whitespace.
///
/// # Errors
///
/// Returns a `Validation` error on `email`.
pub fn email(value: &str) -> Result<(), DomainError> {
    required("email", value)?;
    let invalid = || DomainError::validation("email", "Enter a valid email address.");

    if value.chars().any(char::is_whitespace) || value.chars().count() > 254 {
        return Err(invalid());
    }
    let (local, domain) = value.rsplit_once('@').ok_or_else(invalid)?;
    if local.is_empty() || local.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    let well_formed = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        });
    if well_formed { Ok(()) } else { Err(invalid()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice")]
    #[case("a.l+i-c_e@shop")]
    #[case("Zoë42")]
    fn test_valid_usernames(#[case] value: &str) {
        assert!(username(value).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("has space")]
    #[case("semi;colon")]
    fn test_invalid_usernames(#[case] value: &str) {
        assert!(username(value).is_err());
    }

    #[test]
    fn test_username_length() {
        assert!(username(&"a".repeat(150)).is_ok());
        assert!(username(&"a".repeat(151)).is_err());
    }

    #[rstest]
    #[case("admin@gmail.com", true)]
    #[case("first.last+tag@sub.example.co", true)]
    #[case("no-at-sign.com", false)]
    #[case("@example.com", false)]
    #[case("user@localhost", false)]
    #[case("user@exa mple.com", false)]
    #[case("user@.com", false)]
    #[case("a@b@c.com", false)]
    fn test_email(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(email(value).is_ok(), ok);
    }

    #[test]
    fn test_max_len_message() {
        let err = required_max_len("first_name", &"x".repeat(31), 30).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ensure this value has at most 30 characters (it has 31)."
        );
        assert_eq!(err.field(), Some("first_name"));
    }

    #[test]
    fn test_error_map_groups_by_field() {
        let mut errors = FormErrors::new();
        errors.check(required("first_name", ""));
        errors.push(DomainError::PasswordMismatch);
        errors.push(DomainError::InvalidAmount("Enter a number.".into()));
        errors.check(Ok(()));

        let map = errors.to_map();
        assert_eq!(map["first_name"], vec!["This field is required."]);
        assert_eq!(map[NON_FIELD_ERRORS], vec!["The two password fields didn't match."]);
        assert_eq!(map["amount"], vec!["Enter a number."]);
        assert!(errors.has_field("amount"));
        assert!(errors.finish(()).is_err());
    }

    #[test]
    fn test_empty_finishes_ok() {
        assert_eq!(FormErrors::new().finish(5), Ok(5));
    }
}
