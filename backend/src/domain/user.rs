//! Account identifiers and the signed-in identity projection.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors for user identifiers and handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyName,
    NameTooLong { max: usize },
    NameInvalidCharacters,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::NameTooLong { max } => write!(f, "user name must be at most {max} characters"),
            Self::NameInvalidCharacters => write!(
                f,
                "user name may only contain letters, numbers, or underscores"
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Public handle addressed by `/!{name}` routes.
///
/// ## Invariants
/// - 1 to [`USER_NAME_MAX`] characters.
/// - Only ASCII letters, digits, and underscores, so handles can be matched
///   inside post text as `@name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

/// Maximum allowed length for a user name.
pub const USER_NAME_MAX: usize = 32;

/// Character class shared by handle validation and mention extraction.
pub(crate) const USER_NAME_CHARS: &str = "[A-Za-z0-9_]";

static USER_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn user_name_regex() -> &'static Regex {
    USER_NAME_RE.get_or_init(|| {
        let pattern = format!("^{USER_NAME_CHARS}+$");
        Regex::new(&pattern)
            .unwrap_or_else(|error| panic!("user name regex failed to compile: {error}"))
    })
}

impl UserName {
    /// Validate and construct a [`UserName`].
    ///
    /// # Examples
    /// ```
    /// use murmur::domain::UserName;
    ///
    /// assert!(UserName::new("ada_99").is_ok());
    /// assert!(UserName::new("ada lovelace").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, UserValidationError> {
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
        }
        if !user_name_regex().is_match(&name) {
            return Err(UserValidationError::NameInvalidCharacters);
        }
        Ok(Self(name))
    }

    /// Profile location for this user, e.g. `/!ada`.
    pub fn profile_path(&self) -> String {
        format!("/!{}", self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Identity bound to a request once its session resolves.
///
/// Only lives as long as the request; the core never persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    user_id: UserId,
    name: UserName,
}

impl Identity {
    /// Pair a user id with its handle.
    pub fn new(user_id: UserId, name: UserName) -> Self {
        Self { user_id, name }
    }

    /// Stable identifier.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Public handle, also used as the display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    //! Validation coverage for identifiers and handles.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
    #[case("not-a-uuid", UserValidationError::InvalidId)]
    fn rejects_invalid_ids(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw).expect_err("invalid id"), expected);
    }

    #[rstest]
    fn user_id_round_trips_through_serde() {
        let id = UserId::random();
        let json = serde_json::to_string(&id).expect("serialise");
        let back: UserId = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, id);
    }

    #[rstest]
    #[case("", UserValidationError::EmptyName)]
    #[case("with space", UserValidationError::NameInvalidCharacters)]
    #[case("dash-ed", UserValidationError::NameInvalidCharacters)]
    #[case("ümlaut", UserValidationError::NameInvalidCharacters)]
    fn rejects_invalid_names(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserName::new(raw).expect_err("invalid name"), expected);
    }

    #[rstest]
    fn rejects_overlong_names() {
        let raw = "a".repeat(USER_NAME_MAX + 1);
        assert_eq!(
            UserName::new(raw).expect_err("too long"),
            UserValidationError::NameTooLong { max: USER_NAME_MAX }
        );
    }

    #[rstest]
    #[case("a")]
    #[case("Ada_Lovelace_1815")]
    fn accepts_valid_names(#[case] raw: &str) {
        let name = UserName::new(raw).expect("valid name");
        assert_eq!(name.as_ref(), raw);
        assert_eq!(name.profile_path(), format!("/!{raw}"));
    }
}
