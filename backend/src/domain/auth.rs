//! Authentication primitives: credentials, sign-up forms, and auth tokens.
//!
//! Keep inbound payload parsing outside the router by exposing constructors
//! that validate raw strings before anything talks to a port.

use std::fmt;

use chrono::Duration;
use serde::Serialize;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::user::{UserName, UserValidationError};

/// Lifetime of an auth token cookie.
pub const AUTH_TOKEN_TTL_DAYS: i64 = 7;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing, blank, or not a valid handle.
    InvalidUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUsername => write!(f, "username must be a valid user name"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the account repository.
///
/// ## Invariants
/// - `username` is trimmed and is a valid [`UserName`].
/// - `password` is non-empty but keeps caller-provided whitespace to avoid
///   surprising credential comparisons.
///
/// # Examples
/// ```
/// use murmur::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada", "secret").unwrap();
/// assert_eq!(creds.username().as_ref(), "ada");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: UserName,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = UserName::new(username.trim())
            .map_err(|_| LoginValidationError::InvalidUsername)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Handle the credentials belong to.
    pub fn username(&self) -> &UserName {
        &self.username
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Flag shown on the sign-in view when a form submission is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignInFlag {
    /// The requested user name is already registered.
    DuplicateUser,
    /// Password and confirmation were blank or differed.
    PasswordMismatch,
    /// Credentials were supplied but did not verify.
    BadPassword,
    /// The requested user name is not a valid handle.
    InvalidName,
}

/// Sign-up submission after field-level checks, before any storage lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpForm {
    name: Result<UserName, UserValidationError>,
    passwords_match: bool,
    password: Zeroizing<String>,
}

impl SignUpForm {
    /// Capture raw form fields.
    ///
    /// Passwords match when both are non-blank and byte-for-byte equal.
    ///
    /// # Examples
    /// ```
    /// use murmur::domain::SignUpForm;
    ///
    /// assert!(SignUpForm::new("ada", "abc", "abc").passwords_match());
    /// assert!(!SignUpForm::new("ada", "abc", "abd").passwords_match());
    /// assert!(!SignUpForm::new("ada", " ", " ").passwords_match());
    /// ```
    pub fn new(name: &str, password: &str, confirmation: &str) -> Self {
        let has_text = |value: &str| !value.trim().is_empty();
        Self {
            name: UserName::new(name.trim()),
            passwords_match: has_text(password) && has_text(confirmation) && password == confirmation,
            password: Zeroizing::new(password.to_owned()),
        }
    }

    /// Requested handle, if it is valid.
    pub fn name(&self) -> Option<&UserName> {
        self.name.as_ref().ok()
    }

    /// Whether password and confirmation agree.
    pub fn passwords_match(&self) -> bool {
        self.passwords_match
    }

    /// Chosen password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Opaque server-side auth token carried by the session cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Wrap a token read back from a cookie.
    ///
    /// Returns `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(Zeroizing::new(raw)))
        }
    }

    /// Issue a fresh random token.
    pub fn generate() -> Self {
        Self(Zeroizing::new(Uuid::new_v4().simple().to_string()))
    }

    /// Token text, for storing in the cookie or looking it up.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Instruction for the cookie mechanism to persist a freshly issued token.
///
/// Every grant lives for [`AuthGrant::lifetime`]; the session cookie
/// middleware takes its TTL from the same place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    token: AuthToken,
}

impl AuthGrant {
    pub fn new(token: AuthToken) -> Self {
        Self { token }
    }

    /// Validity of any grant, [`AUTH_TOKEN_TTL_DAYS`] days.
    pub fn lifetime() -> Duration {
        Duration::days(AUTH_TOKEN_TTL_DAYS)
    }

    /// Token to persist.
    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    /// How long the cookie stays valid.
    pub fn max_age(&self) -> Duration {
        Self::lifetime()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::InvalidUsername)]
    #[case("   ", "pw", LoginValidationError::InvalidUsername)]
    #[case("has space", "pw", LoginValidationError::InvalidUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  ada  ", "secret")]
    #[case("bob", " padded password ")]
    fn valid_credentials_trim_username_only(#[case] username: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(username, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.username().as_ref(), username.trim());
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    #[case("abc", "abc", true)]
    #[case("abc", "abd", false)]
    #[case("", "", false)]
    #[case("abc", "", false)]
    #[case("  ", "  ", false)]
    fn sign_up_password_rules(
        #[case] password: &str,
        #[case] confirmation: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(
            SignUpForm::new("ada", password, confirmation).passwords_match(),
            expected
        );
    }

    #[rstest]
    fn sign_up_keeps_invalid_names_out() {
        assert!(SignUpForm::new("not valid", "a", "a").name().is_none());
        assert!(SignUpForm::new(" ada ", "a", "a").name().is_some());
    }

    #[rstest]
    fn generated_tokens_are_distinct_and_redacted() {
        let first = AuthToken::generate();
        let second = AuthToken::generate();
        assert_ne!(first, second);
        assert_eq!(format!("{first:?}"), "AuthToken(<redacted>)");
        assert!(AuthToken::new("  ").is_none());
    }

    #[rstest]
    fn grants_last_seven_days() {
        let grant = AuthGrant::new(AuthToken::generate());
        assert_eq!(grant.max_age(), Duration::days(7));
    }

    #[rstest]
    fn flags_serialise_kebab_case() {
        let value = serde_json::to_value(SignInFlag::PasswordMismatch).expect("serialise");
        assert_eq!(value, serde_json::json!("password-mismatch"));
    }
}
