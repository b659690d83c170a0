//! Posts and post drafts.
//!
//! Storage owns posts; the request layer only reads a post's identity and its
//! reply target. Drafts are validated here so every adapter stores the same
//! shape.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{USER_NAME_CHARS, UserName};

/// Maximum number of characters in a post.
pub const POST_CONTENT_MAX: usize = 140;

/// Validation errors raised for post identifiers and drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    #[error("post id must be a valid UUID")]
    InvalidId,
    #[error("post content must not be empty")]
    EmptyContent,
    #[error("post content must be at most {max} characters")]
    ContentTooLong { max: usize },
}

/// Stable post identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct PostId(Uuid);

impl PostId {
    /// Parse a post id from route input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PostValidationError> {
        Uuid::parse_str(raw.as_ref().trim())
            .map(Self)
            .map_err(|_| PostValidationError::InvalidId)
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PostId> for String {
    fn from(value: PostId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for PostId {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A published post as returned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    #[schema(value_type = String, example = "ada")]
    pub author: UserName,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub reply_to: Option<UserName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_pid: Option<PostId>,
}

/// Validated content of a post about to be published.
///
/// ## Invariants
/// - `content` is non-blank and at most [`POST_CONTENT_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    content: String,
    reply_to: Option<UserName>,
    reply_pid: Option<PostId>,
}

static MENTION_RE: OnceLock<Regex> = OnceLock::new();

fn mention_regex() -> &'static Regex {
    MENTION_RE.get_or_init(|| {
        let pattern = format!("@({USER_NAME_CHARS}+)");
        Regex::new(&pattern)
            .unwrap_or_else(|error| panic!("mention regex failed to compile: {error}"))
    })
}

impl PostDraft {
    /// Validate a draft from form input.
    ///
    /// # Examples
    /// ```
    /// use murmur::domain::PostDraft;
    ///
    /// let draft = PostDraft::new("hi @bob and @carol", None, None).expect("valid draft");
    /// let mentioned: Vec<String> = draft.mentions().into_iter().map(String::from).collect();
    /// assert_eq!(mentioned, ["bob", "carol"]);
    /// ```
    pub fn new(
        content: impl Into<String>,
        reply_to: Option<UserName>,
        reply_pid: Option<PostId>,
    ) -> Result<Self, PostValidationError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        if trimmed.chars().count() > POST_CONTENT_MAX {
            return Err(PostValidationError::ContentTooLong {
                max: POST_CONTENT_MAX,
            });
        }
        Ok(Self {
            content: trimmed.to_owned(),
            reply_to,
            reply_pid,
        })
    }

    /// Trimmed post text.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// User the post replies to, if any.
    pub fn reply_to(&self) -> Option<&UserName> {
        self.reply_to.as_ref()
    }

    /// Post the draft replies to, if any.
    pub fn reply_pid(&self) -> Option<PostId> {
        self.reply_pid
    }

    /// Users referenced by the post: every `@handle` in the text plus the
    /// reply target. Sorted and de-duplicated.
    pub fn mentions(&self) -> BTreeSet<UserName> {
        let mut mentioned: BTreeSet<UserName> = mention_regex()
            .captures_iter(&self.content)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| UserName::new(m.as_str()).ok())
            .collect();
        if let Some(reply_to) = &self.reply_to {
            mentioned.insert(reply_to.clone());
        }
        mentioned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn name(raw: &str) -> UserName {
        UserName::new(raw).expect("fixture name")
    }

    #[rstest]
    #[case("", PostValidationError::EmptyContent)]
    #[case("   \n", PostValidationError::EmptyContent)]
    fn rejects_blank_content(#[case] content: &str, #[case] expected: PostValidationError) {
        assert_eq!(
            PostDraft::new(content, None, None).expect_err("blank"),
            expected
        );
    }

    #[rstest]
    fn rejects_overlong_content() {
        let content = "x".repeat(POST_CONTENT_MAX + 1);
        assert_eq!(
            PostDraft::new(content, None, None).expect_err("too long"),
            PostValidationError::ContentTooLong {
                max: POST_CONTENT_MAX
            }
        );
    }

    #[rstest]
    fn trims_content() {
        let draft = PostDraft::new("  hello  ", None, None).expect("valid");
        assert_eq!(draft.content(), "hello");
    }

    #[rstest]
    fn mentions_include_reply_target_once() {
        let draft = PostDraft::new("@bob @bob hey @alice.", Some(name("bob")), None)
            .expect("valid");
        let mentioned: Vec<UserName> = draft.mentions().into_iter().collect();
        assert_eq!(mentioned, vec![name("alice"), name("bob")]);
    }

    #[rstest]
    fn ignores_handles_that_are_too_long() {
        let long = "a".repeat(40);
        let draft = PostDraft::new(format!("hi @{long}"), None, None).expect("valid");
        assert!(draft.mentions().is_empty());
    }

    #[rstest]
    fn post_id_parses_and_rejects() {
        let id = PostId::random();
        assert_eq!(PostId::new(id.to_string()).expect("parse"), id);
        assert_eq!(
            PostId::new("unknown").expect_err("invalid"),
            PostValidationError::InvalidId
        );
    }
}
