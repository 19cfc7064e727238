//! Core data types for the feed service.
//!
//! The wire shapes here are the stable contract clients depend on:
//!
//! - `Msg` serializes as `{ id, content, author, timestamp, likes, shares,
//!   replies, category }`
//! - `Identity` serializes as a 64-character lowercase hex string
//! - `RpcResult` serializes as `{ "ok": .. }` or `{ "err": "..." }`
//!
//! Older clients may send records without `likes`, `shares`, `replies` or
//! `category`; those fields decode to their zero values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Creation instant in nanoseconds since the Unix epoch.
pub type Time = i64;

// ============================================================================
// Identity
// ============================================================================

/// Opaque caller principal supplied by the transport on every request.
///
/// The core never authenticates an identity; it only compares identities for
/// equality and uses them as keys. Internally this is a 32-byte value,
/// normally the BLAKE3 hash of an Ed25519 public key (see
/// [`crate::identity::derive_identity`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity([u8; 32]);

impl Identity {
    /// Creates an Identity from a 32-byte array.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the inner bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The all-zero identity, used for unauthenticated dev-mode callers.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self([0u8; 32])
    }

    /// Whether this is the anonymous identity.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Builds an Identity from a byte slice, failing unless it is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentityParseError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| IdentityParseError::InvalidLength(bytes.len() * 2))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for Identity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(IdentityParseError::InvalidLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdentityParseError::InvalidHex);
        }

        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| IdentityParseError::InvalidHex)?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| IdentityParseError::InvalidHex)?;
        }
        Ok(Self(bytes))
    }
}

/// Error type for parsing an Identity from its hex form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityParseError {
    /// The hex string had an invalid length (expected 64 characters).
    InvalidLength(usize),
    /// The string contained invalid hex characters.
    InvalidHex,
}

impl fmt::Display for IdentityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength(len) => write!(
                f,
                "invalid identity length: expected 64 hex chars, got {}",
                len
            ),
            Self::InvalidHex => write!(f, "invalid hex character in identity"),
        }
    }
}

impl std::error::Error for IdentityParseError {}

impl Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Service-assigned message identifier.
///
/// Freshly created messages get a UUID v4 rendering, but the wire type is
/// plain text: lookups accept any string and simply miss when it was never
/// assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MsgId(String);

impl MsgId {
    /// Allocates a new unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MsgId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MsgId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed message taxonomy.
///
/// `All` is a legal category for a post and also the "no filter" value in
/// category queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    All,
    News,
    Crypto,
    Sports,
    Other,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 5] = [
        Category::All,
        Category::News,
        Category::Crypto,
        Category::Sports,
        Category::Other,
    ];

    /// Canonical name, as stored and serialized.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::News => "News",
            Self::Crypto => "Crypto",
            Self::Sports => "Sports",
            Self::Other => "Other",
        }
    }

    /// Whether a message in category `other` passes this category as a filter.
    #[must_use]
    pub fn matches(&self, other: Category) -> bool {
        *self == Category::All || *self == other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    /// Case-insensitive parse of a category name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

/// Error returned when a string does not name a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryParseError(pub String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown category '{}': expected one of All, News, Crypto, Sports, Other",
            self.0
        )
    }
}

impl std::error::Error for CategoryParseError {}

/// A posted message with its social counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msg {
    pub id: MsgId,
    pub content: String,
    pub author: Identity,
    /// Creation instant in nanoseconds.
    pub timestamp: Time,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    /// Reply ids in the order the replies were made.
    #[serde(default)]
    pub replies: Vec<MsgId>,
    #[serde(default)]
    pub category: Category,
}

impl Msg {
    /// Creates a fresh message with zeroed counters and no replies.
    #[must_use]
    pub fn new(
        id: MsgId,
        author: Identity,
        content: impl Into<String>,
        category: Category,
        timestamp: Time,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            author,
            timestamp,
            likes: 0,
            shares: 0,
            replies: Vec::new(),
            category,
        }
    }
}

/// Display-name profile owned by one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning identity; the lookup key, not part of the wire body.
    #[serde(skip)]
    pub owner: Option<Identity>,
    pub username: String,
}

impl UserProfile {
    /// Creates a profile for `owner`.
    #[must_use]
    pub fn new(owner: Identity, username: impl Into<String>) -> Self {
        Self {
            owner: Some(owner),
            username: username.into(),
        }
    }
}

/// A message paired with its author's current display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub msg: Msg,
    /// `None` when the author never set a profile.
    pub username: Option<String>,
}

// ============================================================================
// Validation
// ============================================================================

/// Rejection reasons for message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentError {
    /// Content is empty or whitespace only.
    Empty,
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "message content cannot be empty"),
        }
    }
}

impl std::error::Error for ContentError {}

/// Checks that `content` has something besides surrounding whitespace.
///
/// The content itself is stored untrimmed.
pub fn validate_content(content: &str) -> Result<(), ContentError> {
    if content.trim().is_empty() {
        Err(ContentError::Empty)
    } else {
        Ok(())
    }
}

// ============================================================================
// Wire envelope
// ============================================================================

/// Tagged result envelope: `{ "ok": T }` or `{ "err": "message" }`.
///
/// The error payload is human-readable text; clients branch on the tag only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcResult<T> {
    Ok(T),
    Err(String),
}

impl<T> RpcResult<T> {
    /// Converts back into a standard `Result`.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Err(message) => Err(message),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for RpcResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_display_fromstr() {
        let id = Identity::from_bytes([0xab; 32]);
        let s = id.to_string();
        assert_eq!(s.len(), 64);
        assert_eq!(s.parse::<Identity>().unwrap(), id);
    }

    #[test]
    fn identity_rejects_bad_hex() {
        assert_eq!(
            "ab".parse::<Identity>(),
            Err(IdentityParseError::InvalidLength(2))
        );
        assert_eq!(
            "zz".repeat(32).parse::<Identity>(),
            Err(IdentityParseError::InvalidHex)
        );
    }

    #[test]
    fn identity_from_slice_checks_length() {
        assert!(Identity::from_slice(&[1u8; 32]).is_ok());
        assert!(Identity::from_slice(&[1u8; 31]).is_err());
    }

    #[test]
    fn anonymous_identity_is_zero() {
        assert!(Identity::anonymous().is_anonymous());
        assert!(!Identity::from_bytes([1; 32]).is_anonymous());
    }

    #[test]
    fn msg_ids_are_unique() {
        let a = MsgId::generate();
        let b = MsgId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("news".parse::<Category>().unwrap(), Category::News);
        assert_eq!("SPORTS".parse::<Category>().unwrap(), Category::Sports);
        assert_eq!(" Crypto ".parse::<Category>().unwrap(), Category::Crypto);
        assert!("weather".parse::<Category>().is_err());
    }

    #[test]
    fn category_all_matches_everything() {
        for c in Category::ALL {
            assert!(Category::All.matches(c));
        }
        assert!(Category::News.matches(Category::News));
        assert!(!Category::News.matches(Category::All));
        assert!(!Category::News.matches(Category::Crypto));
    }

    #[test]
    fn msg_wire_shape() {
        let author = Identity::from_bytes([7; 32]);
        let msg = Msg::new(MsgId::from("m1"), author, "hello", Category::News, 42);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["id"], "m1");
        assert_eq!(json["content"], "hello");
        assert_eq!(json["author"], author.to_string());
        assert_eq!(json["timestamp"], 42);
        assert_eq!(json["likes"], 0);
        assert_eq!(json["shares"], 0);
        assert_eq!(json["replies"], serde_json::json!([]));
        assert_eq!(json["category"], "News");
    }

    #[test]
    fn msg_decodes_minimal_record() {
        let json = format!(
            r#"{{"id":"m1","content":"hi","author":"{}","timestamp":5}}"#,
            "00".repeat(32)
        );
        let msg: Msg = serde_json::from_str(&json).unwrap();
        assert_eq!(msg.likes, 0);
        assert_eq!(msg.shares, 0);
        assert!(msg.replies.is_empty());
        assert_eq!(msg.category, Category::All);
    }

    #[test]
    fn profile_body_omits_owner() {
        let profile = UserProfile::new(Identity::anonymous(), "alice");
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, r#"{"username":"alice"}"#);
    }

    #[test]
    fn validate_content_rejects_blank() {
        assert_eq!(validate_content(""), Err(ContentError::Empty));
        assert_eq!(validate_content("   \n\t"), Err(ContentError::Empty));
        assert!(validate_content("  hi  ").is_ok());
    }

    #[test]
    fn rpc_result_tags() {
        let ok: RpcResult<u32> = RpcResult::Ok(3);
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"ok":3}"#);

        let err: RpcResult<u32> = Err::<u32, _>(ContentError::Empty).into();
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"err":"message content cannot be empty"}"#
        );
        assert!(!err.is_ok());
    }
}
