//! Database models for the Postgres backend.
//!
//! These types map directly to rows and are converted into `feed-core`
//! domain values at the store boundary.

use feed_core::{Category, Identity, Msg, MsgId, UserProfile};
use sqlx::FromRow;

use crate::error::StoreError;

/// Database row for the `msgs` table (without the internal `seq`).
#[derive(Debug, Clone, FromRow)]
pub struct MsgRow {
    pub id: String,
    /// Identity as 32 bytes
    pub author: Vec<u8>,
    /// UTF-8 bytes
    pub content: Vec<u8>,
    pub category: String,
    pub timestamp_ns: i64,
    pub likes: i64,
    pub shares: i64,
    pub replies: Vec<String>,
}

impl TryFrom<MsgRow> for Msg {
    type Error = StoreError;

    fn try_from(row: MsgRow) -> Result<Self, Self::Error> {
        let author = Identity::from_slice(&row.author).map_err(|e| {
            StoreError::Corrupt(format!("msg {}: bad author: {}", row.id, e))
        })?;
        let category: Category = row
            .category
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("msg {}: {}", row.id, e)))?;
        let content = String::from_utf8(row.content)
            .map_err(|e| StoreError::Corrupt(format!("msg {}: content: {}", row.id, e)))?;
        let likes = u64::try_from(row.likes)
            .map_err(|_| StoreError::Corrupt(format!("msg {}: negative likes", row.id)))?;
        let shares = u64::try_from(row.shares)
            .map_err(|_| StoreError::Corrupt(format!("msg {}: negative shares", row.id)))?;

        Ok(Msg {
            id: MsgId::from(row.id),
            content,
            author,
            timestamp: row.timestamp_ns,
            likes,
            shares,
            replies: row.replies.into_iter().map(MsgId::from).collect(),
            category,
        })
    }
}

/// Database row for the `profiles` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    /// Identity as 32 bytes
    pub owner: Vec<u8>,
    /// UTF-8 bytes
    pub username: Vec<u8>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let owner = Identity::from_slice(&row.owner)
            .map_err(|e| StoreError::Corrupt(format!("profile owner: {}", e)))?;
        let username = String::from_utf8(row.username)
            .map_err(|e| StoreError::Corrupt(format!("profile {}: username: {}", owner, e)))?;
        Ok(UserProfile::new(owner, username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> MsgRow {
        MsgRow {
            id: "m1".to_string(),
            author: vec![3; 32],
            content: b"hello".to_vec(),
            category: "Sports".to_string(),
            timestamp_ns: 99,
            likes: 2,
            shares: 1,
            replies: vec!["r1".to_string(), "r2".to_string()],
        }
    }

    #[test]
    fn test_msg_row_conversion() {
        let msg = Msg::try_from(row()).unwrap();
        assert_eq!(msg.id.as_str(), "m1");
        assert_eq!(msg.author, Identity::from_bytes([3; 32]));
        assert_eq!(msg.category, Category::Sports);
        assert_eq!(msg.likes, 2);
        assert_eq!(msg.shares, 1);
        assert_eq!(msg.replies, vec![MsgId::from("r1"), MsgId::from("r2")]);
    }

    #[test]
    fn test_msg_row_bad_author() {
        let mut bad = row();
        bad.author = vec![1, 2, 3];
        assert!(matches!(Msg::try_from(bad), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_msg_row_bad_category() {
        let mut bad = row();
        bad.category = "Weather".to_string();
        assert!(matches!(Msg::try_from(bad), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_msg_row_keeps_nul_content() {
        let mut nul = row();
        nul.content = b"a\0b".to_vec();
        assert_eq!(Msg::try_from(nul).unwrap().content, "a\u{0}b");
    }

    #[test]
    fn test_msg_row_bad_utf8_content() {
        let mut bad = row();
        bad.content = vec![0xff, 0xfe];
        assert!(matches!(Msg::try_from(bad), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_profile_row_conversion() {
        let profile = UserProfile::try_from(ProfileRow {
            owner: vec![4; 32],
            username: b"carol".to_vec(),
        })
        .unwrap();
        assert_eq!(profile.username, "carol");
        assert_eq!(profile.owner, Some(Identity::from_bytes([4; 32])));
    }
}
