use uuid::Uuid;

use crate::{Error, PostId, Time, UserId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

/// One comment, belonging to exactly one post. Collection snapshots carry
/// comments ordered by `date` descending; the ordering is produced by the
/// store and preserved as-is downstream.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub username: String,
    pub text: String,
    pub date: Time,
}

impl Comment {
    // See comments on other `validate` functions throughout weconnect-api
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.username)?;
        crate::validate_string(&self.text)?;
        crate::validate_time(&self.date)
    }
}
