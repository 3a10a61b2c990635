use uuid::Uuid;

use crate::{Error, Time, UserId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct PostId(pub Uuid);

impl PostId {
    pub fn stub() -> PostId {
        PostId(STUB_UUID)
    }
}

/// One post as materialized by the document store. The view only ever
/// observes posts; creation and all counter updates happen externally.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub username: String,
    pub text: String,
    pub date: Time,

    pub likes: u64,
    pub replies: u64,
}

impl Post {
    // See comments on other `validate` functions throughout weconnect-api
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.username)?;
        crate::validate_string(&self.text)?;
        crate::validate_time(&self.date)
    }
}
