use uuid::Uuid;

use crate::{Comment, Post, PostId, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    pub fn new() -> SubscriptionId {
        SubscriptionId(Uuid::new_v4())
    }

    pub fn stub() -> SubscriptionId {
        SubscriptionId(STUB_UUID)
    }
}

/// A standing query against the document store. Registering one yields a
/// snapshot every time the matching data changes, until cancelled.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum LiveQuery {
    /// The single post document at this identifier.
    Post(PostId),
    /// All comments belonging to this post, ordered by timestamp descending.
    Comments(PostId),
}

impl LiveQuery {
    pub fn post_id(&self) -> PostId {
        match self {
            LiveQuery::Post(id) => *id,
            LiveQuery::Comments(id) => *id,
        }
    }
}

/// A point-in-time materialization of a live query's result.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum SnapshotData {
    /// `None` means the document does not exist (or no longer does).
    Post(Option<Post>),
    /// In the order produced by the store; never re-sorted downstream.
    Comments(Vec<Comment>),
}

impl SnapshotData {
    pub fn matches(&self, query: &LiveQuery) -> bool {
        match (self, query) {
            (SnapshotData::Post(_), LiveQuery::Post(_)) => true,
            (SnapshotData::Comments(_), LiveQuery::Comments(_)) => true,
            _ => false,
        }
    }
}

/// Client-to-store messages on the snapshot feed socket.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub enum StoreRequest {
    Ping,
    Subscribe {
        sub: SubscriptionId,
        query: LiveQuery,
    },
    Unsubscribe {
        sub: SubscriptionId,
    },
}

/// Store-to-client messages on the snapshot feed socket.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub enum FeedMessage {
    Pong,
    Snapshot {
        sub: SubscriptionId,
        data: SnapshotData,
    },
}
