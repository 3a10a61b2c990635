mod feed;
pub use feed::{ThreadFeed, ThreadStreams};

mod store;
pub use store::{
    FeedRouter, RemoteStore, SnapshotItem, SnapshotReceiver, SnapshotSender, Store, Subscription,
    SubscriptionHandle,
};

mod thread;
pub use thread::Thread;

pub mod api {
    pub use weconnect_api::*;
}
