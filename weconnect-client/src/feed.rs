use anyhow::Context;

use crate::{
    api::{LiveQuery, PostId, SnapshotData, SubscriptionId},
    store::{SnapshotReceiver, Store, SubscriptionHandle},
    Thread,
};

struct ActiveSubs {
    post_id: PostId,
    post: SubscriptionHandle,
    comments: SubscriptionHandle,
}

/// The snapshot streams for one post identifier, handed to the caller to
/// pump into whatever event loop owns the view.
pub struct ThreadStreams {
    pub post: SnapshotReceiver,
    pub comments: SnapshotReceiver,
}

/// Maintains the live mirror of one post and its comment thread.
///
/// At most two subscriptions are active at any time, both keyed to the same
/// post identifier. Switching identifiers always disposes the previous pair
/// before registering the new one, and [`ThreadFeed::apply`] refuses
/// snapshots tagged with anything but the currently active subscriptions, so
/// data from a previous identifier can never leak into the mirror.
pub struct ThreadFeed<S: Store> {
    store: S,
    thread: Thread,
    active: Option<ActiveSubs>,
}

impl<S: Store> ThreadFeed<S> {
    pub fn new(store: S) -> ThreadFeed<S> {
        ThreadFeed {
            store,
            thread: Thread::empty(),
            active: None,
        }
    }

    pub fn post_id(&self) -> Option<PostId> {
        self.active.as_ref().map(|a| a.post_id)
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    /// Re-targets the feed to `id`. A no-op when the identifier is unchanged;
    /// otherwise both existing subscriptions are disposed and the mirror is
    /// cleared before anything new is registered. Returns the snapshot
    /// streams to pump when a new registration was opened.
    pub fn set_post(&mut self, id: Option<PostId>) -> anyhow::Result<Option<ThreadStreams>> {
        if self.post_id() == id {
            return Ok(None);
        }
        self.close();
        self.thread.clear();
        let id = match id {
            Some(id) => id,
            None => return Ok(None),
        };
        let post = self
            .store
            .subscribe(LiveQuery::Post(id))
            .context("registering post subscription")?;
        let comments = match self
            .store
            .subscribe(LiveQuery::Comments(id))
            .context("registering comment subscription")
        {
            Ok(sub) => sub,
            Err(e) => {
                self.store.unsubscribe(post.handle);
                return Err(e);
            }
        };
        self.active = Some(ActiveSubs {
            post_id: id,
            post: post.handle,
            comments: comments.handle,
        });
        Ok(Some(ThreadStreams {
            post: post.snapshots,
            comments: comments.snapshots,
        }))
    }

    /// Applies one delivered snapshot to the mirror. Returns whether the
    /// mirror changed; snapshots from stale subscriptions and payloads whose
    /// kind does not match their subscription are dropped.
    pub fn apply(&mut self, sub: SubscriptionId, data: SnapshotData) -> bool {
        let active = match &self.active {
            Some(active) => active,
            None => {
                tracing::debug!(?sub, "dropping snapshot while no post is active");
                return false;
            }
        };
        if sub == active.post.id() {
            match data {
                SnapshotData::Post(post) => {
                    self.thread.apply_post(post);
                    true
                }
                SnapshotData::Comments(_) => {
                    tracing::warn!(?sub, "got comment snapshot on the post subscription");
                    false
                }
            }
        } else if sub == active.comments.id() {
            match data {
                SnapshotData::Comments(comments) => {
                    self.thread.apply_comments(comments);
                    true
                }
                SnapshotData::Post(_) => {
                    tracing::warn!(?sub, "got post snapshot on the comment subscription");
                    false
                }
            }
        } else {
            tracing::debug!(?sub, "dropping snapshot from stale subscription");
            false
        }
    }

    /// Disposes both subscriptions, each exactly once. Idempotent.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            self.store.unsubscribe(active.post);
            self.store.unsubscribe(active.comments);
        }
    }
}

impl<S: Store> Drop for ThreadFeed<S> {
    // Should be unneeded as the view disposes explicitly, but better safe
    // than sorry
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Comment, CommentId, Post, UserId, Uuid};
    use chrono::{TimeZone, Utc};
    use futures::channel::mpsc;
    use std::{cell::RefCell, collections::HashMap, rc::Rc};

    #[derive(Debug, Eq, PartialEq)]
    enum FakeEvent {
        Subscribed(SubscriptionId, LiveQuery),
        Unsubscribed(SubscriptionId),
    }

    #[derive(Default)]
    struct FakeStore {
        log: Vec<FakeEvent>,
        senders: HashMap<SubscriptionId, crate::SnapshotSender>,
        subscribe_calls: usize,
        fail_subscribe_at: Option<usize>,
    }

    impl FakeStore {
        fn sub_for(&self, query: LiveQuery) -> SubscriptionId {
            self.log
                .iter()
                .filter_map(|e| match e {
                    FakeEvent::Subscribed(sub, q) if *q == query => Some(*sub),
                    _ => None,
                })
                .last()
                .expect("no subscription recorded for query")
        }

        fn num_unsubscribed(&self) -> usize {
            self.log
                .iter()
                .filter(|e| matches!(e, FakeEvent::Unsubscribed(_)))
                .count()
        }
    }

    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<FakeStore>>);

    impl Store for SharedStore {
        fn subscribe(&mut self, query: LiveQuery) -> anyhow::Result<crate::Subscription> {
            let mut store = self.0.borrow_mut();
            let call = store.subscribe_calls;
            store.subscribe_calls += 1;
            if store.fail_subscribe_at == Some(call) {
                anyhow::bail!("store rejected the registration");
            }
            let id = SubscriptionId::new();
            let (sender, snapshots) = mpsc::unbounded();
            store.log.push(FakeEvent::Subscribed(id, query));
            store.senders.insert(id, sender);
            Ok(crate::Subscription {
                handle: SubscriptionHandle::new(id),
                snapshots,
            })
        }

        fn unsubscribe(&mut self, sub: SubscriptionHandle) {
            let mut store = self.0.borrow_mut();
            store.log.push(FakeEvent::Unsubscribed(sub.id()));
            store.senders.remove(&sub.id());
        }
    }

    fn post(id: PostId, text: &str) -> Post {
        Post {
            id,
            author_id: UserId::stub(),
            username: String::from("alice"),
            text: text.to_string(),
            date: Utc.with_ymd_and_hms(2022, 11, 3, 12, 0, 0).unwrap(),
            likes: 0,
            replies: 0,
        }
    }

    fn comment(post_id: PostId, text: &str, minute: u32) -> Comment {
        Comment {
            id: CommentId(Uuid::new_v4()),
            post_id,
            author_id: UserId::stub(),
            username: String::from("bob"),
            text: text.to_string(),
            date: Utc.with_ymd_and_hms(2022, 11, 3, 12, minute, 0).unwrap(),
        }
    }

    #[test]
    fn subscribes_both_queries_for_a_post() {
        let store = SharedStore::default();
        let mut feed = ThreadFeed::new(store.clone());
        let id = PostId(Uuid::new_v4());

        let streams = feed.set_post(Some(id)).unwrap();
        assert!(streams.is_some());
        let store = store.0.borrow();
        assert_eq!(store.log.len(), 2);
        assert!(matches!(store.log[0], FakeEvent::Subscribed(_, LiveQuery::Post(p)) if p == id));
        assert!(
            matches!(store.log[1], FakeEvent::Subscribed(_, LiveQuery::Comments(p)) if p == id)
        );
    }

    #[test]
    fn unchanged_identifier_is_a_noop() {
        let store = SharedStore::default();
        let mut feed = ThreadFeed::new(store.clone());
        let id = PostId(Uuid::new_v4());

        assert!(feed.set_post(Some(id)).unwrap().is_some());
        assert!(feed.set_post(Some(id)).unwrap().is_none());
        assert_eq!(store.0.borrow().log.len(), 2);
    }

    #[test]
    fn identifier_switch_disposes_before_resubscribing() {
        let store = SharedStore::default();
        let mut feed = ThreadFeed::new(store.clone());
        let first = PostId(Uuid::new_v4());
        let second = PostId(Uuid::new_v4());

        feed.set_post(Some(first)).unwrap();
        let first_post_sub = store.0.borrow().sub_for(LiveQuery::Post(first));
        assert!(feed.apply(first_post_sub, SnapshotData::Post(Some(post(first, "hi")))));
        assert!(feed.thread().post.is_some());

        feed.set_post(Some(second)).unwrap();

        // Both disposals happen before any new registration
        let store_ref = store.0.borrow();
        assert!(
            matches!(store_ref.log[2], FakeEvent::Unsubscribed(s) if s == first_post_sub),
            "expected first post subscription disposed, got {:?}",
            store_ref.log,
        );
        assert!(matches!(store_ref.log[3], FakeEvent::Unsubscribed(_)));
        assert!(matches!(store_ref.log[4], FakeEvent::Subscribed(_, _)));
        drop(store_ref);

        // The mirror was cleared on switch
        assert_eq!(*feed.thread(), Thread::empty());

        // A late snapshot from the old identifier is refused
        assert!(!feed.apply(first_post_sub, SnapshotData::Post(Some(post(first, "stale")))));
        assert_eq!(feed.thread().post, None);

        // While the new identifier's snapshots apply fine
        let second_post_sub = store.0.borrow().sub_for(LiveQuery::Post(second));
        assert!(feed.apply(second_post_sub, SnapshotData::Post(Some(post(second, "new")))));
        assert_eq!(feed.thread().post.as_ref().unwrap().text, "new");
    }

    #[test]
    fn comments_keep_delivered_order() {
        let store = SharedStore::default();
        let mut feed = ThreadFeed::new(store.clone());
        let id = PostId(Uuid::new_v4());
        feed.set_post(Some(id)).unwrap();
        let comments_sub = store.0.borrow().sub_for(LiveQuery::Comments(id));

        // Deliberately not sorted by timestamp in either direction: whatever
        // the store sends is what must be rendered
        let delivered = vec![
            comment(id, "second", 30),
            comment(id, "newest", 45),
            comment(id, "oldest", 0),
        ];
        assert!(feed.apply(comments_sub, SnapshotData::Comments(delivered.clone())));
        assert_eq!(feed.thread().comments, delivered);
    }

    #[test]
    fn mismatched_payload_kind_is_dropped() {
        let store = SharedStore::default();
        let mut feed = ThreadFeed::new(store.clone());
        let id = PostId(Uuid::new_v4());
        feed.set_post(Some(id)).unwrap();
        let post_sub = store.0.borrow().sub_for(LiveQuery::Post(id));

        assert!(!feed.apply(post_sub, SnapshotData::Comments(vec![comment(id, "x", 1)])));
        assert_eq!(*feed.thread(), Thread::empty());
    }

    #[test]
    fn close_disposes_exactly_once() {
        let store = SharedStore::default();
        let mut feed = ThreadFeed::new(store.clone());
        feed.set_post(Some(PostId(Uuid::new_v4()))).unwrap();

        feed.close();
        assert_eq!(store.0.borrow().num_unsubscribed(), 2);
        assert!(store.0.borrow().senders.is_empty());

        // close is idempotent, and the drop impl must not dispose again
        feed.close();
        drop(feed);
        assert_eq!(store.0.borrow().num_unsubscribed(), 2);
    }

    #[test]
    fn closed_feed_stops_delivering() {
        let store = SharedStore::default();
        let mut feed = ThreadFeed::new(store.clone());
        let id = PostId(Uuid::new_v4());
        let mut streams = feed.set_post(Some(id)).unwrap().unwrap();

        feed.close();

        // Senders were dropped on disposal: the streams terminate without
        // yielding anything
        assert_eq!(streams.post.try_next().unwrap(), None);
        assert_eq!(streams.comments.try_next().unwrap(), None);
    }

    #[test]
    fn clearing_the_identifier_disposes_subscriptions() {
        let store = SharedStore::default();
        let mut feed = ThreadFeed::new(store.clone());
        let id = PostId(Uuid::new_v4());
        feed.set_post(Some(id)).unwrap();
        let post_sub = store.0.borrow().sub_for(LiveQuery::Post(id));
        feed.apply(post_sub, SnapshotData::Post(Some(post(id, "hi"))));

        assert!(feed.set_post(None).unwrap().is_none());
        assert_eq!(store.0.borrow().num_unsubscribed(), 2);
        assert_eq!(*feed.thread(), Thread::empty());
        assert_eq!(feed.post_id(), None);
    }

    #[test]
    fn failed_registration_leaves_nothing_behind() {
        let store = SharedStore::default();
        let mut feed = ThreadFeed::new(store.clone());
        let id = PostId(Uuid::new_v4());

        // The post registration (call 0) succeeds, the comment registration
        // (call 1) fails: the successful one must be rolled back
        store.0.borrow_mut().fail_subscribe_at = Some(1);
        assert!(feed.set_post(Some(id)).is_err());
        assert_eq!(feed.post_id(), None);

        let store_ref = store.0.borrow();
        assert!(matches!(
            &store_ref.log[..],
            [FakeEvent::Subscribed(s, _), FakeEvent::Unsubscribed(u)] if s == u,
        ));
        assert!(store_ref.senders.is_empty());
    }
}
