use std::{cell::RefCell, cmp::Reverse, collections::HashMap, rc::Rc};

use futures::channel::mpsc;
use weconnect_client::{
    api::{Comment, Error, LiveQuery, Post, PostId, SnapshotData, SubscriptionId},
    SnapshotSender, Store, Subscription, SubscriptionHandle,
};

/// In-memory document store with the same live-query semantics as the real
/// one: registering a query immediately yields the current snapshot, and
/// every mutation relays a fresh snapshot to all matching registrations.
pub struct MockStore {
    posts: HashMap<PostId, Post>,
    // per post, kept materialized in snapshot order (date desc, id desc)
    comments: HashMap<PostId, Vec<Comment>>,
    feeds: Vec<LiveFeed>,
}

struct LiveFeed {
    sub: SubscriptionId,
    query: LiveQuery,
    sender: SnapshotSender,
}

impl MockStore {
    pub fn new() -> MockStore {
        MockStore {
            posts: HashMap::new(),
            comments: HashMap::new(),
            feeds: Vec::new(),
        }
    }

    /// Return the current number of live registrations
    pub fn test_num_feeds(&self) -> usize {
        self.feeds.len()
    }

    pub fn add_post(&mut self, post: Post) -> Result<(), Error> {
        post.validate()?;
        if self.posts.contains_key(&post.id) {
            return Err(Error::UuidAlreadyUsed(post.id.0));
        }
        let query = LiveQuery::Post(post.id);
        self.posts.insert(post.id, post);
        self.relay(&query);
        Ok(())
    }

    pub fn update_post(&mut self, post: Post) -> Result<(), Error> {
        post.validate()?;
        if !self.posts.contains_key(&post.id) {
            return Err(Error::PostNotFound(post.id));
        }
        let query = LiveQuery::Post(post.id);
        self.posts.insert(post.id, post);
        self.relay(&query);
        Ok(())
    }

    pub fn remove_post(&mut self, id: PostId) -> Result<(), Error> {
        if self.posts.remove(&id).is_none() {
            return Err(Error::PostNotFound(id));
        }
        self.comments.remove(&id);
        self.relay(&LiveQuery::Post(id));
        self.relay(&LiveQuery::Comments(id));
        Ok(())
    }

    pub fn add_comment(&mut self, comment: Comment) -> Result<(), Error> {
        comment.validate()?;
        let post_id = comment.post_id;
        if !self.posts.contains_key(&post_id) {
            return Err(Error::PostNotFound(post_id));
        }
        let comments = self.comments.entry(post_id).or_insert_with(Vec::new);
        if comments.iter().any(|c| c.id == comment.id) {
            return Err(Error::UuidAlreadyUsed(comment.id.0));
        }
        comments.push(comment);
        comments.sort_unstable_by_key(|c| (Reverse(c.date), Reverse(c.id)));
        if let Some(post) = self.posts.get_mut(&post_id) {
            post.replies += 1;
        }
        self.relay(&LiveQuery::Comments(post_id));
        self.relay(&LiveQuery::Post(post_id));
        Ok(())
    }

    fn snapshot_for(&self, query: &LiveQuery) -> SnapshotData {
        match query {
            LiveQuery::Post(id) => SnapshotData::Post(self.posts.get(id).cloned()),
            LiveQuery::Comments(id) => {
                SnapshotData::Comments(self.comments.get(id).cloned().unwrap_or_default())
            }
        }
    }

    fn relay(&mut self, query: &LiveQuery) {
        let snapshot = self.snapshot_for(query);
        self.feeds.retain_mut(|f| {
            f.query != *query || f.sender.unbounded_send((f.sub, snapshot.clone())).is_ok()
        });
    }

    pub fn open_feed(&mut self, query: LiveQuery) -> Subscription {
        let sub = SubscriptionId::new();
        let (sender, snapshots) = mpsc::unbounded();
        // A registration immediately observes the current state
        let _ = sender.unbounded_send((sub, self.snapshot_for(&query)));
        self.feeds.push(LiveFeed { sub, query, sender });
        Subscription {
            handle: SubscriptionHandle::new(sub),
            snapshots,
        }
    }

    pub fn close_feed(&mut self, sub: SubscriptionId) {
        self.feeds.retain(|f| f.sub != sub);
    }
}

/// Cloneable handle to a [`MockStore`], so tests can keep mutating the store
/// while a `ThreadFeed` holds it as its [`Store`].
#[derive(Clone)]
pub struct SharedMockStore(Rc<RefCell<MockStore>>);

impl SharedMockStore {
    pub fn new() -> SharedMockStore {
        SharedMockStore(Rc::new(RefCell::new(MockStore::new())))
    }

    pub fn add_post(&self, post: Post) -> Result<(), Error> {
        self.0.borrow_mut().add_post(post)
    }

    pub fn update_post(&self, post: Post) -> Result<(), Error> {
        self.0.borrow_mut().update_post(post)
    }

    pub fn remove_post(&self, id: PostId) -> Result<(), Error> {
        self.0.borrow_mut().remove_post(id)
    }

    pub fn add_comment(&self, comment: Comment) -> Result<(), Error> {
        self.0.borrow_mut().add_comment(comment)
    }

    pub fn test_num_feeds(&self) -> usize {
        self.0.borrow().test_num_feeds()
    }
}

impl Store for SharedMockStore {
    fn subscribe(&mut self, query: LiveQuery) -> anyhow::Result<Subscription> {
        Ok(self.0.borrow_mut().open_feed(query))
    }

    fn unsubscribe(&mut self, sub: SubscriptionHandle) {
        self.0.borrow_mut().close_feed(sub.id());
    }
}
