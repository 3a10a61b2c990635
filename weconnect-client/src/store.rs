use std::{cell::RefCell, collections::HashMap, rc::Rc};

use anyhow::Context;
use futures::channel::mpsc;

use crate::api::{LiveQuery, SnapshotData, StoreRequest, SubscriptionId};

pub type SnapshotItem = (SubscriptionId, SnapshotData);
pub type SnapshotSender = mpsc::UnboundedSender<SnapshotItem>;
pub type SnapshotReceiver = mpsc::UnboundedReceiver<SnapshotItem>;

/// Handle to one live registration. Deliberately not `Clone`: disposal
/// consumes the handle, so a registration can be cancelled at most once.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
}

impl SubscriptionHandle {
    pub fn new(id: SubscriptionId) -> SubscriptionHandle {
        SubscriptionHandle { id }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// One live subscription: the disposal handle plus the stream of snapshots.
/// Registration returns immediately; snapshots arrive asynchronously, in
/// delivery order, through the channel.
pub struct Subscription {
    pub handle: SubscriptionHandle,
    pub snapshots: SnapshotReceiver,
}

/// A document store that supports live queries: register a query, get a
/// stream of snapshots until the handle is disposed.
pub trait Store {
    fn subscribe(&mut self, query: LiveQuery) -> anyhow::Result<Subscription>;
    fn unsubscribe(&mut self, sub: SubscriptionHandle);
}

/// Routes snapshots arriving on a shared transport to the per-subscription
/// channels. Deliveries for unknown ids (anything already disposed) are
/// dropped on the floor.
pub struct FeedRouter {
    subs: HashMap<SubscriptionId, SnapshotSender>,
}

impl FeedRouter {
    pub fn new() -> FeedRouter {
        FeedRouter {
            subs: HashMap::new(),
        }
    }

    pub fn register(&mut self, sub: SubscriptionId) -> SnapshotReceiver {
        let (sender, receiver) = mpsc::unbounded();
        self.subs.insert(sub, sender);
        receiver
    }

    pub fn remove(&mut self, sub: SubscriptionId) {
        self.subs.remove(&sub);
    }

    pub fn deliver(&mut self, sub: SubscriptionId, data: SnapshotData) {
        match self.subs.get(&sub) {
            None => tracing::debug!(?sub, "dropping snapshot for disposed subscription"),
            Some(sender) => {
                if sender.unbounded_send((sub, data)).is_err() {
                    self.subs.remove(&sub);
                }
            }
        }
    }
}

/// Adapts an outbound request channel plus a shared [`FeedRouter`] to the
/// [`Store`] trait. The transport itself (the socket pump that serializes
/// requests and feeds the router) lives with the platform that owns it.
#[derive(Clone)]
pub struct RemoteStore {
    requests: mpsc::UnboundedSender<StoreRequest>,
    router: Rc<RefCell<FeedRouter>>,
}

impl RemoteStore {
    pub fn new(
        requests: mpsc::UnboundedSender<StoreRequest>,
        router: Rc<RefCell<FeedRouter>>,
    ) -> RemoteStore {
        RemoteStore { requests, router }
    }
}

impl PartialEq for RemoteStore {
    fn eq(&self, other: &RemoteStore) -> bool {
        self.requests.same_receiver(&other.requests) && Rc::ptr_eq(&self.router, &other.router)
    }
}

impl Store for RemoteStore {
    fn subscribe(&mut self, query: LiveQuery) -> anyhow::Result<Subscription> {
        let id = SubscriptionId::new();
        let snapshots = self.router.borrow_mut().register(id);
        self.requests
            .unbounded_send(StoreRequest::Subscribe { sub: id, query })
            .context("queueing subscribe request to store transport")?;
        Ok(Subscription {
            handle: SubscriptionHandle::new(id),
            snapshots,
        })
    }

    fn unsubscribe(&mut self, sub: SubscriptionHandle) {
        self.router.borrow_mut().remove(sub.id());
        // If the transport is already gone there is nothing left to cancel.
        let _ = self
            .requests
            .unbounded_send(StoreRequest::Unsubscribe { sub: sub.id() });
    }
}
