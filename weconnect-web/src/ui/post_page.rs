use futures::StreamExt;
use wasm_bindgen_futures::spawn_local;
use weconnect_client::{
    api::{FollowSuggestion, PostId, Session, SnapshotData, SubscriptionId, Trend},
    RemoteStore, SnapshotReceiver, ThreadFeed,
};
use yew::prelude::*;

use crate::ui;

#[derive(Clone, PartialEq, Properties)]
pub struct PostPageProps {
    /// May be absent while the navigation context is still resolving; no
    /// subscription work happens until it is set.
    pub id: Option<PostId>,
    pub store: RemoteStore,
    pub session: Session,
    pub trending: Vec<Trend>,
    pub follow: Vec<FollowSuggestion>,
    pub modal_open: bool,
    pub on_toggle_modal: Callback<bool>,
    pub on_back: Callback<()>,
    pub on_logout: Callback<()>,
}

pub enum PostPageMsg {
    Snapshot(SubscriptionId, SnapshotData),
}

/// The post-detail view: keeps a live mirror of the post and its comment
/// thread for whatever identifier the route currently names.
pub struct PostPage {
    feed: ThreadFeed<RemoteStore>,
}

impl PostPage {
    fn sync_subscriptions(&mut self, ctx: &Context<Self>) {
        match self.feed.set_post(ctx.props().id) {
            Err(err) => tracing::error!(?err, "failed registering live subscriptions"),
            Ok(None) => (),
            Ok(Some(streams)) => {
                pump(ctx, streams.post);
                pump(ctx, streams.comments);
            }
        }
    }

    fn refresh_title(&self) {
        if let Some(post) = &self.feed.thread().post {
            let title = format!("{} on weconnect: \"{}\"", post.username, post.text);
            web_sys::window()
                .and_then(|w| w.document())
                .expect("no document in this environment")
                .set_title(&title);
        }
    }
}

fn pump(ctx: &Context<PostPage>, mut snapshots: SnapshotReceiver) {
    let scope = ctx.link().clone();
    spawn_local(async move {
        while let Some((sub, data)) = snapshots.next().await {
            scope.send_message(PostPageMsg::Snapshot(sub, data));
        }
    });
}

impl Component for PostPage {
    type Message = PostPageMsg;
    type Properties = PostPageProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut this = PostPage {
            feed: ThreadFeed::new(ctx.props().store.clone()),
        };
        this.sync_subscriptions(ctx);
        this
    }

    fn changed(&mut self, ctx: &Context<Self>, _old_props: &Self::Properties) -> bool {
        self.sync_subscriptions(ctx);
        true
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            PostPageMsg::Snapshot(sub, data) => {
                let applied = self.feed.apply(sub, data);
                if applied {
                    self.refresh_title();
                }
                applied
            }
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        // Dispose both live subscriptions; late snapshots have nowhere to go
        self.feed.close();
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let p = ctx.props();
        let thread = self.feed.thread();
        let comments = (!thread.comments.is_empty()).then(|| {
            html! {
                <div class="comment-list">
                    { for thread.comments.iter().map(|c| html! {
                        <ui::Comment comment={ c.clone() } />
                    }) }
                </div>
            }
        });
        html! {
            <main class="page-layout">
                <ui::Sidebar
                    username={ p.session.user.name.clone() }
                    on_logout={ p.on_logout.clone() }
                />
                <div class="page-main">
                    <div class="page-header">
                        <button
                            type="button"
                            class="btn bi-btn bi-arrow-left"
                            aria-label="Back"
                            onclick={ p.on_back.reform(|_| ()) }
                        >
                        </button>
                        { "Post" }
                    </div>
                    <ui::Post
                        id={ p.id }
                        post={ thread.post.clone() }
                        on_reply={ p.on_toggle_modal.reform(|_| true) }
                    />
                    { for comments }
                </div>
                <ui::Widgets trending={ p.trending.clone() } follow={ p.follow.clone() } />
                { for p.modal_open.then(|| html! {
                    <ui::Modal on_close={ p.on_toggle_modal.reform(|_| false) } />
                }) }
            </main>
        }
    }
}
