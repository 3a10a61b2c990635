use weconnect_client::api;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct PostProps {
    pub id: Option<api::PostId>,
    pub post: Option<api::Post>,
    pub on_reply: Callback<()>,
}

#[function_component(Post)]
pub fn post(p: &PostProps) -> Html {
    let post = match &p.post {
        // Nothing received yet (or the document was deleted)
        None => return html! { <div class="post post-placeholder"></div> },
        Some(post) => post,
    };
    let date = post.date.format("%Y-%m-%d %H:%M").to_string();
    let date = match p.id {
        Some(id) => html! {
            <a class="post-date" href={ format!("#/post/{}", id.0) }>{ date }</a>
        },
        None => html! { <span class="post-date">{ date }</span> },
    };
    html! {
        <article class="post">
            <div class="post-author">
                <span class="post-username">{ &post.username }</span>
                { date }
            </div>
            <p class="post-text">{ &post.text }</p>
            <div class="post-counters">
                <span class="post-likes">{ post.likes }{ " likes" }</span>
                <span class="post-replies">{ post.replies }{ " replies" }</span>
                <button
                    type="button"
                    class="btn bi-btn bi-chat"
                    aria-label="Reply"
                    onclick={ p.on_reply.reform(|_| ()) }
                >
                </button>
            </div>
        </article>
    }
}
