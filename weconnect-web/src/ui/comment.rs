use weconnect_client::api;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct CommentProps {
    pub comment: api::Comment,
}

#[function_component(Comment)]
pub fn comment(p: &CommentProps) -> Html {
    html! {
        <div class="comment">
            <div class="comment-author">
                <span class="comment-username">{ &p.comment.username }</span>
                <span class="comment-date">
                    { p.comment.date.format("%Y-%m-%d %H:%M").to_string() }
                </span>
            </div>
            <p class="comment-text">{ &p.comment.text }</p>
        </div>
    }
}
