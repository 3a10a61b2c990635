use weconnect_client::api::{FollowSuggestion, Trend};
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct WidgetsProps {
    pub trending: Vec<Trend>,
    pub follow: Vec<FollowSuggestion>,
}

/// The auxiliary column. Degraded bootstrap payloads arrive as empty lists,
/// which render as empty sections with no error indication.
#[function_component(Widgets)]
pub fn widgets(p: &WidgetsProps) -> Html {
    html! {
        <aside class="widgets">
            <section class="widget">
                <h2>{ "What's happening" }</h2>
                <ul>
                    { for p.trending.iter().map(|t| html! {
                        <li class="trend">
                            <span class="trend-heading">{ &t.heading }</span>
                            <span class="trend-description">{ &t.description }</span>
                        </li>
                    }) }
                </ul>
            </section>
            <section class="widget">
                <h2>{ "Who to follow" }</h2>
                <ul>
                    { for p.follow.iter().map(|f| html! {
                        <li class="follow-suggestion">
                            <span class="follow-username">{ &f.username }</span>
                            <span class="follow-tag">{ &f.tag }</span>
                        </li>
                    }) }
                </ul>
            </section>
        </aside>
    }
}
