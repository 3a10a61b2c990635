use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct SidebarProps {
    pub username: String,
    pub on_logout: Callback<()>,
}

#[function_component(Sidebar)]
pub fn sidebar(p: &SidebarProps) -> Html {
    html! {
        <nav class="sidebar">
            <a class="sidebar-brand" href="#/">{ "weconnect" }</a>
            <a class="sidebar-link" href="#/">{ "Home" }</a>
            <div class="sidebar-user">
                <span class="sidebar-username">{ &p.username }</span>
                <button onclick={ p.on_logout.reform(|_| ()) }>
                    { "Logout" }
                </button>
            </div>
        </nav>
    }
}
