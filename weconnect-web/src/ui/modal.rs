use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ModalProps {
    pub on_close: Callback<()>,
}

/// Composer shell toggled from the post view; the view itself never writes
/// to the store.
#[function_component(Modal)]
pub fn modal(p: &ModalProps) -> Html {
    html! {
        <div class="modal-overlay" onclick={ p.on_close.reform(|_| ()) }>
            <div class="modal-body" onclick={ Callback::from(|e: MouseEvent| e.stop_propagation()) }>
                <button
                    type="button"
                    class="btn bi-btn bi-x-lg"
                    aria-label="Close"
                    onclick={ p.on_close.reform(|_| ()) }
                >
                </button>
                <textarea placeholder="Post your reply" />
            </div>
        </div>
    }
}
