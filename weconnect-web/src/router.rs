use wasm_bindgen::{prelude::Closure, JsCast};
use weconnect_client::api::{PostId, Uuid};
use yew::Callback;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Route {
    Home,
    Post(PostId),
}

impl Route {
    /// Routes are hash-based: `#/post/<uuid>` shows one post, anything else
    /// is home.
    pub fn parse(hash: &str) -> Route {
        let hash = hash.strip_prefix('#').unwrap_or(hash);
        match hash.strip_prefix("/post/") {
            Some(id) => match Uuid::try_parse(id) {
                Ok(id) => Route::Post(PostId(id)),
                Err(_) => Route::Home,
            },
            None => Route::Home,
        }
    }

    pub fn to_hash(&self) -> String {
        match self {
            Route::Home => String::from("#/"),
            Route::Post(id) => format!("#/post/{}", id.0),
        }
    }
}

fn window() -> web_sys::Window {
    web_sys::window().expect("no window in this environment")
}

pub fn current() -> Route {
    let hash = window().location().hash().unwrap_or_default();
    Route::parse(&hash)
}

/// Imperative navigation; the hashchange listener brings the app state along.
pub fn navigate(route: &Route) {
    window()
        .location()
        .set_hash(&route.to_hash())
        .expect("failed setting location hash");
}

/// Keeps a `hashchange` listener registered for as long as it is alive.
pub struct HashListener {
    _closure: Closure<dyn FnMut()>,
}

impl HashListener {
    pub fn register(on_change: Callback<Route>) -> HashListener {
        let closure =
            Closure::wrap(Box::new(move || on_change.emit(current())) as Box<dyn FnMut()>);
        window().set_onhashchange(Some(closure.as_ref().unchecked_ref()));
        HashListener { _closure: closure }
    }
}

impl Drop for HashListener {
    fn drop(&mut self) {
        window().set_onhashchange(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_round_trip() {
        let id = PostId::stub();
        let route = Route::Post(id);
        assert_eq!(Route::parse(&route.to_hash()), route);
        assert_eq!(Route::parse(&Route::Home.to_hash()), Route::Home);
    }

    #[test]
    fn malformed_hashes_fall_back_to_home() {
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("#/post/not-a-uuid"), Route::Home);
        assert_eq!(Route::parse("#/elsewhere"), Route::Home);
    }
}
