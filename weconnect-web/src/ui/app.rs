use std::{cell::RefCell, rc::Rc};

use futures::channel::{mpsc, oneshot};
use gloo_storage::{LocalStorage, Storage};
use wasm_bindgen_futures::spawn_local;
use weconnect_client::{
    api::{BootstrapData, NewSession, Session, SessionStatus},
    FeedRouter, RemoteStore,
};
use yew::prelude::*;

use crate::{
    api,
    router::{self, HashListener, Route},
    ui, LoginInfo,
};

const KEY_LOGIN: &str = "login";

pub enum AppMsg {
    UserLogin(ui::Credentials),
    LoggedIn(LoginInfo),
    LoginFailed,
    SessionResolved(Option<Session>),
    UserLogout,
    ReceivedBootstrap(BootstrapData),
    RouteChanged(Route),
    Navigate(Route),
    SetModalOpen(bool),
}

pub struct App {
    login: Option<LoginInfo>,
    status: SessionStatus,
    bootstrap: BootstrapData,
    route: Route,
    modal_open: bool,
    store: Option<RemoteStore>,
    feed_canceller: Option<oneshot::Receiver<()>>,
    _hash_listener: HashListener,
}

impl App {
    fn fetch_session(&self, ctx: &Context<Self>) {
        let login = self
            .login
            .clone()
            .expect("called App::fetch_session without a login set");
        ctx.link().send_future(async move {
            match api::fetch_session(&login).await {
                Ok(session) => AppMsg::SessionResolved(session),
                Err(err) => {
                    tracing::error!(?err, "failed resolving session");
                    AppMsg::SessionResolved(None)
                }
            }
        });
    }

    fn fetch_bootstrap(&self, ctx: &Context<Self>) {
        let host = match &self.login {
            Some(login) => login.host.clone(),
            None => crate::DEFAULT_HOST.to_string(),
        };
        let token = self.login.as_ref().map(|l| l.token);
        ctx.link().send_future(async move {
            match api::fetch_bootstrap(&host, token).await {
                Ok(data) => AppMsg::ReceivedBootstrap(data),
                Err(err) => {
                    tracing::error!(?err, "failed fetching bootstrap data, using empty defaults");
                    AppMsg::ReceivedBootstrap(BootstrapData::empty())
                }
            }
        });
    }

    fn start_feed(&mut self, login: &LoginInfo) {
        let (requests, request_feed) = mpsc::unbounded();
        let feed_router = Rc::new(RefCell::new(FeedRouter::new()));
        let (cancel, canceller) = oneshot::channel();
        self.store = Some(RemoteStore::new(requests, feed_router.clone()));
        self.feed_canceller = Some(canceller);
        spawn_local(api::start_snapshot_feed(
            login.clone(),
            request_feed,
            feed_router,
            cancel,
        ));
    }

    fn stop_feed(&mut self) {
        self.store = None;
        // Closing the canceller tears the socket task down
        if let Some(mut canceller) = self.feed_canceller.take() {
            canceller.close();
        }
    }
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let login: Option<LoginInfo> = LocalStorage::get(KEY_LOGIN).ok();
        let status = match login {
            Some(_) => SessionStatus::Loading,
            None => SessionStatus::Unauthenticated,
        };
        let this = App {
            login,
            status,
            bootstrap: BootstrapData::empty(),
            route: router::current(),
            modal_open: false,
            store: None,
            feed_canceller: None,
            _hash_listener: HashListener::register(ctx.link().callback(AppMsg::RouteChanged)),
        };
        if this.login.is_some() {
            this.fetch_session(ctx);
        }
        this.fetch_bootstrap(ctx);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::UserLogin(creds) => {
                self.status = SessionStatus::Loading;
                let device = whoami::devicename();
                ctx.link().send_future(async move {
                    let session = NewSession::new(creds.user.clone(), creds.pass, device);
                    match api::auth(creds.host.clone(), session).await {
                        Ok(token) => AppMsg::LoggedIn(LoginInfo {
                            host: creds.host,
                            user: creds.user,
                            token,
                        }),
                        Err(err) => {
                            tracing::error!(?err, "failed to log in");
                            AppMsg::LoginFailed
                        }
                    }
                });
            }
            AppMsg::LoggedIn(login) => {
                LocalStorage::set(KEY_LOGIN, &login)
                    .expect("failed saving login info to LocalStorage");
                self.login = Some(login);
                self.fetch_session(ctx);
                self.fetch_bootstrap(ctx);
            }
            AppMsg::LoginFailed => {
                self.status = SessionStatus::Unauthenticated;
            }
            AppMsg::SessionResolved(Some(session)) => {
                let login = self
                    .login
                    .clone()
                    .expect("resolved a session without a login set");
                self.status = SessionStatus::Authenticated(session);
                self.start_feed(&login);
            }
            AppMsg::SessionResolved(None) => {
                LocalStorage::delete(KEY_LOGIN);
                self.login = None;
                self.stop_feed();
                self.status = SessionStatus::Unauthenticated;
            }
            AppMsg::UserLogout => {
                if let Some(login) = self.login.take() {
                    LocalStorage::delete(KEY_LOGIN);
                    spawn_local(api::unauth(login.host, login.token));
                }
                self.stop_feed();
                self.status = SessionStatus::Unauthenticated;
            }
            AppMsg::ReceivedBootstrap(data) => {
                // Session status is settled by fetch_session alone; a
                // degraded payload's null session must not log anyone out
                self.bootstrap = data;
            }
            AppMsg::RouteChanged(route) => {
                self.route = route;
            }
            AppMsg::Navigate(route) => {
                // The hashchange listener echoes this back as RouteChanged
                router::navigate(&route);
            }
            AppMsg::SetModalOpen(open) => {
                self.modal_open = open;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        match &self.status {
            SessionStatus::Loading => html! {
                <div class="loading-screen">{ "Loading..." }</div>
            },
            SessionStatus::Unauthenticated => html! {
                <div class="container">
                    <ui::Login
                        providers={ self.bootstrap.providers.clone() }
                        on_submit={ ctx.link().callback(AppMsg::UserLogin) }
                    />
                </div>
            },
            SessionStatus::Authenticated(session) => {
                let store = self
                    .store
                    .clone()
                    .expect("authenticated without a live store connection");
                let on_logout = ctx.link().callback(|_| AppMsg::UserLogout);
                match self.route {
                    Route::Post(id) => html! {
                        <ui::PostPage
                            id={ Some(id) }
                            {store}
                            session={ session.clone() }
                            trending={ self.bootstrap.trending.clone() }
                            follow={ self.bootstrap.follow.clone() }
                            modal_open={ self.modal_open }
                            on_toggle_modal={ ctx.link().callback(AppMsg::SetModalOpen) }
                            on_back={ ctx.link().callback(|_| AppMsg::Navigate(Route::Home)) }
                            {on_logout}
                        />
                    },
                    Route::Home => html! {
                        <main class="page-layout">
                            <ui::Sidebar
                                username={ session.user.name.clone() }
                                {on_logout}
                            />
                            <div class="page-main">
                                <div class="page-header">{ "Home" }</div>
                                <div class="page-hint">{ "Open a post to see its thread." }</div>
                            </div>
                            <ui::Widgets
                                trending={ self.bootstrap.trending.clone() }
                                follow={ self.bootstrap.follow.clone() }
                            />
                        </main>
                    },
                }
            }
        }
    }
}
