use std::{cell::RefCell, rc::Rc};

use chrono::Utc;
use futures::{
    channel::{mpsc, oneshot},
    pin_mut, select, FutureExt, SinkExt, StreamExt,
};
use weconnect_client::{
    api::{AuthToken, BootstrapData, FeedMessage, NewSession, Session, StoreRequest, Time, Uuid},
    FeedRouter,
};
use ws_stream_wasm::{WsMessage, WsMeta};

use crate::LoginInfo;

// Pings will be sent every PING_INTERVAL
const PING_INTERVAL_SECS: i64 = 10;
// If the interval between two pongs is more than DISCONNECT_INTERVAL, disconnect
const DISCONNECT_INTERVAL_SECS: i64 = 20;
// Space each reconnect attempt by ATTEMPT_SPACING
const ATTEMPT_SPACING_SECS: i64 = 1;

pub async fn auth(host: String, session: NewSession) -> anyhow::Result<AuthToken> {
    Ok(crate::CLIENT
        .post(format!("{}/api/auth", host))
        .json(&session)
        .send()
        .await?
        .json()
        .await?)
}

pub async fn unauth(host: String, token: AuthToken) {
    let resp = crate::CLIENT
        .post(format!("{}/api/unauth", host))
        .bearer_auth(token.0)
        .send()
        .await;
    match resp {
        Err(e) => tracing::error!("failed to unauth: {:?}", e),
        Ok(resp) if !resp.status().is_success() => {
            tracing::error!("failed to unauth: response is not success {:?}", resp)
        }
        Ok(_) => (),
    }
}

pub async fn fetch_session(login: &LoginInfo) -> anyhow::Result<Option<Session>> {
    Ok(crate::CLIENT
        .get(format!("{}/api/session", login.host))
        .bearer_auth(login.token.0)
        .send()
        .await?
        .json()
        .await?)
}

pub async fn fetch_bootstrap(
    host: &str,
    token: Option<AuthToken>,
) -> anyhow::Result<BootstrapData> {
    let mut req = crate::CLIENT.get(format!("{}/api/bootstrap", host));
    if let Some(token) = token {
        req = req.bearer_auth(token.0);
    }
    Ok(req.send().await?.json().await?)
}

async fn sleep_for(d: chrono::Duration) {
    wasm_timer::Delay::new(d.to_std().unwrap_or(std::time::Duration::from_secs(0)))
        .await
        .expect("failed sleeping")
}

async fn sleep_until(t: Time) {
    sleep_for(t - Utc::now()).await
}

/// Owns the websocket to the document store: relays subscribe/unsubscribe
/// requests out and routes incoming snapshots to their subscription
/// channels. Reconnects on connection loss; queries registered before a
/// drop are not re-registered, so their mirrors go silently stale until the
/// view re-subscribes.
pub async fn start_snapshot_feed(
    login: LoginInfo,
    mut requests: mpsc::UnboundedReceiver<StoreRequest>,
    router: Rc<RefCell<FeedRouter>>,
    mut cancel: oneshot::Sender<()>,
) {
    let mut first_attempt = true;
    'reconnect: loop {
        match first_attempt {
            true => first_attempt = false,
            false => {
                tracing::warn!("lost snapshot feed connection");
                sleep_for(chrono::Duration::seconds(ATTEMPT_SPACING_SECS)).await;
            }
        }

        // Connect to the store feed socket
        let ws_url = format!(
            "ws{}/ws/store-feed",
            login
                .host
                .strip_prefix("http")
                .expect("api host is not an http url")
        );
        let mut sock = match WsMeta::connect(ws_url, None).await {
            Ok((_, s)) => s,
            Err(_) => continue 'reconnect,
        };

        // Authentify
        let mut buf = Uuid::encode_buffer();
        if sock
            .send(WsMessage::Text(
                login.token.0.as_hyphenated().encode_lower(&mut buf).into(),
            ))
            .await
            .is_err()
        {
            continue 'reconnect;
        }
        let res = match sock.next().await {
            Some(r) => r,
            None => continue 'reconnect,
        };
        if res != WsMessage::Text("ok".into()) {
            tracing::error!("snapshot feed refused our credentials");
            return;
        }
        tracing::info!("successfully authenticated to snapshot feed");

        // Run the feed
        let mut next_ping = Utc::now();
        let mut last_pong = Utc::now();
        let mut sock = sock.fuse();
        let mut cancellation = cancel.cancellation().fuse();
        loop {
            let delay_pong_reception =
                sleep_until(last_pong + chrono::Duration::seconds(DISCONNECT_INTERVAL_SECS)).fuse();
            let delay_ping_send = sleep_until(next_ping).fuse();
            pin_mut!(delay_ping_send, delay_pong_reception);
            select! {
                _ = cancellation => {
                    let _ = sock.into_inner().close().await;
                    tracing::info!("disconnected from snapshot feed");
                    return;
                }
                _ = delay_pong_reception => continue 'reconnect,
                _ = delay_ping_send => {
                    let msg = serde_json::to_string(&StoreRequest::Ping)
                        .expect("serializing ping request");
                    if sock.send(WsMessage::Text(msg)).await.is_err() {
                        continue 'reconnect;
                    }
                    next_ping += chrono::Duration::seconds(PING_INTERVAL_SECS);
                }
                req = requests.next() => {
                    let req = match req {
                        // Every store handle is gone, nothing left to serve
                        None => {
                            let _ = sock.into_inner().close().await;
                            return;
                        }
                        Some(req) => req,
                    };
                    let msg = serde_json::to_string(&req).expect("serializing store request");
                    if sock.send(WsMessage::Text(msg)).await.is_err() {
                        continue 'reconnect;
                    }
                }
                msg = sock.next() => {
                    let msg: FeedMessage = match msg {
                        None => continue 'reconnect,
                        Some(WsMessage::Text(t)) => serde_json::from_str(&t),
                        Some(WsMessage::Binary(b)) => serde_json::from_slice(&b),
                    }.expect("parsing message from snapshot feed");
                    match msg {
                        FeedMessage::Pong => last_pong = Utc::now(),
                        FeedMessage::Snapshot { sub, data } => {
                            router.borrow_mut().deliver(sub, data)
                        }
                    }
                }
            }
        }
    }
}
