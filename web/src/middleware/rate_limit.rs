use crate::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::*;
use std::net::{IpAddr, SocketAddr};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Rejects intake requests from a client that exceeded its request budget.
/// Intended to be given to axum::middleware::from_fn_with_state in the router
pub(crate) async fn limit_intake_requests(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request, &app_state.service_state.config.trusted_proxies);

    if app_state.service_state.rate_limiter.allow(&client) {
        next.run(request).await
    } else {
        debug!("Rate limit exceeded for intake client {client}");
        (StatusCode::TOO_MANY_REQUESTS, "TOO MANY REQUESTS").into_response()
    }
}

/// The socket peer address, or "unknown" without one.
///
/// `X-Forwarded-For` is only consulted when the peer is one of `trusted_proxies`. Hops
/// are walked from the right and the first address that is not a trusted proxy is the
/// client; everything left of it was written by the client and is ignored.
fn client_key(request: &Request, trusted_proxies: &[IpAddr]) -> String {
    let Some(peer) = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
    else {
        return "unknown".to_string();
    };

    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let forwarded = request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    for hop in forwarded.rsplit(',').map(str::trim) {
        match hop.parse::<IpAddr>() {
            Ok(addr) if trusted_proxies.contains(&addr) => continue,
            Ok(addr) => return addr.to_string(),
            Err(_) => {
                debug!("Unparseable X-Forwarded-For hop from proxy {peer}");
                break;
            }
        }
    }

    peer.to_string()
}
