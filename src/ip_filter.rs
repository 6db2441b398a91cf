//! IP allow-list middleware.
//!
//! Not strictly necessary when the service runs inside a private network
//! with a firewall, but it adds a layer of safety: every route is guarded,
//! and anything outside the configured networks (or loopback) gets a 403.
//!
//! When the service sits behind a reverse proxy the peer address is the
//! proxy itself, so the `x-forwarded-for` header is consulted first; it can
//! carry multiple comma-separated hops, of which the first is the original
//! client.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ipnet::IpNet;
use serde_json::json;
use tracing::warn;

// ---

/// Networks admitted by the filter. Loopback is always admitted.
#[derive(Debug, Clone)]
pub struct AllowList {
    networks: Vec<IpNet>,
}

impl AllowList {
    pub fn new(networks: Vec<IpNet>) -> Self {
        Self { networks }
    }

    pub fn permits(&self, ip: IpAddr) -> bool {
        ip.is_loopback() || self.networks.iter().any(|net| net.contains(&ip))
    }
}

/// Middleware rejecting requests from addresses outside the allow-list.
pub async fn require_allowed_ip(
    State(allow): State<AllowList>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    let ip = client_ip(request.headers(), peer.ip());

    if !allow.permits(ip) {
        warn!(%ip, "rejected request from non-allow-listed address");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": format!("IP {ip} is not allowed to access this resource")
            })),
        )
            .into_response();
    }

    next.run(request).await
}

/// Resolve the original client address: first `x-forwarded-for` hop if the
/// header is present and parses, otherwise the direct peer address.
fn client_ip(headers: &HeaderMap, peer: IpAddr) -> IpAddr {
    // ---
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse().ok())
        .unwrap_or(peer)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn loopback_is_always_permitted() {
        // ---
        let allow = AllowList::new(Vec::new());
        assert!(allow.permits("127.0.0.1".parse().unwrap()));
        assert!(allow.permits("::1".parse().unwrap()));
        assert!(!allow.permits("192.168.1.5".parse().unwrap()));
    }

    #[test]
    fn configured_network_is_permitted() {
        // ---
        let allow = AllowList::new(vec!["192.168.1.0/24".parse().unwrap()]);
        assert!(allow.permits("192.168.1.5".parse().unwrap()));
        assert!(!allow.permits("192.168.2.5".parse().unwrap()));
    }

    #[test]
    fn forwarded_header_takes_first_hop() {
        // ---
        let peer: IpAddr = "10.0.0.1".parse().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.5, 10.0.0.2"),
        );
        assert_eq!(client_ip(&headers, peer), "192.168.1.5".parse::<IpAddr>().unwrap());

        // Unparseable header falls back to the peer address
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_ip(&headers, peer), peer);

        assert_eq!(client_ip(&HeaderMap::new(), peer), peer);
    }
}
