//! Client metadata extraction

use std::{
    convert::Infallible,
    net::{IpAddr, SocketAddr},
};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts, Extensions, HeaderMap},
};

use crate::{services::ClientMetadata, state::AppState};

const MAX_USER_AGENT_LENGTH: usize = 512;

impl FromRequestParts<AppState> for ClientMetadata {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip = client_ip(
            &parts.headers,
            peer_addr(&parts.extensions),
            &state.config().server.trusted_proxies,
        );

        Ok(ClientMetadata {
            user_agent: user_agent(&parts.headers),
            ip_address: ip.map(|ip| ip.to_string()),
        })
    }
}

/// Socket peer recorded by `into_make_service_with_connect_info`
pub fn peer_addr(extensions: &Extensions) -> Option<SocketAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(MAX_USER_AGENT_LENGTH).collect())
}

/// Resolve the caller's IP.
///
/// Proxy headers are only honoured when the socket peer is one of
/// `trusted_proxies`. `X-Forwarded-For` is read right to left, skipping
/// trusted hops, so entries prepended by the client are never picked.
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted_proxies: &[IpAddr],
) -> Option<IpAddr> {
    let peer = peer?.ip();
    if !trusted_proxies.contains(&peer) {
        return Some(peer);
    }

    let hops: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    for hop in hops.iter().rev() {
        match hop.parse::<IpAddr>() {
            Ok(ip) if trusted_proxies.contains(&ip) => continue,
            Ok(ip) => return Some(ip),
            Err(_) => return Some(peer),
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .or(Some(peer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn peer(s: &str) -> Option<SocketAddr> {
        Some(SocketAddr::new(ip(s), 5000))
    }

    #[test]
    fn test_untrusted_peer_ignores_proxy_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));

        assert_eq!(
            client_ip(&headers, peer("192.0.2.10"), &[]),
            Some(ip("192.0.2.10"))
        );
        assert_eq!(
            client_ip(&headers, peer("192.0.2.10"), &[ip("10.0.0.1")]),
            Some(ip("192.0.2.10"))
        );
    }

    #[test]
    fn test_trusted_proxy_uses_rightmost_untrusted_hop() {
        let proxies = [ip("10.0.0.1"), ip("10.0.0.2")];
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("6.6.6.6, 203.0.113.7, 10.0.0.2"),
        );

        assert_eq!(
            client_ip(&headers, peer("10.0.0.1"), &proxies),
            Some(ip("203.0.113.7"))
        );
    }

    #[test]
    fn test_trusted_proxy_fallbacks() {
        let proxies = [ip("10.0.0.1")];

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));
        assert_eq!(
            client_ip(&headers, peer("10.0.0.1"), &proxies),
            Some(ip("198.51.100.1"))
        );

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(
            client_ip(&headers, peer("10.0.0.1"), &proxies),
            Some(ip("10.0.0.1"))
        );

        assert_eq!(
            client_ip(&HeaderMap::new(), peer("10.0.0.1"), &proxies),
            Some(ip("10.0.0.1"))
        );
    }

    #[test]
    fn test_no_peer() {
        assert_eq!(client_ip(&HeaderMap::new(), None, &[]), None);
    }
}
