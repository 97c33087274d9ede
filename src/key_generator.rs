//! Request fingerprinting for rate limiting.

use std::net::SocketAddr;

use axum::http::{HeaderMap, Method};

/// Strategy for deriving the per-client fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyStrategy {
    /// Client IP + HTTP method + path. The default.
    IpMethodPath,
    /// Value of a request header + method + path, for deployments that key on
    /// an API key or similar instead of the source address.
    Header(String),
}

/// Derives rate limiting fingerprints from request context.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    strategy: KeyStrategy,
}

impl KeyGenerator {
    pub fn new(strategy: KeyStrategy) -> Self {
        Self { strategy }
    }

    /// Fingerprint for one request. Distinct methods and paths count in
    /// separate windows.
    pub fn generate(
        &self,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        method: &Method,
        path: &str,
    ) -> String {
        match &self.strategy {
            KeyStrategy::IpMethodPath => {
                format!("{}:{}:{}", client_ip(headers, peer), method, path)
            }
            KeyStrategy::Header(name) => {
                let value = headers
                    .get(name.as_str())
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                format!("{}:{}:{}", value, method, path)
            }
        }
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(KeyStrategy::IpMethodPath)
    }
}

/// Client address as seen through proxies: first `x-forwarded-for` entry,
/// then `x-real-ip`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                let first_ip = first_ip.trim();
                if !first_ip.is_empty() {
                    return first_ip.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return ip_str.trim().to_string();
        }
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}
