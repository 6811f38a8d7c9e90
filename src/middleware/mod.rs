use actix_web::{dev, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::config::Config;
use crate::error::ApiError;

/// Proof that the request came from an address allowed to use the back office.
///
/// Add it as a handler argument, or call [`AdminAccess::verify`] where the
/// requirement depends on the resource.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

/// Client address. The first `X-Forwarded-For` entry is used only when the
/// connecting peer is one of `trusted_proxies`; otherwise it is the peer itself.
pub fn client_ip(req: &HttpRequest, trusted_proxies: &str) -> Option<String> {
    let peer = req.peer_addr().map(|addr| addr.ip().to_string());
    let via_proxy = peer
        .as_deref()
        .map(|peer| trusted_proxies.split(',').any(|proxy| proxy.trim() == peer))
        .unwrap_or(false);
    if !via_proxy {
        return peer;
    }

    req.headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or(peer)
}

/// `*` admits everyone, otherwise `allow_list` is a comma-separated list of addresses.
/// An empty list admits no one.
pub fn ip_allowed(allow_list: &str, ip: Option<&str>) -> bool {
    let allow_list = allow_list.trim();
    if allow_list.is_empty() {
        return false;
    }
    if allow_list == "*" {
        return true;
    }
    match ip {
        Some(ip) => allow_list.split(',').any(|allowed| allowed.trim() == ip),
        None => false,
    }
}

impl AdminAccess {
    pub fn verify(req: &HttpRequest) -> Result<AdminAccess, ApiError> {
        let (allow_list, trusted_proxies) = match req.app_data::<web::Data<Config>>() {
            Some(config) => (config.admin_accept_ip.clone(), config.trusted_proxies.clone()),
            None => {
                log::warn!("No configuration registered. Denying admin request.");
                (String::new(), String::new())
            }
        };

        let ip = client_ip(req, &trusted_proxies);
        if ip_allowed(&allow_list, ip.as_deref()) {
            return Ok(AdminAccess);
        }

        log::warn!(
            "Blocked admin request to {} from {}",
            req.path(),
            ip.as_deref().unwrap_or("an unknown address")
        );
        Err(ApiError::Forbidden(
            "Admin access is not permitted from this address.".to_string(),
        ))
    }
}

impl FromRequest for AdminAccess {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        ready(AdminAccess::verify(req))
    }
}
