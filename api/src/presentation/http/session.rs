use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, HeaderValue, header, request::Parts};

use crate::application::dto::auth::ClientInfo;
use crate::application::error::{AppError, AppResult};
use crate::bootstrap::config::Config;

pub const SESSION_COOKIE: &str = "session_token";

/// Session token presented by the caller, if any. The `Authorization`
/// header wins over the cookie.
#[derive(Debug, Clone)]
pub struct SessionToken(pub Option<String>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionToken(token_from_headers(&parts.headers)))
    }
}

pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookies| get_cookie(cookies, SESSION_COOKIE))
        .filter(|t| !t.is_empty())
}

/// Like [`token_from_headers`], but a token carried by the cookie is only
/// honoured when the request's `Origin` is on the allow-list.
pub fn authorized_token(cfg: &Config, headers: &HeaderMap) -> AppResult<Option<String>> {
    if let Some(token) = bearer_token(headers) {
        return Ok(Some(token));
    }
    let token = cookie_token(headers);
    if token.is_some() {
        check_origin(cfg, headers)?;
    }
    Ok(token)
}

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

/// Session cookies are always cross-site capable and never script-readable.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; Secure; SameSite=None; Max-Age={}",
        max_age_secs.max(0)
    )
}

pub fn clear_session_cookie() -> String {
    session_cookie("", 0)
}

pub fn cookie_headers(cookie: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}

/// Rejects browser requests from origins outside the allow-list. Requests
/// without an `Origin` header (native clients) pass.
pub fn check_origin(cfg: &Config, headers: &HeaderMap) -> AppResult<()> {
    match headers.get(header::ORIGIN).map(|v| v.to_str()) {
        None => Ok(()),
        Some(Ok(origin)) if cfg.is_origin_allowed(origin) => Ok(()),
        Some(origin) => {
            tracing::warn!(origin = ?origin.ok(), "origin_rejected");
            Err(AppError::Forbidden("invalid origin".into()))
        }
    }
}

pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
        });
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    ClientInfo {
        ip_address,
        user_agent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(k.clone(), HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let h = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "theme=dark; session_token=from-cookie"),
        ]);
        assert_eq!(token_from_headers(&h).as_deref(), Some("from-header"));
    }

    #[test]
    fn cookie_is_found_among_others() {
        let h = headers(&[(header::COOKIE, "theme=dark; session_token=abc123 ; lang=en")]);
        assert_eq!(token_from_headers(&h).as_deref(), Some("abc123"));
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_tokens_answer_to_the_allow_list() {
        let cfg = Config::from_lookup(|key| match key {
            "CORS_ORIGIN" => Some("https://app.example.com".into()),
            _ => None,
        })
        .unwrap();

        let foreign_cookie = headers(&[
            (header::ORIGIN, "https://evil.example"),
            (header::COOKIE, "session_token=abc"),
        ]);
        assert!(matches!(
            authorized_token(&cfg, &foreign_cookie),
            Err(AppError::Forbidden(_))
        ));

        let foreign_bearer = headers(&[
            (header::ORIGIN, "https://evil.example"),
            (header::AUTHORIZATION, "Bearer abc"),
        ]);
        assert_eq!(
            authorized_token(&cfg, &foreign_bearer).unwrap().as_deref(),
            Some("abc")
        );

        let native_cookie = headers(&[(header::COOKIE, "session_token=abc")]);
        assert_eq!(
            authorized_token(&cfg, &native_cookie).unwrap().as_deref(),
            Some("abc")
        );

        let trusted_cookie = headers(&[
            (header::ORIGIN, "https://app.example.com"),
            (header::COOKIE, "session_token=abc"),
        ]);
        assert!(authorized_token(&cfg, &trusted_cookie).is_ok());
        assert_eq!(
            authorized_token(&cfg, &headers(&[(header::ORIGIN, "https://evil.example")]))
                .unwrap(),
            None
        );
    }

    #[test]
    fn cookie_attributes_are_strict() {
        let c = session_cookie("tok", 604800);
        for attr in ["HttpOnly", "Secure", "SameSite=None", "Path=/", "Max-Age=604800"] {
            assert!(c.contains(attr), "{c} lacks {attr}");
        }
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn forwarded_for_picks_the_client_hop() {
        let h = headers(&[
            (header::HeaderName::from_static("x-forwarded-for"), "203.0.113.9, 10.0.0.1"),
            (header::USER_AGENT, "tracker-mobile/1.0"),
        ]);
        let info = client_info(&h);
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(info.user_agent.as_deref(), Some("tracker-mobile/1.0"));
    }
}
