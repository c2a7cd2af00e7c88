use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRef, FromRequest, FromRequestParts, Request},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
    Json,
};
use tracing::warn;

use super::{jwt::JwtKeys, TOKEN_COOKIE_NAME};
use crate::error::AppError;

/// Identity of the caller, taken from a validated bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).ok_or_else(|| {
            warn!("request without bearer token");
            AppError::MissingToken
        })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.validate_token(&token).map_err(|e| {
            warn!(reason = %e, "rejected token");
            AppError::InvalidToken
        })?;

        let id = claims.user_id().ok_or(AppError::InvalidToken)?;
        Ok(AuthUser {
            id,
            email: claims.email,
        })
    }
}

/// JSON body whose rejections render as [`AppError`] instead of axum's
/// plain-text 4xx.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// The `Authorization` header wins; the cookie is only consulted when the
/// header is absent.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if headers.contains_key(AUTHORIZATION) {
        return extract_header_credential(headers);
    }
    extract_cookie_token(headers)
}

/// Second word of `Authorization`, whatever the scheme. A foreign scheme
/// still counts as a presented credential and fails validation later.
fn extract_header_credential(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.split_whitespace().nth(1).map(str::to_string)
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.trim() == TOKEN_COOKIE_NAME && !val.trim().is_empty() {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for (k, v) in pairs {
            h.append(*k, HeaderValue::from_str(v).unwrap());
        }
        h
    }

    #[test]
    fn bearer_header_is_read() {
        let h = headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&h).as_deref(), Some("abc.def.ghi"));
        let h = headers(&[("authorization", "bearer abc")]);
        assert_eq!(extract_token(&h).as_deref(), Some("abc"));
    }

    #[test]
    fn any_scheme_yields_its_credential() {
        let h = headers(&[("authorization", "Token abc.def.ghi")]);
        assert_eq!(extract_token(&h).as_deref(), Some("abc.def.ghi"));
        let h = headers(&[("authorization", "Basic dXNlcjpwdw==")]);
        assert_eq!(extract_token(&h).as_deref(), Some("dXNlcjpwdw=="));
    }

    #[test]
    fn header_without_second_word_yields_nothing() {
        assert!(extract_token(&headers(&[("authorization", "Bearer   ")])).is_none());
        assert!(extract_token(&headers(&[("authorization", "Bearer")])).is_none());
        assert!(extract_token(&headers(&[("authorization", "abc")])).is_none());
    }

    #[test]
    fn cookie_is_used_without_header() {
        let h = headers(&[("cookie", "theme=dark; authToken=xyz; other=1")]);
        assert_eq!(extract_token(&h).as_deref(), Some("xyz"));
        assert!(extract_token(&headers(&[("cookie", "theme=dark")])).is_none());
    }

    #[test]
    fn header_takes_precedence_over_cookie() {
        let h = headers(&[("authorization", "Bearer from-header"), ("cookie", "authToken=from-cookie")]);
        assert_eq!(extract_token(&h).as_deref(), Some("from-header"));
    }
}
