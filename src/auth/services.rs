use anyhow::Context;
use axum::http::HeaderValue;
use tracing::{info, warn};

use super::{jwt::JwtKeys, password::verify_password, TOKEN_COOKIE_NAME};
use crate::{
    error::AppError,
    users::{create_user, User, UserStore},
};

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create the account and hand back a fresh token for it. Any email and
/// password are accepted; only an already-registered email fails.
pub async fn signup(
    store: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<(String, User), AppError> {
    let email = normalize_email(email);
    let user = match create_user(store, &email, password).await {
        Ok(u) => u,
        Err(AppError::DuplicateEmail) => {
            warn!(%email, "email already registered");
            return Err(AppError::DuplicateEmail);
        }
        Err(e) => return Err(e),
    };

    let token = keys.issue_token(user.id, &user.email)?;
    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((token, user))
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<(String, User), AppError> {
    let email = normalize_email(email);

    let Some(user) = store.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::BadCredentials);
    };

    let plain = password.to_owned();
    let stored = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify_password(&plain, &stored))
        .await
        .context("verify task panicked")??;

    if !ok {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(AppError::BadCredentials);
    }

    let token = keys.issue_token(user.id, &user.email)?;
    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok((token, user))
}

pub async fn profile(store: &dyn UserStore, user_id: i64) -> Result<User, AppError> {
    store.find_by_id(user_id).await?.ok_or(AppError::NotFound)
}

/// `HttpOnly` cookie carrying the raw token, alive as long as the token.
pub(crate) fn token_cookie(
    keys: &JwtKeys,
    token: &str,
    secure: bool,
) -> anyhow::Result<HeaderValue> {
    let max_age = keys.ttl().as_secs();
    let mut cookie =
        format!("{TOKEN_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).context("build token cookie")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::JwtConfig, users::MemoryUserStore};

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
            issuer: "test".into(),
            audience: "test".into(),
            ttl_minutes: 60,
        })
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_email("bob"), "bob");
    }

    #[tokio::test]
    async fn signup_then_login_returns_same_user() {
        let store = MemoryUserStore::new();
        let keys = keys();

        let (token, user) = signup(&store, &keys, " Bob@Example.com", "password123")
            .await
            .unwrap();
        assert_eq!(user.email, "bob@example.com");
        assert_eq!(keys.validate_token(&token).unwrap().user_id(), Some(user.id));

        let (_, again) = login(&store, &keys, "bob@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(again.id, user.id);
    }

    #[tokio::test]
    async fn signup_accepts_any_credentials_once() {
        let store = MemoryUserStore::new();
        let keys = keys();
        let (_, user) = signup(&store, &keys, "nope", "pw").await.unwrap();
        assert_eq!(user.email, "nope");
        let (_, again) = login(&store, &keys, "nope", "pw").await.unwrap();
        assert_eq!(again.id, user.id);

        assert!(matches!(
            signup(&store, &keys, "NOPE", "other").await,
            Err(AppError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn login_failures_are_bad_credentials() {
        let store = MemoryUserStore::new();
        let keys = keys();
        signup(&store, &keys, "c@example.com", "password123").await.unwrap();

        assert!(matches!(
            login(&store, &keys, "c@example.com", "wrong-password").await,
            Err(AppError::BadCredentials)
        ));
        assert!(matches!(
            login(&store, &keys, "ghost@example.com", "password123").await,
            Err(AppError::BadCredentials)
        ));
    }

    #[tokio::test]
    async fn profile_of_unknown_user_is_not_found() {
        let store = MemoryUserStore::new();
        assert!(matches!(profile(&store, 7).await, Err(AppError::NotFound)));
    }

    #[test]
    fn cookie_attributes() {
        let keys = keys();
        let c = token_cookie(&keys, "abc", true).unwrap();
        let c = c.to_str().unwrap();
        assert!(c.starts_with("authToken=abc;"));
        assert!(c.contains("HttpOnly"));
        assert!(c.contains("Max-Age=3600"));
        assert!(c.ends_with("; Secure"));

        let c = token_cookie(&keys, "abc", false).unwrap();
        assert!(!c.to_str().unwrap().contains("Secure"));
    }
}
