use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
        extractors::{AuthUser, JsonBody},
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/register", post(signup))
        .route("/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(get_user))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), AppError> {
    let (token, user) =
        services::signup(state.store.as_ref(), &state.keys, &payload.email, &payload.password)
            .await?;
    let headers = cookie_headers(&state, &token)?;
    Ok((StatusCode::CREATED, headers, Json(auth_response(token, user.into()))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), AppError> {
    let (token, user) =
        services::login(state.store.as_ref(), &state.keys, &payload.email, &payload.password)
            .await?;
    let headers = cookie_headers(&state, &token)?;
    Ok((headers, Json(auth_response(token, user.into()))))
}

#[instrument(skip(state, auth), fields(user_id = auth.id, email = %auth.email))]
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = services::profile(state.store.as_ref(), auth.id).await?;
    Ok(Json(user.into()))
}

fn cookie_headers(state: &AppState, token: &str) -> Result<HeaderMap, AppError> {
    let cookie = services::token_cookie(&state.keys, token, state.config.cookie_secure)?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok(headers)
}

fn auth_response(token: String, user: PublicUser) -> AuthResponse {
    AuthResponse {
        token: format!("Bearer {token}"),
        user,
    }
}
