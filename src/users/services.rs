use anyhow::Context;
use tracing::{info, instrument};

use super::{repo::UserStore, repo_types::User};
use crate::{auth::password::hash_password, error::AppError};

/// Hash `password` off the async workers, then insert. Uniqueness is left
/// to the store so concurrent signups cannot both pass a pre-check.
#[instrument(skip(store, password))]
pub async fn create_user(
    store: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let plain = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("hash task panicked")??;

    let user = store.insert(email, &hash).await?;
    info!(user_id = user.id, "user created");
    Ok(user)
}
