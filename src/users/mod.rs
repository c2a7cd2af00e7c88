mod memory;
mod repo;
mod repo_types;
mod services;

pub use memory::MemoryUserStore;
pub use repo::{PgUserStore, StoreError, UserStore};
pub use repo_types::User;
pub use services::create_user;
