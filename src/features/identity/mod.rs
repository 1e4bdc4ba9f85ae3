pub mod client;
pub mod token_manager;

pub use client::{IdentityAdminClient, ProfileUpdate};
pub use token_manager::IdentityTokenManager;
