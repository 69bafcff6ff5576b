pub mod accounts;
pub mod auth;
pub mod broadcast;
pub mod comments;
pub mod config;
pub mod identity;
pub mod lifecycle;
pub mod nickname;
pub mod regions;
pub mod token;
pub mod withdrawal;

#[cfg(test)]
pub(crate) mod testing;
