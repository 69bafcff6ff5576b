pub mod auth;
pub mod broadcast;
pub mod comments;
pub mod extract;
pub mod health;
pub mod profile;
