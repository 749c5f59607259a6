pub mod auth;
pub mod header;
pub mod health;
pub mod root;
