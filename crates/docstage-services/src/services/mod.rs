pub mod auth;
pub mod library;
pub mod tags;
pub mod upload;
