pub mod api;
pub mod auth;
pub mod client;
pub mod db;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod state;
pub mod validate;
