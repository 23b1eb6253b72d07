// API routes and handlers

pub mod athletes;
pub mod auth;
pub mod gyms;
pub mod health;
pub mod oauth;
pub mod profile;
pub mod requests;
pub mod routes;
pub mod users;

pub use routes::{create_routes, AppState};
