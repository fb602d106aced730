//! Invoice dashboard backend: validated invoice mutations, credential
//! sign-in, and the HTTP routes exposing them.

pub mod actions;
pub mod auth;
pub mod config;
pub mod db;
pub mod effects;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
pub mod validation;
