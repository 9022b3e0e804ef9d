//! ittools backend library
//!
//! Stateless token authentication (local accounts and GitHub sign-in) in front
//! of a small tool catalog with per-user favorites.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod db;
pub mod user;
