// src/handlers/mod.rs

pub mod assembly;
pub mod auth;
pub mod health;
pub mod questions;
pub mod submissions;
pub mod tests;
