// src/models/mod.rs

pub mod pagination;
pub mod question;
pub mod submission;
pub mod test_question;
pub mod user;
