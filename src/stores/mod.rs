// src/stores/mod.rs

pub mod assembly_store;
pub mod question_store;
pub mod submission_store;
pub mod test_store;
pub mod user_store;

pub use assembly_store::AssemblyStore;
pub use question_store::QuestionStore;
pub use submission_store::SubmissionStore;
pub use test_store::TestStore;
pub use user_store::UserStore;
