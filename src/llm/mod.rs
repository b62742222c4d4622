pub mod chat;
pub mod extract;
pub mod summarize;
