pub mod config;
pub mod interpret;
pub mod search;
