pub mod autosave;
pub mod cli;
pub mod config;
pub mod error;
pub mod file_store;
pub mod print;
pub mod prompt;
pub mod signature_file;
