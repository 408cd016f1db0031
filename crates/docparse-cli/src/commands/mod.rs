pub mod backends;
pub mod config;
pub mod parse;
