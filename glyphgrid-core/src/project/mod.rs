pub mod config;
pub mod fonts;
