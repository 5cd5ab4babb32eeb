pub mod auth;
pub mod config;
pub mod run;
pub mod sync;
