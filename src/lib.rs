pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatters;
pub mod models;
pub mod protocol;
pub mod server;
pub mod service;
pub mod stream;
pub mod tools;
