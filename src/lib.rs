pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod network;
pub mod resolver;
pub mod search;
pub mod validation;
