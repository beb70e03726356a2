pub mod abstract_trait;
pub mod cache;
pub mod config;
pub mod di;
pub mod handler;
pub mod middleware;
pub mod service;
pub mod state;
