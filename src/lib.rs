//! Best Hacker News stories, served through a coalescing in-memory cache.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod hackernews;
pub mod logging;
pub mod state;
pub mod stories;
pub mod utils;
pub mod web;
