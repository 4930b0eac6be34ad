pub mod analytics;
pub mod charts;
pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod events;
pub mod model;
pub mod router;
pub mod session;
pub mod storage;
pub mod web;
