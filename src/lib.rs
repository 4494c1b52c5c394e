pub mod cli;
pub mod client;
pub mod config;
pub mod data_models;
pub mod detail;
pub mod enumerator;
pub mod error;
pub mod export;
pub mod extractor;
pub mod pacer;
pub mod pipeline;
pub mod progress;
