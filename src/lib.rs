pub mod api;
pub mod client;
pub mod config;
pub mod data_models;
pub mod error;
pub mod guard;
pub mod ped;
pub mod qgram_index;
pub mod query_engine;
