// src/lib.rs

//! Update feed library: release ingestion into versioned update records.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
