// src/lib.rs

//! Form autofill engine library

pub mod config;
pub mod document;
pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
