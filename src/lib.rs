// src/lib.rs

//! Board Watcher Library
//!
//! Polls a forum board, tracks every thread it has ever listed, and sends a
//! webhook notification for each post not seen before.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
