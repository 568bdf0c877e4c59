//! vcompress - multi-resolution video compression
//!
//! This library crate exposes the application layer for integration testing.

pub mod app;
pub mod config;
