//! Data models for lab report extraction.

pub mod config;
pub mod metadata;
pub mod record;
pub mod result;
