//! Platform Crate - Technical Infrastructure
//!
//! This crate provides the host-facing foundations of the bill client:
//! - Client configuration (backend URL, API key, page names)
//! - HTTP plumbing for the hosted backend and its error bodies
//! - Local key-value storage (in-memory and JSON file)
//! - Page navigation
//! - Tracing initialization

pub mod backend;
pub mod config;
pub mod navigation;
pub mod storage;
pub mod telemetry;
