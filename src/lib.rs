//! # Agent Runner - HTTP front for an agent SDK
//!
//! Exposes a small JSON API that forwards natural-language queries to an
//! agent SDK and returns its results:
//! - `POST /run` executes a query, optionally restricted to a set of tools
//! - `GET /tools` lists the tools the SDK provides
//! - `GET /health` reports service and SDK liveness
//!
//! ## Architecture
//!
//! The SDK is synchronous and slow, so every call goes through a fixed-size
//! worker pool and the request handlers only await its result:
//! ```text
//!   HTTP request → api (schema validation)
//!                    │
//!                    ▼
//!              ┌───────────┐  submit   ┌─────────────┐  blocking  ┌─────┐
//!              │AgentClient│ ────────► │ WorkerPool  │ ─────────► │ SDK │
//!              └───────────┘ ◄──────── │ (MAX_WORKERS)│ ◄───────── └─────┘
//!                   RunResult / Error  └─────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod adapter;
pub mod api;
pub mod app;
pub mod sdk;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Error, Result, Settings};

/// Service version reported by `/` and `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
