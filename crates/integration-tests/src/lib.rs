//! Integration tests for Prickly Fig.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p prickly-fig-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_session_lifecycle` - Load, sign-in merge, sign-out reset, restart
//! - `cart_push_coalescing` - Push worker behavior under bursts and failures
//! - `cart_http_sync` - Sync flows over real HTTP against a mock cart API
//!
//! The library half holds the shared [`harness`]: a controllable remote
//! double and a session builder that wires store, sync service and auth
//! channel together the way an application would at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod harness;
