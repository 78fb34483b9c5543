//! notarychain - An append-only proof-of-work ledger for content fingerprints
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`ledger`] - Block structure, chain-link validation and append logic
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work nonce search with cooperative cancellation
//!
//! ## Integration
//! - [`api`] - REST API server (axum)
//!
//! ## Configuration & Utilities
//! - [`node`] - Service orchestration and shared-ledger concurrency
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod ledger;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
pub mod node;
