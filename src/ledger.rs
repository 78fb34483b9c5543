// Thin re-export module: implementation is in `ledger/core.rs` to allow
// progressive decomposition of ledger responsibilities (blocks, validation,
// chain management).

pub mod core;
pub use core::*;
