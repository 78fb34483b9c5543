//! Proof-of-work mining: the nonce search that earns a candidate block its
//! place on the chain.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::error::ChainError;
use crate::ledger::{meets_difficulty, Block, Record};

/// Cloneable cancellation handle for an in-flight mining search. The search
/// polls it once per nonce; flipping it makes `mine_record` return
/// `ChainError::MiningCancelled` instead of looping until a winning nonce.
/// A fresh handle never cancels.
#[derive(Debug, Clone, Default)]
pub struct MineControl {
    cancelled: Arc<AtomicBool>,
}

impl MineControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the search to stop at the next nonce boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Exhaustive nonce search on top of `tip` for a block carrying `record`.
///
/// Builds the candidate (next index, linked previous hash, fresh
/// timestamp), then walks nonce values 0, 1, 2, ... in lowercase hex until
/// the fingerprint satisfies the difficulty prefix. Runs at full speed on
/// the calling thread and holds no lock; expected work grows by a factor of
/// 16 per difficulty step, and `control` is the only way out before a
/// winning nonce.
///
/// The returned block is a candidate, not an accepted one: appending it can
/// still fail if another block claimed the tip while this search ran.
pub fn mine_record(
    tip: &Block,
    record: Record,
    difficulty: u32,
    control: &MineControl,
) -> Result<Block, ChainError> {
    let mut candidate = Block::new(tip.index + 1, tip.hash.clone(), difficulty, record);

    let started = Instant::now();
    let mut nonce: u64 = 0;
    loop {
        if control.is_cancelled() {
            return Err(ChainError::MiningCancelled);
        }

        candidate.nonce = format!("{:x}", nonce);
        let hash = candidate.fingerprint();
        if meets_difficulty(&hash, difficulty) {
            candidate.hash = hash;
            debug!(
                index = candidate.index,
                nonce = %candidate.nonce,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "mining search finished"
            );
            return Ok(candidate);
        }

        nonce = nonce.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;

    fn record() -> Record {
        Record {
            author: "alice".to_string(),
            fingerprint: "sha256:abc".to_string(),
        }
    }

    #[test]
    fn test_zero_difficulty_accepts_first_nonce() {
        let ledger = Ledger::bootstrap(0);
        let block = mine_record(ledger.tip(), record(), 0, &MineControl::new()).unwrap();
        assert_eq!(block.nonce, "0");
        assert_eq!(block.hash, block.fingerprint());
    }

    #[test]
    fn test_mined_block_links_to_tip() {
        let ledger = Ledger::bootstrap(0);
        let tip = ledger.tip();
        let block = mine_record(tip, record(), 0, &MineControl::new()).unwrap();
        assert_eq!(block.index, tip.index + 1);
        assert_eq!(block.prev_hash, tip.hash);
        assert_eq!(block.difficulty, 0);
        assert_eq!(block.record, record());
    }

    #[test]
    fn test_mined_hash_meets_difficulty() {
        let ledger = Ledger::bootstrap(2);
        let block = mine_record(ledger.tip(), record(), 2, &MineControl::new()).unwrap();
        assert!(block.hash.starts_with("00"));
        assert!(meets_difficulty(&block.hash, 2));
    }

    #[test]
    fn test_cancelled_control_stops_search() {
        let ledger = Ledger::bootstrap(0);
        let control = MineControl::new();
        control.cancel();

        let result = mine_record(ledger.tip(), record(), 0, &control);
        assert!(matches!(result, Err(ChainError::MiningCancelled)));
    }

    #[test]
    fn test_cancel_reaches_clones() {
        let control = MineControl::new();
        let observer = control.clone();
        assert!(!observer.is_cancelled());
        control.cancel();
        assert!(observer.is_cancelled());
    }
}
