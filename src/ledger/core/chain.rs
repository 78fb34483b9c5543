use tracing::debug;

use crate::error::ChainError;
use crate::ledger::core::block::{Block, Record};
use crate::ledger::core::validation::validate_link;

/// The append-only block sequence.
///
/// Owns its blocks outright; `append` is the only mutation entry point, so
/// holding `&mut Ledger` (in practice, a write lock) makes the
/// validate-then-push step atomic with respect to every other append.
/// There is no global instance; callers share a `Ledger` explicitly.
pub struct Ledger {
    blocks: Vec<Block>,
    difficulty: u32,
}

impl Ledger {
    /// Create a ledger holding only the genesis block: index 0, an empty
    /// record, empty previous hash and nonce, no proof-of-work. Trusted by
    /// construction, but its `hash` is still the real fingerprint of its
    /// fields so integrity checks hold from the first link onward.
    pub fn bootstrap(difficulty: u32) -> Self {
        let mut genesis = Block::new(0, String::new(), difficulty, Record::default());
        genesis.hash = genesis.fingerprint();
        debug!(hash = %genesis.hash, "genesis block created");

        Ledger {
            blocks: vec![genesis],
            difficulty,
        }
    }

    /// Validate `candidate` against the current tip and append it. On
    /// success the candidate becomes the new tip; on rejection the ledger
    /// is unchanged and the caller may re-mine against the tip it lost to.
    pub fn append(&mut self, candidate: Block) -> Result<(), ChainError> {
        validate_link(&candidate, self.tip())?;
        self.blocks.push(candidate);
        Ok(())
    }

    /// The most recently accepted block. Never absent: `bootstrap` seeds
    /// the genesis block before the ledger is shared.
    pub fn tip(&self) -> &Block {
        self.blocks
            .last()
            .expect("ledger holds at least the genesis block")
    }

    /// Scan from newest to oldest for a record carrying the given content
    /// fingerprint, so duplicate submissions resolve to the most recent
    /// one. Linear; this is a convenience query, not an indexed path.
    pub fn find_by_fingerprint(&self, fingerprint: &str) -> Option<Record> {
        self.blocks
            .iter()
            .rev()
            .find(|block| block.record.fingerprint == fingerprint)
            .map(|block| block.record.clone())
    }

    /// Ordered read-only copy of the whole chain, oldest first.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    /// Index of the tip block.
    pub fn height(&self) -> u64 {
        self.tip().index
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The leading-zero count every mined block must satisfy.
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }
}
