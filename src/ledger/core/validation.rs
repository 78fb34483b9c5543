use crate::error::ChainError;
use crate::ledger::core::block::{meets_difficulty, Block};

/// Chain-link validation of `candidate` against the current `tip`.
///
/// Checks run in order and short-circuit on the first failure: index
/// continuity, hash linkage, fingerprint integrity, proof-of-work. A
/// candidate mined against a tip that has since been replaced fails the
/// linkage check and must be re-mined.
pub fn validate_link(candidate: &Block, tip: &Block) -> Result<(), ChainError> {
    if tip.index + 1 != candidate.index {
        return Err(ChainError::InvalidBlock(format!(
            "Invalid block index. Expected {}, but got {}.",
            tip.index + 1,
            candidate.index
        )));
    }

    if tip.hash != candidate.prev_hash {
        return Err(ChainError::InvalidBlock(format!(
            "Invalid previous hash. Expected {}, but got {}.",
            tip.hash, candidate.prev_hash
        )));
    }

    if candidate.fingerprint() != candidate.hash {
        return Err(ChainError::InvalidBlock(
            "Block hash does not match the block contents.".to_string(),
        ));
    }

    // The difficulty prefix is re-checked here rather than trusted from
    // mining time.
    if !meets_difficulty(&candidate.hash, candidate.difficulty) {
        return Err(ChainError::InvalidProofOfWork);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::core::block::Record;
    use crate::ledger::core::chain::Ledger;
    use crate::miner::{mine_record, MineControl};

    fn record(author: &str, fingerprint: &str) -> Record {
        Record {
            author: author.to_string(),
            fingerprint: fingerprint.to_string(),
        }
    }

    fn mined_successor(tip: &Block, difficulty: u32) -> Block {
        mine_record(tip, record("alice", "sha256:abc"), difficulty, &MineControl::new())
            .expect("mining with an uncancelled control terminates")
    }

    #[test]
    fn test_accepts_honest_successor() {
        let ledger = Ledger::bootstrap(1);
        let candidate = mined_successor(ledger.tip(), 1);
        assert!(validate_link(&candidate, ledger.tip()).is_ok());
    }

    #[test]
    fn test_rejects_index_gap() {
        let ledger = Ledger::bootstrap(0);
        let mut candidate = mined_successor(ledger.tip(), 0);
        candidate.index += 1;
        let err = validate_link(&candidate, ledger.tip()).unwrap_err();
        assert!(matches!(err, ChainError::InvalidBlock(_)));
        assert!(err.to_string().contains("index"));
    }

    #[test]
    fn test_rejects_broken_linkage() {
        let ledger = Ledger::bootstrap(0);
        let mut candidate = mined_successor(ledger.tip(), 0);
        candidate.prev_hash = "somebody-elses-tip".to_string();
        let err = validate_link(&candidate, ledger.tip()).unwrap_err();
        assert!(err.to_string().contains("previous hash"));
    }

    #[test]
    fn test_rejects_tampered_record() {
        let ledger = Ledger::bootstrap(0);

        let mut candidate = mined_successor(ledger.tip(), 0);
        candidate.record.author = "mallory".to_string();
        let err = validate_link(&candidate, ledger.tip()).unwrap_err();
        assert!(err.to_string().contains("does not match"));

        let mut candidate = mined_successor(ledger.tip(), 0);
        candidate.record.fingerprint = "sha256:swapped".to_string();
        let err = validate_link(&candidate, ledger.tip()).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_rejects_hash_below_declared_difficulty() {
        let ledger = Ledger::bootstrap(0);
        let tip = ledger.tip();

        // Self-consistent candidate whose fingerprint misses its declared
        // difficulty: walk nonces until one hashes without a leading zero.
        let mut candidate = Block::new(tip.index + 1, tip.hash.clone(), 1, record("bob", "x"));
        let mut nonce: u64 = 0;
        loop {
            candidate.nonce = format!("{:x}", nonce);
            let hash = candidate.fingerprint();
            if !hash.starts_with('0') {
                candidate.hash = hash;
                break;
            }
            nonce += 1;
        }

        assert!(matches!(
            validate_link(&candidate, tip),
            Err(ChainError::InvalidProofOfWork)
        ));
    }
}
