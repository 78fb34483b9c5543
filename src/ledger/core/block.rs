use sha2::{Digest, Sha256};

/// A user-submitted payload: who is attesting, and the opaque content
/// fingerprint being attested. The fingerprint is caller-supplied data, never
/// derived here; duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub author: String,
    pub fingerprint: String,
}

/// One admitted, hash-linked ledger entry.
///
/// Wire field names are part of the interoperability contract:
/// `index, timestamp, record{author, fingerprint}, hash, prevHash,
/// difficulty, nonce`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    pub timestamp: String,
    pub record: Record,
    pub hash: String,
    pub prev_hash: String,
    pub difficulty: u32,
    pub nonce: String,
}

impl Block {
    /// Candidate constructor: stamps the admission time and leaves `nonce`
    /// and `hash` empty for the proof-of-work search to fill in.
    pub fn new(index: u64, prev_hash: String, difficulty: u32, record: Record) -> Self {
        Block {
            index,
            timestamp: chrono::Utc::now().to_rfc3339(),
            record,
            hash: String::new(),
            prev_hash,
            difficulty,
            nonce: String::new(),
        }
    }

    /// SHA-256 fingerprint over the canonical fields, as a lowercase hex
    /// string: index (decimal), timestamp, record author, record
    /// fingerprint, previous hash, nonce, concatenated in that fixed order.
    /// The stored `hash` and the `difficulty` are not part of the preimage.
    /// Miner and validator both go through here, so recomputing always
    /// agrees.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.index.to_string());
        hasher.update(&self.timestamp);
        hasher.update(&self.record.author);
        hasher.update(&self.record.fingerprint);
        hasher.update(&self.prev_hash);
        hasher.update(&self.nonce);
        hex::encode(hasher.finalize())
    }
}

/// The sole acceptance criterion for mined blocks: the first `difficulty`
/// characters of the hex fingerprint are all `'0'`. A textual prefix check,
/// deliberately not a numeric target comparison.
///
/// `difficulty` may come from an untrusted block, so the prefix is never
/// materialized. This also keeps the per-nonce check in the mining loop
/// allocation-free.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let prefix_len = difficulty as usize;
    hash.len() >= prefix_len && hash.bytes().take(prefix_len).all(|b| b == b'0')
}
