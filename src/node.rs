use crate::config::{load_config, Config};
use crate::error::ChainError;
use crate::ledger::{Block, Ledger, Record};
use crate::miner::{mine_record, MineControl};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Booting,
    Ready,
}

/// The running service: one ledger shared behind a read/write lock, plus
/// the validated configuration. Mining happens outside the lock; only the
/// final validate-and-append holds it.
pub struct Node {
    pub config: Config,
    pub ledger: Arc<RwLock<Ledger>>,
    pub state: Arc<RwLock<NodeState>>,
    mining_in_flight: Arc<AtomicU64>,
}

impl Node {
    /// Load and validate config, initialize logging, and bootstrap the
    /// genesis ledger. The chain has its tip before this returns, so no
    /// request served afterwards can observe an empty ledger.
    pub fn init() -> Result<Self, ChainError> {
        let config = load_config()?;

        tracing_subscriber::fmt::init();
        info!(
            difficulty = config.chain.difficulty,
            api_port = config.network.api_port,
            "starting notarychain node"
        );

        Ok(Self::with_config(config))
    }

    /// Build a node from an already-validated config. Used by `init` and by
    /// tests that do not read config.toml. The node starts in `Booting`;
    /// `start` marks it `Ready` once the listener is up.
    pub fn with_config(config: Config) -> Self {
        let ledger = Ledger::bootstrap(config.chain.difficulty);
        info!(hash = %ledger.tip().hash, "genesis block created");

        Node {
            config,
            ledger: Arc::new(RwLock::new(ledger)),
            state: Arc::new(RwLock::new(NodeState::Booting)),
            mining_in_flight: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of proof-of-work searches currently running.
    pub fn mining_in_flight(&self) -> u64 {
        self.mining_in_flight.load(Ordering::Relaxed)
    }

    pub async fn mark_ready(&self) {
        let mut state = self.state.write().await;
        *state = NodeState::Ready;
    }

    /// Mine-then-append for one submitted record.
    ///
    /// Snapshots the tip under a read lock, releases it, and runs the nonce
    /// search on the blocking pool so ledger readers are never stalled by
    /// mining. The write lock is taken only for the final
    /// validate-and-append. A candidate that lost the tip to a concurrent
    /// append is rejected; the caller decides whether to resubmit.
    pub async fn submit_record(&self, record: Record) -> Result<Block, ChainError> {
        let tip = self.ledger.read().await.tip().clone();
        let difficulty = self.config.chain.difficulty;
        let control = MineControl::new();

        // The gauge is updated inside the blocking task: once spawned it runs
        // to completion even if this future is dropped mid-await, so the
        // increment and decrement always pair up.
        let in_flight = Arc::clone(&self.mining_in_flight);
        let mined = tokio::task::spawn_blocking(move || {
            in_flight.fetch_add(1, Ordering::SeqCst);
            let result = mine_record(&tip, record, difficulty, &control);
            in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
        .await
        .map_err(|e| ChainError::Mining(e.to_string()))??;

        let mut ledger = self.ledger.write().await;
        match ledger.append(mined.clone()) {
            Ok(()) => {
                info!(index = mined.index, hash = %mined.hash, "block appended");
                Ok(mined)
            }
            Err(e) => {
                warn!(index = mined.index, error = %e, "mined candidate rejected");
                Err(e)
            }
        }
    }

    /// Read-only copy of the whole chain, oldest first.
    pub async fn chain(&self) -> Vec<Block> {
        self.ledger.read().await.snapshot()
    }

    /// Most recent record carrying the given content fingerprint, if any.
    pub async fn lookup_by_fingerprint(&self, fingerprint: &str) -> Option<Record> {
        self.ledger.read().await.find_by_fingerprint(fingerprint)
    }

    /// Mark the node ready and serve the API until the process exits.
    pub async fn start(self: Arc<Self>) -> Result<(), ChainError> {
        let api_port = self.config.network.api_port;
        self.mark_ready().await;
        Self::start_api(self, api_port).await
    }

    #[cfg(feature = "api")]
    async fn start_api(node: Arc<Self>, port: u16) -> Result<(), ChainError> {
        let api_node = std::sync::Arc::new(crate::api::ApiNode::new_shared(node));
        crate::api::run_api_server(api_node, port).await
    }

    #[cfg(not(feature = "api"))]
    async fn start_api(_node: Arc<Self>, _port: u16) -> Result<(), ChainError> {
        Err(ChainError::Config(
            "API feature not enabled in this build".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn test_node(difficulty: u32) -> Node {
        let mut config = Config::default();
        config.chain.difficulty = difficulty;
        Node::with_config(config)
    }

    #[tokio::test]
    async fn test_submit_record_extends_chain() {
        let node = test_node(0);

        let first = node
            .submit_record(Record {
                author: "alice".to_string(),
                fingerprint: "sha256:one".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(first.index, 1);

        let second = node
            .submit_record(Record {
                author: "bob".to_string(),
                fingerprint: "sha256:two".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(second.index, 2);
        assert_eq!(second.prev_hash, first.hash);

        let chain = node.chain().await;
        assert_eq!(chain.len(), 3);
    }

    #[tokio::test]
    async fn test_lookup_after_submit() {
        let node = test_node(0);
        node.submit_record(Record {
            author: "alice".to_string(),
            fingerprint: "sha256:doc".to_string(),
        })
        .await
        .unwrap();

        let found = node.lookup_by_fingerprint("sha256:doc").await.unwrap();
        assert_eq!(found.author, "alice");
        assert!(node.lookup_by_fingerprint("sha256:other").await.is_none());
    }

    #[tokio::test]
    async fn test_node_state_transitions() {
        let node = test_node(0);
        assert_eq!(*node.state.read().await, NodeState::Booting);
        node.mark_ready().await;
        assert_eq!(*node.state.read().await, NodeState::Ready);
    }

    #[tokio::test]
    async fn test_mining_gauge_settles_after_abandoned_submit() {
        let node = test_node(0);

        // Drop the submit future at its first await. The spawned search is
        // detached from it and still runs to completion on the blocking pool.
        let submit = node.submit_record(Record {
            author: "walk-away".to_string(),
            fingerprint: "sha256:abandoned".to_string(),
        });
        let _ = tokio::time::timeout(Duration::ZERO, submit).await;

        let deadline = Instant::now() + Duration::from_secs(5);
        while node.mining_in_flight() != 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(node.mining_in_flight(), 0);
    }
}
