#![forbid(unsafe_code)]
//! Network node for notarychain: boots the genesis ledger, then serves the
//! REST API until the process exits.

use std::sync::Arc;
use notarychain::node::Node;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let node = Arc::new(Node::init()?);
    node.start().await?;
    Ok(())
}
