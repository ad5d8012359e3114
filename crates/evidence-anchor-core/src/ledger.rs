//! Append-only, hash-linked ledger.
//!
//! Blocks live in a `Vec` addressed by position (block `i` sits at slot
//! `i - 1`) and are never moved, removed, or edited after they are pushed.
//! Every block after genesis stores the content address of its predecessor,
//! so rewriting any historical block breaks the link of the block after it.
//!
//! # Concurrency
//!
//! One `RwLock` guards the chain and its `data_hash` index. [`Ledger::append`]
//! performs "read last block → hash it → assign next index → journal →
//! push" under the write guard, so concurrent appends are serialized and the
//! link/index invariants hold after every call.
//!
//! # Durability
//!
//! A [`LedgerJournal`] may be attached. It is called inside the append
//! critical section before the block becomes visible, so the journal order
//! always matches the chain order and a failed journal write leaves the
//! chain unchanged. [`Ledger::restore`] rebuilds a ledger from journaled
//! blocks after verifying the whole chain.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{AnchorError, Result};
use crate::hash::content_address;
use crate::models::{unix_timestamp, Block, ContentAddress};

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
/// Sentinel `data_hash` of the genesis block.
pub const GENESIS_DATA_HASH: &str = "genesis_hash";
/// `proof` of the genesis block.
pub const GENESIS_PROOF: &str = "1";

/// Durable sink for appended blocks.
pub trait LedgerJournal: Send + Sync {
    /// Persist `block`. Called once per block, in chain order.
    fn record(&self, block: &Block) -> Result<()>;
}

struct Chain {
    blocks: Vec<Block>,
    by_data_hash: HashMap<ContentAddress, Vec<u64>>,
}

impl Chain {
    fn push(&mut self, block: Block) {
        self.by_data_hash
            .entry(block.data_hash.clone())
            .or_default()
            .push(block.index);
        self.blocks.push(block);
    }
}

pub struct Ledger {
    chain: RwLock<Chain>,
    journal: Option<Box<dyn LedgerJournal>>,
}

impl Ledger {
    /// A fresh in-memory ledger holding only the genesis block.
    pub fn new() -> Self {
        let mut chain = Chain {
            blocks: Vec::new(),
            by_data_hash: HashMap::new(),
        };
        chain.push(genesis_block());
        Self {
            chain: RwLock::new(chain),
            journal: None,
        }
    }

    /// Rebuild a ledger from previously journaled blocks.
    ///
    /// An empty `blocks` starts a new chain whose genesis block is written to
    /// `journal`. Otherwise the blocks are verified first and a broken link
    /// is returned as [`AnchorError::ChainIntegrity`].
    pub fn restore(blocks: Vec<Block>, journal: Option<Box<dyn LedgerJournal>>) -> Result<Self> {
        let mut chain = Chain {
            blocks: Vec::with_capacity(blocks.len().max(1)),
            by_data_hash: HashMap::new(),
        };

        if blocks.is_empty() {
            let genesis = genesis_block();
            if let Some(journal) = &journal {
                journal.record(&genesis)?;
            }
            chain.push(genesis);
        } else {
            verify_blocks(&blocks)?;
            for block in blocks {
                chain.push(block);
            }
        }

        Ok(Self {
            chain: RwLock::new(chain),
            journal,
        })
    }

    /// Content address of `block`, used for linking and as transaction id.
    pub fn hash(block: &Block) -> Result<ContentAddress> {
        Ok(content_address(block)?)
    }

    /// Append a block committing `data_hash` and return it.
    pub fn append(&self, data_hash: ContentAddress, proof: String) -> Result<Block> {
        let mut chain = self.chain.write().unwrap_or_else(PoisonError::into_inner);

        let last = chain
            .blocks
            .last()
            .ok_or_else(|| AnchorError::ChainIntegrity {
                index: 0,
                reason: "chain has no genesis block".to_string(),
            })?;
        let previous_hash = Self::hash(last)?;

        let block = Block {
            index: chain.blocks.len() as u64 + 1,
            timestamp: unix_timestamp(),
            proof,
            previous_hash,
            data_hash,
        };

        if let Some(journal) = &self.journal {
            journal.record(&block)?;
        }
        chain.push(block.clone());
        Ok(block)
    }

    /// True if any block commits `data_hash`.
    pub fn query(&self, data_hash: &ContentAddress) -> bool {
        let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner);
        chain.by_data_hash.contains_key(data_hash)
    }

    /// Indices of every block committing `data_hash`, in chain order.
    pub fn blocks_for(&self, data_hash: &ContentAddress) -> Vec<u64> {
        let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner);
        chain
            .by_data_hash
            .get(data_hash)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.chain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .blocks
            .len()
    }

    /// Always false: a ledger holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block at 1-based `index`.
    pub fn block(&self, index: u64) -> Option<Block> {
        let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner);
        let slot = usize::try_from(index).ok()?.checked_sub(1)?;
        chain.blocks.get(slot).cloned()
    }

    pub fn last(&self) -> Option<Block> {
        let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner);
        chain.blocks.last().cloned()
    }

    /// Snapshot of the whole chain.
    pub fn blocks(&self) -> Vec<Block> {
        self.chain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .blocks
            .clone()
    }

    /// Walk the whole chain and check every link and index.
    pub fn verify(&self) -> Result<()> {
        let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner);
        verify_blocks(&chain.blocks)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn genesis_block() -> Block {
    Block {
        index: 1,
        timestamp: unix_timestamp(),
        proof: GENESIS_PROOF.to_string(),
        previous_hash: ContentAddress::from(GENESIS_PREVIOUS_HASH),
        data_hash: ContentAddress::from(GENESIS_DATA_HASH),
    }
}

/// Check that `blocks` form a valid chain starting at genesis.
pub fn verify_blocks(blocks: &[Block]) -> Result<()> {
    let genesis = blocks.first().ok_or_else(|| AnchorError::ChainIntegrity {
        index: 0,
        reason: "chain is empty".to_string(),
    })?;
    if genesis.index != 1 || genesis.previous_hash.as_str() != GENESIS_PREVIOUS_HASH {
        return Err(AnchorError::ChainIntegrity {
            index: genesis.index,
            reason: "first block is not a genesis block".to_string(),
        });
    }

    for pair in blocks.windows(2) {
        let (prev, block) = (&pair[0], &pair[1]);
        if block.index != prev.index + 1 {
            return Err(AnchorError::ChainIntegrity {
                index: block.index,
                reason: format!("index follows {}", prev.index),
            });
        }
        let expected = Ledger::hash(prev)?;
        if block.previous_hash != expected {
            return Err(AnchorError::ChainIntegrity {
                index: block.index,
                reason: format!(
                    "previous_hash {} does not match predecessor hash {}",
                    block.previous_hash, expected
                ),
            });
        }
    }
    Ok(())
}
