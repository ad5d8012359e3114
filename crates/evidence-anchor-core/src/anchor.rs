//! Evidence anchoring: store the evidence, then commit its address.
//!
//! [`AnchorService`] owns one [`ContentStore`] and one [`Ledger`] and is the
//! only writer to either. Build it once at startup and share it (for
//! example behind an `Arc`); independent instances share no state, which
//! keeps tests isolated.

use crate::error::{AnchorError, Result};
use crate::hash::sha256_hex;
use crate::ledger::Ledger;
use crate::models::{AnchorReceipt, Block, ContentAddress, EvidenceRecord};
use crate::store::memory::InMemoryContentStore;
use crate::store::{ContentStore, ContentStoreExt};

pub struct AnchorService {
    store: Box<dyn ContentStore>,
    ledger: Ledger,
}

impl AnchorService {
    pub fn new(store: Box<dyn ContentStore>, ledger: Ledger) -> Self {
        Self { store, ledger }
    }

    /// Service backed by an in-memory store and a fresh ledger.
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryContentStore::new()), Ledger::new())
    }

    /// Anchor `evidence` and return its address and transaction id.
    ///
    /// Identical evidence always maps to the same `evidence_address`, but
    /// every call appends a new block and so yields a new `transaction_id`.
    pub fn anchor(&self, evidence: &EvidenceRecord) -> Result<AnchorReceipt> {
        let evidence_address = self.store.put(evidence)?;
        let proof = anchoring_proof(evidence);
        let block = self.ledger.append(evidence_address.clone(), proof)?;
        self.check_link(&block)?;

        let transaction_id = Ledger::hash(&block)?;
        Ok(AnchorReceipt {
            evidence_address,
            transaction_id,
            block_index: block.index,
        })
    }

    /// Stored evidence for `address`, or `None` if the store has no such entry.
    pub fn evidence(&self, address: &ContentAddress) -> Result<Option<EvidenceRecord>> {
        self.store.get(address)
    }

    /// True if some block commits `data_hash`.
    pub fn is_anchored(&self, data_hash: &ContentAddress) -> bool {
        self.ledger.query(data_hash)
    }

    /// Re-verify the whole chain.
    pub fn verify(&self) -> Result<()> {
        self.ledger.verify()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    fn check_link(&self, block: &Block) -> Result<()> {
        let previous = self
            .ledger
            .block(block.index - 1)
            .ok_or_else(|| AnchorError::ChainIntegrity {
                index: block.index,
                reason: "predecessor block is missing".to_string(),
            })?;
        let expected = Ledger::hash(&previous)?;
        if block.previous_hash != expected {
            return Err(AnchorError::ChainIntegrity {
                index: block.index,
                reason: format!(
                    "previous_hash {} does not match predecessor hash {}",
                    block.previous_hash, expected
                ),
            });
        }
        Ok(())
    }
}

/// Identifier bound to the query and its submission time.
fn anchoring_proof(evidence: &EvidenceRecord) -> String {
    sha256_hex(format!("{}{}", evidence.query(), evidence.timestamp()).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onion() -> EvidenceRecord {
        EvidenceRecord::new(
            1000.0,
            "price of onion",
            "Rs 20/kg",
            vec!["Agmarknet Portal".to_string()],
        )
    }

    #[test]
    fn end_to_end_onion_price() {
        let service = AnchorService::in_memory();
        let before = service.ledger().len();

        let receipt = service.anchor(&onion()).unwrap();

        assert_eq!(service.ledger().len(), before + 1);
        assert!(receipt.evidence_address.is_digest());
        assert!(receipt.transaction_id.is_digest());
        assert!(service.ledger().query(&receipt.evidence_address));
        assert_eq!(
            service.evidence(&receipt.evidence_address).unwrap(),
            Some(onion())
        );

        let block = service.ledger().block(receipt.block_index).unwrap();
        assert_eq!(Ledger::hash(&block).unwrap(), receipt.transaction_id);
        assert_eq!(block.data_hash, receipt.evidence_address);
    }

    #[test]
    fn same_evidence_twice_same_address_new_transaction() {
        let service = AnchorService::in_memory();
        let before = service.ledger().len();

        let first = service.anchor(&onion()).unwrap();
        let second = service.anchor(&onion()).unwrap();

        assert_eq!(first.evidence_address, second.evidence_address);
        assert_ne!(first.transaction_id, second.transaction_id);
        assert_eq!(service.ledger().len(), before + 2);
        assert_eq!(service.store().len().unwrap(), 1);
        service.verify().unwrap();
    }

    #[test]
    fn proof_is_bound_to_query_and_time() {
        let later = EvidenceRecord::new(1001.0, "price of onion", "Rs 20/kg", vec![]);
        assert_ne!(anchoring_proof(&onion()), anchoring_proof(&later));
        assert_eq!(anchoring_proof(&onion()), anchoring_proof(&onion()));
    }

    #[test]
    fn services_are_independent() {
        let a = AnchorService::in_memory();
        let b = AnchorService::in_memory();
        let receipt = a.anchor(&onion()).unwrap();
        assert!(a.is_anchored(&receipt.evidence_address));
        assert!(!b.is_anchored(&receipt.evidence_address));
        assert_eq!(b.ledger().len(), 1);
    }

    #[test]
    fn unknown_address_is_not_found() {
        let service = AnchorService::in_memory();
        let missing = ContentAddress::from("0".repeat(64));
        assert!(service.evidence(&missing).unwrap().is_none());
        assert!(!service.is_anchored(&missing));
    }
}
