//! Core data models for the anchoring pipeline.
//!
//! These types describe the evidence being anchored, the blocks of the
//! ledger that commit it, and the receipt handed back to callers.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Current wall-clock time as fractional seconds since the Unix epoch.
pub fn unix_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Deterministic digest of a canonically serialized object.
///
/// Addresses produced by hashing are 64 lowercase hex characters. The ledger
/// also stores two sentinels in this slot: `"0"` as the genesis block's
/// `previous_hash` and `"genesis_hash"` as its `data_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentAddress(String);

impl ContentAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this is a well-formed SHA-256 hex digest rather than a
    /// sentinel or arbitrary caller input.
    pub fn is_digest(&self) -> bool {
        self.0.len() == DIGEST_HEX_LEN
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ContentAddress {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A question/answer pair together with the sources it was derived from.
///
/// Fields are read-only after construction so that an address computed from
/// a record always describes the record a caller still holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    timestamp: f64,
    query: String,
    answer: String,
    sources: Vec<String>,
}

impl EvidenceRecord {
    pub fn new(
        timestamp: f64,
        query: impl Into<String>,
        answer: impl Into<String>,
        sources: Vec<String>,
    ) -> Self {
        Self {
            timestamp,
            query: query.into(),
            answer: answer.into(),
            sources,
        }
    }

    /// Build a record stamped with the current time.
    pub fn now(query: impl Into<String>, answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self::new(unix_timestamp(), query, answer, sources)
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

/// One committed entry of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain.
    pub index: u64,
    pub timestamp: f64,
    /// Identifier bound to the anchoring event that produced this block.
    pub proof: String,
    /// Address of the predecessor block, or `"0"` for genesis.
    pub previous_hash: ContentAddress,
    /// Address of the anchored content.
    pub data_hash: ContentAddress,
}

/// Result of anchoring one evidence record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    /// Content address of the evidence in the store.
    pub evidence_address: ContentAddress,
    /// Address of the block that committed it.
    pub transaction_id: ContentAddress,
    pub block_index: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_detection() {
        let digest = ContentAddress::from("a".repeat(64));
        assert!(digest.is_digest());
        assert!(!ContentAddress::from("0").is_digest());
        assert!(!ContentAddress::from("genesis_hash").is_digest());
        assert!(!ContentAddress::from("../".repeat(22)).is_digest());
        assert!(!ContentAddress::from("A".repeat(64)).is_digest());
    }

    #[test]
    fn evidence_serializes_all_fields() {
        let record = EvidenceRecord::new(
            1000.0,
            "price of onion",
            "Rs 20/kg",
            vec!["Agmarknet Portal".to_string()],
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timestamp"], 1000.0);
        assert_eq!(json["query"], "price of onion");
        assert_eq!(json["answer"], "Rs 20/kg");
        assert_eq!(json["sources"][0], "Agmarknet Portal");
    }
}
