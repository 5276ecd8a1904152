use num_bigint::BigInt;

use crate::tss::error::ErrorKind;

/// A protocol participant: an opaque numeric key plus its index within the
/// sorted party set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartyID {
    id: String,
    moniker: String,
    key: BigInt,
    index: usize,
}

impl PartyID {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn moniker(&self) -> &str {
        &self.moniker
    }

    pub fn key(&self) -> &BigInt {
        &self.key
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Parties in canonical order. The order is derived by sorting the raw keys,
/// never by arrival order, so every honest party assigns identical indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortedPartyIDs(Vec<PartyID>);

impl SortedPartyIDs {
    /// Sorts raw keys into the canonical party set. Duplicate keys are
    /// rejected: two parties sharing a key could not be told apart.
    pub fn from_keys(keys: &[BigInt]) -> Result<Self, ErrorKind> {
        if keys.len() < 2 {
            return Err(ErrorKind::MissingParameter("at least two parties"));
        }
        let mut sorted = keys.to_vec();
        sorted.sort();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(ErrorKind::MalformedMessage("duplicate party key".into()));
        }
        let ids = sorted
            .into_iter()
            .enumerate()
            .map(|(index, key)| PartyID {
                id: index.to_string(),
                moniker: format!("m_{}", index),
                key,
                index,
            })
            .collect();
        Ok(SortedPartyIDs(ids))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PartyID> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartyID> {
        self.0.iter()
    }

    pub fn keys(&self) -> Vec<BigInt> {
        self.0.iter().map(|p| p.key.clone()).collect()
    }
}
