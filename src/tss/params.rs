use crate::tss::error::ErrorKind;
use crate::tss::party_id::{PartyID, SortedPartyIDs};

/// Per-session configuration: the sorted party set and this party's place
/// in it. Constructed once per session and threaded into every round.
#[derive(Clone, Debug)]
pub struct Parameters {
    parties: SortedPartyIDs,
    party_index: usize,
}

impl Parameters {
    pub fn new(parties: SortedPartyIDs, party_index: usize) -> Result<Self, ErrorKind> {
        if party_index >= parties.len() {
            return Err(ErrorKind::InvalidPartyIndex(party_index));
        }
        Ok(Parameters { parties, party_index })
    }

    pub fn party_id(&self) -> &PartyID {
        self.parties
            .get(self.party_index)
            .expect("index validated in constructor")
    }

    pub fn party_index(&self) -> usize {
        self.party_index
    }

    pub fn party_count(&self) -> usize {
        self.parties.len()
    }

    pub fn parties(&self) -> &SortedPartyIDs {
        &self.parties
    }
}
