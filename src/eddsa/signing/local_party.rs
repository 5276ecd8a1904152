// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Signing session state.

use num_bigint::BigInt;
use num_traits::Zero;

use crate::crypto::ckd;
use crate::crypto::proof_config::ProofConfig;
use crate::eddsa::keygen::save_data::{build_local_save_data_subset, LocalPartySaveData};
use crate::eddsa::signing::TASK_NAME;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::params::Parameters;
use crate::tss::party_id::SortedPartyIDs;
use crate::tss::round::RoundStage;
use crate::tss::store::MessageStore;

/// Round-scoped data, thrown away once the signature is produced.
pub(crate) struct SigningTempData {
    /// Round 1 broadcast ciphertexts.
    pub(crate) round1_cipher_msgs: MessageStore,
    /// Round 1 point-to-point range proofs addressed to this party.
    pub(crate) round1_proof_msgs: MessageStore,
    pub(crate) round2_messages: MessageStore,
    pub(crate) round3_messages: MessageStore,

    /// Per-recipient outbound payloads for the point-to-point rounds.
    pub(crate) send_round1: Vec<Vec<u8>>,
    pub(crate) send_round2: Vec<Vec<u8>>,

    /// This party's nonce share and its Paillier encryption randomness.
    pub(crate) k: Option<BigInt>,
    pub(crate) rho: Option<BigInt>,
    /// Everyone's nonce ciphertexts, own slot filled during round 1.
    pub(crate) k_ciphertexts: Vec<Option<BigInt>>,

    /// Partial signature scalar and the encoded aggregated nonce point.
    pub(crate) si: Option<[u8; 32]>,
    pub(crate) r_bytes: Option<[u8; 32]>,

    pub(crate) ssid: Vec<u8>,
    pub(crate) ssid_nonce: BigInt,
}

impl SigningTempData {
    fn new(party_count: usize) -> Self {
        SigningTempData {
            round1_cipher_msgs: MessageStore::new(party_count),
            round1_proof_msgs: MessageStore::new(party_count),
            round2_messages: MessageStore::new(party_count),
            round3_messages: MessageStore::new(party_count),
            send_round1: vec![Vec::new(); party_count],
            send_round2: vec![Vec::new(); party_count],
            k: None,
            rho: None,
            k_ciphertexts: vec![None; party_count],
            si: None,
            r_bytes: None,
            ssid: Vec::new(),
            ssid_nonce: BigInt::zero(),
        }
    }
}

/// One party's signing state machine, constructed from immutable keygen
/// save data and driven through the per-round `exec` / `accept` / `finish`
/// calls. Rounds one and two send distinct per-recipient payloads exposed
/// through the `round{1,2}_message_for` getters.
pub struct SigningSession {
    pub(crate) params: Parameters,
    pub(crate) proof_config: ProofConfig,
    pub(crate) keys: LocalPartySaveData,
    pub(crate) temp: SigningTempData,
    pub(crate) message: Vec<u8>,
    pub(crate) derived: bool,
    pub(crate) stage: RoundStage,
}

impl std::fmt::Debug for SigningSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSession")
            .field("derived", &self.derived)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl SigningSession {
    /// Builds a signing session for `party_index` within the signer set
    /// `party_keys`, over the digest `message`.
    ///
    /// The keygen save data is re-indexed for the signer set; when a wallet
    /// derivation path is supplied, the private share and every public
    /// share are replaced by derived child keys (the source data is not
    /// mutated otherwise).
    pub fn new(
        party_index: usize,
        party_keys: &[BigInt],
        message: &[u8],
        key_data: &LocalPartySaveData,
        wallet_path: Option<&str>,
    ) -> Result<Self, TssError> {
        let wrap = |kind: ErrorKind| TssError::new(kind, TASK_NAME, 0, party_index, vec![]);

        if message.is_empty() {
            return Err(wrap(ErrorKind::MalformedMessage("empty message digest".into())));
        }

        let parties = SortedPartyIDs::from_keys(party_keys).map_err(wrap)?;
        let params = Parameters::new(parties, party_index).map_err(wrap)?;
        let party_count = params.party_count();

        let mut keys = build_local_save_data_subset(key_data, params.parties()).map_err(wrap)?;

        let derived = wallet_path.is_some();
        if let Some(path) = wallet_path {
            derive_child_keys(&mut keys, party_index, path).map_err(wrap)?;
        }

        Ok(SigningSession {
            params,
            proof_config: ProofConfig::for_edwards(),
            keys,
            temp: SigningTempData::new(party_count),
            message: message.to_vec(),
            derived,
            stage: RoundStage::new(),
        })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn party_index(&self) -> usize {
        self.params.party_index()
    }

    pub fn is_done(&self) -> bool {
        self.stage.is_done()
    }

    pub(crate) fn error(&self, round: u32, kind: ErrorKind) -> TssError {
        TssError::new(kind, TASK_NAME, round, self.params.party_index(), vec![])
    }

    pub(crate) fn error_from(&self, round: u32, kind: ErrorKind, culprit: usize) -> TssError {
        TssError::new(kind, TASK_NAME, round, self.params.party_index(), vec![culprit])
    }

    /// Proof context for party `j`: the session id followed by the prover's
    /// index, binding every proof to this run and sender.
    pub(crate) fn proof_context(&self, j: usize) -> Vec<u8> {
        let mut context = self.temp.ssid.clone();
        context.extend_from_slice(&BigInt::from(j as u64).to_bytes_be().1);
        context
    }
}

/// Substitutes derived child keys for the signer's share and every public
/// share, per the wallet derivation path. Each party's offset is derived
/// from its own chain code against the combined parent key, so the
/// re-summed child public key stays consistent across parties.
fn derive_child_keys(
    keys: &mut LocalPartySaveData,
    party_index: usize,
    path: &str,
) -> Result<(), ErrorKind> {
    let chain_codes = keys
        .chain_codes
        .as_ref()
        .ok_or(ErrorKind::MissingParameter("chain codes"))?;
    if chain_codes.len() != keys.party_count() {
        return Err(ErrorKind::MalformedMessage("chain code count mismatch".into()));
    }
    let parent_pub = keys
        .eddsa_pub
        .ok_or(ErrorKind::MissingParameter("combined public key"))?;
    let priv_xi = keys
        .priv_xi
        .as_ref()
        .ok_or(ErrorKind::MissingParameter("private share"))?;

    let own_cc = chain_codes[party_index].to_bytes_be().1;
    let (child_priv, _) = ckd::derive_child_private_share(priv_xi, &parent_pub, &own_cc, path)
        .map_err(|e| ErrorKind::Crypto(e.to_string()))?;

    let mut child_pubs = Vec::with_capacity(keys.party_count());
    for (j, share) in keys.pub_xj.iter().enumerate() {
        let share = share.as_ref().ok_or(ErrorKind::MissingParameter("public share"))?;
        let cc = chain_codes[j].to_bytes_be().1;
        let child = ckd::derive_child_public_share(share, &parent_pub, &cc, path)
            .map_err(|e| ErrorKind::Crypto(e.to_string()))?;
        child_pubs.push(Some(child));
    }

    keys.priv_xi = Some(child_priv);
    keys.pub_xj = child_pubs;
    // The combined child key is recomputed from the child shares in round 1.
    keys.eddsa_pub = None;
    Ok(())
}
