// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Keygen session state.

use curve25519_dalek::edwards::EdwardsPoint;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use rand::rngs::OsRng;

use crate::common::hash::{sha512_256, sha512_256i_tagged};
use crate::common::hash_utils::rejection_sample;
use crate::crypto::curve;
use crate::crypto::paillier::PAILLIER_MODULUS_BITS;
use crate::eddsa::keygen::save_data::{generate_pre_params, LocalPartySaveData, LocalPreParams};
use crate::eddsa::keygen::TASK_NAME;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::params::Parameters;
use crate::tss::party_id::SortedPartyIDs;
use crate::tss::round::RoundStage;
use crate::tss::store::MessageStore;

/// Round-scoped data, thrown away once keygen completes.
pub(crate) struct KeygenTempData {
    pub(crate) round1_messages: MessageStore,
    pub(crate) round2_messages: MessageStore,
    pub(crate) round3_messages: MessageStore,

    // Schnorr commitment nonce and point.
    pub(crate) tau: Option<BigInt>,
    pub(crate) commited_a: Option<EdwardsPoint>,

    // Commit-reveal seeds: session randomness contribution and blinding.
    pub(crate) srid: Option<Vec<u8>>,
    pub(crate) u: Option<Vec<u8>>,

    pub(crate) ssid: Vec<u8>,
    pub(crate) ssid_nonce: BigInt,

    /// Cached round-1 commitment hashes, one per party.
    pub(crate) vs: Vec<Option<Vec<u8>>>,
    /// Decoded round-2 openings, one per peer.
    pub(crate) payloads: Vec<Option<Round2Payload>>,
}

/// A peer's round-2 opening, decoded once during round 3.
pub(crate) struct Round2Payload {
    pub(crate) srid: Vec<u8>,
    pub(crate) pub_x: EdwardsPoint,
    pub(crate) commited_a: EdwardsPoint,
    pub(crate) u: Vec<u8>,
}

impl KeygenTempData {
    fn new(party_count: usize) -> Self {
        KeygenTempData {
            round1_messages: MessageStore::new(party_count),
            round2_messages: MessageStore::new(party_count),
            round3_messages: MessageStore::new(party_count),
            tau: None,
            commited_a: None,
            srid: None,
            u: None,
            ssid: Vec::new(),
            ssid_nonce: BigInt::zero(),
            vs: vec![None; party_count],
            payloads: (0..party_count).map(|_| None).collect(),
        }
    }
}

/// One party's keygen state machine, owned by the caller and driven through
/// the per-round `exec` / `accept` / `finish` calls.
pub struct KeygenSession {
    pub(crate) params: Parameters,
    pub(crate) temp: KeygenTempData,
    pub(crate) save: LocalPartySaveData,
    pub(crate) pre_params: LocalPreParams,
    pub(crate) stage: RoundStage,
}

impl KeygenSession {
    /// Creates a session for the party at `party_index` within the sorted
    /// set derived from `party_keys`.
    ///
    /// A pre-seeded private share is honored; otherwise round 1 samples one.
    /// Pre-parameters (Paillier key pair plus ring-Pedersen parameters) are
    /// generated at the production modulus size when not supplied.
    pub fn new(
        party_index: usize,
        party_keys: &[BigInt],
        pre_seeded_priv_share: Option<BigInt>,
        pre_params: Option<LocalPreParams>,
    ) -> Result<Self, TssError> {
        let wrap = |kind: ErrorKind| TssError::new(kind, TASK_NAME, 0, party_index, vec![]);

        let parties = SortedPartyIDs::from_keys(party_keys).map_err(wrap)?;
        let params = Parameters::new(parties, party_index).map_err(wrap)?;
        let party_count = params.party_count();

        let pre_params = match pre_params {
            Some(pre) => pre,
            None => generate_pre_params(&mut OsRng, PAILLIER_MODULUS_BITS).map_err(wrap)?,
        };

        let mut save = LocalPartySaveData::new(party_count);
        save.priv_xi = pre_seeded_priv_share;

        Ok(KeygenSession {
            params,
            temp: KeygenTempData::new(party_count),
            save,
            pre_params,
            stage: RoundStage::new(),
        })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn party_index(&self) -> usize {
        self.params.party_index()
    }

    /// The accumulated save data; complete once round 4 has executed.
    pub fn save_data(&self) -> &LocalPartySaveData {
        &self.save
    }

    pub fn is_done(&self) -> bool {
        self.stage.is_done()
    }

    /// Attaches per-party chain codes for later child key derivation. Must
    /// be called before round 4 serializes the save data for the codes to
    /// be part of the persisted blob.
    pub fn save_chain_codes(&mut self, chain_codes: &[BigInt]) -> Result<(), TssError> {
        if chain_codes.len() != self.params.party_count() {
            return Err(self.error(0, ErrorKind::MalformedMessage(format!(
                "chain code count {}, expected {}",
                chain_codes.len(),
                self.params.party_count()
            ))));
        }
        self.save.chain_codes = Some(chain_codes.to_vec());
        Ok(())
    }

    pub(crate) fn error(&self, round: u32, kind: ErrorKind) -> TssError {
        TssError::new(kind, TASK_NAME, round, self.params.party_index(), vec![])
    }

    pub(crate) fn error_from(&self, round: u32, kind: ErrorKind, culprit: usize) -> TssError {
        TssError::new(kind, TASK_NAME, round, self.params.party_index(), vec![culprit])
    }

    /// The commit-reveal hash `V_j = H(ssid, j, srid_j, X_j, A_j, u_j)`.
    pub(crate) fn commitment_hash(
        ssid: &[u8],
        index: usize,
        srid: &[u8],
        pub_x: &EdwardsPoint,
        commited_a: &EdwardsPoint,
        u: &[u8],
    ) -> Vec<u8> {
        sha512_256(&[
            ssid,
            index.to_string().as_bytes(),
            srid,
            &curve::compress(pub_x),
            &curve::compress(commited_a),
            u,
        ])
    }

    /// Fiat-Shamir challenge for party `j`'s Schnorr proof, derived from
    /// the XOR-combined session randomness and rejection-sampled into the
    /// scalar field.
    pub(crate) fn schnorr_challenge(
        &self,
        j: usize,
        pub_x: &EdwardsPoint,
        commited_a: &EdwardsPoint,
    ) -> Result<BigInt, ErrorKind> {
        let srid = self
            .temp
            .srid
            .as_ref()
            .ok_or(ErrorKind::MissingParameter("combined session randomness"))?;
        let mut tag = self.temp.ssid.clone();
        tag.extend_from_slice(srid);

        let j_int = BigInt::from(j as u64);
        let x_int = BigInt::from_bytes_be(Sign::Plus, &curve::compress(pub_x));
        let a_int = BigInt::from_bytes_be(Sign::Plus, &curve::compress(commited_a));
        let e_hash = sha512_256i_tagged(&tag, &[&j_int, &x_int, &a_int]);
        Ok(rejection_sample(curve::curve_order(), &e_hash))
    }
}

#[cfg(test)]
mod tests {
    use curve25519_dalek::traits::Identity;
    use rand::rngs::OsRng;

    use super::*;
    use crate::common::slice::xor;
    use crate::eddsa::keygen::message::{self, KeygenPayload};
    use crate::eddsa::keygen::save_data::generate_pre_params;
    use crate::eddsa::keygen::test_utils::{
        exchange, new_keygen_sessions, run_keygen, run_keygen_rounds, test_party_keys,
        TEST_PAILLIER_BITS,
    };

    #[test]
    fn keygen_produces_identical_combined_key() {
        for n in [2usize, 3] {
            let (sessions, blobs) = run_keygen(n);

            let first_pub = sessions[0].save_data().eddsa_pub.unwrap();
            let mut share_sum = curve25519_dalek::edwards::EdwardsPoint::identity();
            for (i, session) in sessions.iter().enumerate() {
                let data = session.save_data();
                assert_eq!(data.eddsa_pub.unwrap(), first_pub, "party {} disagrees", i);
                assert_eq!(data.ks.len(), n);
                assert_eq!(data.pub_xj.len(), n);
                share_sum += curve::scalar_base_mult(data.priv_xi.as_ref().unwrap());
            }
            // The shares really do add up to the combined key.
            assert_eq!(share_sum, first_pub);

            // Shares are distinct between parties.
            assert_ne!(
                sessions[0].save_data().priv_xi,
                sessions[1].save_data().priv_xi
            );

            // The persisted blob decodes back to the same public state.
            let decoded =
                crate::eddsa::keygen::LocalPartySaveData::from_bytes(&blobs[0]).unwrap();
            assert_eq!(decoded.eddsa_pub.unwrap(), first_pub);
            assert_eq!(decoded.pub_xj, sessions[0].save_data().pub_xj);
        }
    }

    #[test]
    fn party_key_order_does_not_matter() {
        // Each party is handed the raw keys in a different order; the sorted
        // set and therefore the run must come out identical.
        let orders: [[u64; 3]; 3] = [[1007, 1000, 1014], [1014, 1007, 1000], [1000, 1014, 1007]];
        let mut sessions: Vec<KeygenSession> = (0..3)
            .map(|i| {
                let keys: Vec<BigInt> = orders[i].iter().map(|k| BigInt::from(*k)).collect();
                let pre = generate_pre_params(&mut OsRng, TEST_PAILLIER_BITS).unwrap();
                KeygenSession::new(i, &keys, None, Some(pre)).unwrap()
            })
            .collect();
        run_keygen_rounds(&mut sessions);

        let first_pub = sessions[0].save_data().eddsa_pub.unwrap();
        for session in &sessions {
            assert_eq!(session.save_data().eddsa_pub.unwrap(), first_pub);
        }
    }

    #[test]
    fn pre_seeded_private_share_is_honored() {
        let keys = test_party_keys(2);
        let seed = BigInt::from(123456789u64);
        let pre = generate_pre_params(&mut OsRng, TEST_PAILLIER_BITS).unwrap();
        let mut session = KeygenSession::new(0, &keys, Some(seed.clone()), Some(pre)).unwrap();
        session.round1_exec().unwrap();
        assert_eq!(session.save_data().priv_xi.as_ref(), Some(&seed));
    }

    fn tamper_round2(bytes: &[u8], f: impl FnOnce(&mut message::KgRound2Message)) -> Vec<u8> {
        let envelope = message::decode(bytes).unwrap();
        let from = envelope.from as usize;
        let mut msg = match envelope.payload {
            Some(KeygenPayload::Round2(m)) => m,
            _ => panic!("not a round 2 message"),
        };
        f(&mut msg);
        message::encode(&message::new_envelope(from, KeygenPayload::Round2(msg)))
    }

    #[test]
    fn tampered_reveal_fails_commitment_check_on_every_peer() {
        let mut sessions = new_keygen_sessions(3);
        let r1: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round1_exec().unwrap()).collect();
        exchange(&mut sessions, &r1, |s, from, bytes| s.round1_accept(from, bytes).unwrap());
        for s in sessions.iter_mut() {
            s.round1_finish().unwrap();
        }

        let mut r2: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round2_exec().unwrap()).collect();
        // Party 0 changes a committed field after its round-1 commitment.
        r2[0] = tamper_round2(&r2[0], |m| m.srid[0] ^= 0x01);
        exchange(&mut sessions, &r2, |s, from, bytes| s.round2_accept(from, bytes).unwrap());
        for s in sessions.iter_mut() {
            s.round2_finish().unwrap();
        }

        for session in sessions.iter_mut().skip(1) {
            let err = session.round3_exec().unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::CommitmentMismatch(0)), "got {}", err);
            assert!(err.is_fatal());
            assert_eq!(err.culprits(), &[0]);
        }
    }

    #[test]
    fn tampered_ssid_fails_session_binding() {
        let mut sessions = new_keygen_sessions(2);
        let r1: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round1_exec().unwrap()).collect();
        exchange(&mut sessions, &r1, |s, from, bytes| s.round1_accept(from, bytes).unwrap());
        for s in sessions.iter_mut() {
            s.round1_finish().unwrap();
        }

        let mut r2: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round2_exec().unwrap()).collect();
        r2[0] = tamper_round2(&r2[0], |m| m.ssid[0] ^= 0x01);
        exchange(&mut sessions, &r2, |s, from, bytes| s.round2_accept(from, bytes).unwrap());
        for s in sessions.iter_mut() {
            s.round2_finish().unwrap();
        }

        let err = sessions[1].round3_exec().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::SessionIdMismatch(0)), "got {}", err);
    }

    #[test]
    fn tampered_schnorr_proof_fails_round4() {
        let mut sessions = new_keygen_sessions(3);
        let r1: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round1_exec().unwrap()).collect();
        exchange(&mut sessions, &r1, |s, from, bytes| s.round1_accept(from, bytes).unwrap());
        for s in sessions.iter_mut() {
            s.round1_finish().unwrap();
        }
        let r2: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round2_exec().unwrap()).collect();
        exchange(&mut sessions, &r2, |s, from, bytes| s.round2_accept(from, bytes).unwrap());
        for s in sessions.iter_mut() {
            s.round2_finish().unwrap();
        }

        let mut r3: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round3_exec().unwrap()).collect();
        {
            let envelope = message::decode(&r3[0]).unwrap();
            let mut msg = match envelope.payload {
                Some(KeygenPayload::Round3(m)) => m,
                _ => panic!("not a round 3 message"),
            };
            msg.sch_proof[0] ^= 0x01;
            r3[0] = message::encode(&message::new_envelope(0, KeygenPayload::Round3(msg)));
        }
        exchange(&mut sessions, &r3, |s, from, bytes| s.round3_accept(from, bytes).unwrap());
        for s in sessions.iter_mut() {
            s.round3_finish().unwrap();
        }

        for session in sessions.iter_mut().skip(1) {
            let err = session.round4_exec().unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::ProofVerificationFailed { proof: "schnorr", party: 0 }),
                "got {}",
                err
            );
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn redelivery_semantics() {
        let mut sessions = new_keygen_sessions(2);
        let r1: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round1_exec().unwrap()).collect();

        // Identical re-delivery is idempotent.
        sessions[1].round1_accept(0, &r1[0]).unwrap();
        sessions[1].round1_accept(0, &r1[0]).unwrap();

        // A different payload for the same slot is rejected.
        let conflicting = message::encode(&message::new_envelope(
            0,
            KeygenPayload::Round1(message::KgRound1Message { commitment: vec![0xAB; 32] }),
        ));
        let err = sessions[1].round1_accept(0, &conflicting).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ConflictingMessage(0)), "got {}", err);

        // State is unchanged: the round still finishes with the original.
        sessions[1].round1_finish().unwrap();
    }

    #[test]
    fn out_of_range_sender_is_rejected() {
        let mut sessions = new_keygen_sessions(2);
        let r1: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round1_exec().unwrap()).collect();
        let err = sessions[1].round1_accept(5, &r1[0]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedMessage(_)), "got {}", err);
    }

    #[test]
    fn wrong_round_payload_is_rejected() {
        let mut sessions = new_keygen_sessions(2);
        let r1: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round1_exec().unwrap()).collect();
        exchange(&mut sessions, &r1, |s, from, bytes| s.round1_accept(from, bytes).unwrap());
        for s in sessions.iter_mut() {
            s.round1_finish().unwrap();
        }
        let r2: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round2_exec().unwrap()).collect();
        // Round-1 bytes delivered into round 2 must be rejected, not coerced.
        let err = sessions[0].round2_accept(1, &r1[1]).unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::UnexpectedMessageType { expected: "KGRound2Message" }),
            "got {}",
            err
        );
        sessions[0].round2_accept(1, &r2[1]).unwrap();
    }

    #[test]
    fn round_order_is_enforced() {
        let mut sessions = new_keygen_sessions(2);

        // Round 2 cannot start before round 1.
        let err = sessions[0].round2_exec().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::OutOfOrderRound { .. }));

        let r1: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round1_exec().unwrap()).collect();

        // Exec is not re-enterable.
        assert!(sessions[0].round1_exec().is_err());

        // Finish before every sender has been accepted fails.
        let err = sessions[0].round1_finish().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::IncompleteRound(1)), "got {}", err);

        // Round 2 exec before round 1 finish fails.
        let err = sessions[0].round2_exec().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::OutOfOrderRound { .. }));

        sessions[0].round1_accept(1, &r1[1]).unwrap();
        sessions[0].round1_finish().unwrap();
        sessions[1].round1_accept(0, &r1[0]).unwrap();
        sessions[1].round1_finish().unwrap();
    }

    #[test]
    fn combined_srid_is_xor_of_all_contributions() {
        let mut sessions = new_keygen_sessions(3);
        let r1: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round1_exec().unwrap()).collect();

        // Each party's own contribution, captured before the fold.
        let seeds: Vec<Vec<u8>> = sessions
            .iter()
            .map(|s| s.temp.srid.clone().unwrap())
            .collect();

        exchange(&mut sessions, &r1, |s, from, bytes| s.round1_accept(from, bytes).unwrap());
        for s in sessions.iter_mut() {
            s.round1_finish().unwrap();
        }
        let r2: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round2_exec().unwrap()).collect();
        exchange(&mut sessions, &r2, |s, from, bytes| s.round2_accept(from, bytes).unwrap());
        for s in sessions.iter_mut() {
            s.round2_finish().unwrap();
        }
        for s in sessions.iter_mut() {
            s.round3_exec().unwrap();
        }

        let expected = seeds
            .iter()
            .skip(1)
            .fold(seeds[0].clone(), |acc, s| xor(&acc, s));
        for session in &sessions {
            assert_eq!(session.temp.srid.as_ref().unwrap(), &expected);
        }

        // Changing any single contribution changes the aggregate.
        for j in 0..seeds.len() {
            let mut altered = seeds.clone();
            altered[j][0] ^= 0x01;
            let combined = altered
                .iter()
                .skip(1)
                .fold(altered[0].clone(), |acc, s| xor(&acc, s));
            assert_ne!(combined, expected);
        }
    }
}
