// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Signing round 1: encrypt the nonce share.
//!
//! Recomputes the combined public key as a cross-check, samples the nonce
//! share `k_i`, broadcasts its Paillier ciphertext and sends every
//! counterpart a range proof bound to that counterpart's ring-Pedersen
//! parameters, so a disclosed proof cannot be replayed against another
//! verifier.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::traits::Identity;
use log::info;
use num_bigint::BigInt;
use num_traits::Zero;
use rand::rngs::OsRng;

use crate::common::random::get_random_positive_int;
use crate::crypto::{curve, encproof};
use crate::eddsa::signing::message::{
    self, SigningPayload, SignRound1Message1, SignRound1Message2,
};
use crate::eddsa::signing::SigningSession;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::ssid::signing_ssid;

impl SigningSession {
    pub fn round1_exec(&mut self) -> Result<Vec<u8>, TssError> {
        self.stage.begin(1).map_err(|k| self.error(1, k))?;

        let i = self.params.party_index();
        info!("party {}: signing round 1 start", i);

        self.temp.ssid_nonce = BigInt::zero();
        self.temp.ssid = signing_ssid(
            &self.params,
            &self.keys.pub_xj,
            &self.keys.ring_pedersen_pks,
            1,
            &self.temp.ssid_nonce,
        )
        .map_err(|k| self.error(1, k))?;

        // Recompute the combined public key from the shares.
        let mut pk_sum = EdwardsPoint::identity();
        for (j, share) in self.keys.pub_xj.iter().enumerate() {
            let point = share
                .as_ref()
                .ok_or_else(|| self.error_from(1, ErrorKind::MissingParameter("public share"), j))?;
            pk_sum += point;
        }
        if !self.derived {
            if let Some(stored) = self.keys.eddsa_pub {
                if stored != pk_sum {
                    return Err(self.error(
                        1,
                        ErrorKind::Crypto("combined public key does not match save data".into()),
                    ));
                }
            }
        }
        self.keys.eddsa_pub = Some(pk_sum);

        let q = curve::curve_order();
        let k = get_random_positive_int(&mut OsRng, q);
        let paillier_pk = self.keys.paillier_pks[i]
            .as_ref()
            .ok_or_else(|| self.error(1, ErrorKind::MissingParameter("own Paillier key")))?;
        let (k_ciphertext, rho) = paillier_pk
            .encrypt_and_return_randomness(&mut OsRng, &k)
            .map_err(|e| self.error(1, ErrorKind::Crypto(e.to_string())))?;

        let envelope = message::new_broadcast(
            i,
            SigningPayload::Round1Cipher(SignRound1Message1 {
                k_ciphertext: k_ciphertext.to_bytes_be().1,
            }),
        );
        let broadcast_bytes = message::encode(&envelope);
        self.temp
            .round1_cipher_msgs
            .store_own(i, &broadcast_bytes)
            .map_err(|k| self.error(1, k))?;

        let n0 = paillier_pk.n.clone();
        let context_i = self.proof_context(i);
        for j in 0..self.params.party_count() {
            let ped_j = self.keys.ring_pedersen_pks[j].as_ref().ok_or_else(|| {
                self.error_from(1, ErrorKind::MissingParameter("ring-Pedersen parameters"), j)
            })?;
            let proof = encproof::prove(
                &mut OsRng,
                &self.proof_config,
                &context_i,
                &k_ciphertext,
                &n0,
                &k,
                &rho,
                ped_j,
            )
            .map_err(|e| self.error_from(1, ErrorKind::Crypto(e.to_string()), j))?;

            let p2p = message::new_p2p(
                i,
                j,
                SigningPayload::Round1Proof(SignRound1Message2 { enc_proof: proof.to_bytes() }),
            );
            let p2p_bytes = message::encode(&p2p);
            if j == i {
                self.temp
                    .round1_proof_msgs
                    .store_own(i, &p2p_bytes)
                    .map_err(|k| self.error(1, k))?;
            }
            self.temp.send_round1[j] = p2p_bytes;
        }

        self.temp.k = Some(k);
        self.temp.rho = Some(rho);
        self.temp.k_ciphertexts[i] = Some(k_ciphertext);
        Ok(broadcast_bytes)
    }

    /// Per-recipient outbound range proof, available after round 1 exec.
    pub fn round1_message_for(&self, to: usize) -> Result<Vec<u8>, TssError> {
        if to >= self.params.party_count() {
            return Err(self.error(1, ErrorKind::InvalidPartyIndex(to)));
        }
        let bytes = &self.temp.send_round1[to];
        if bytes.is_empty() {
            return Err(self.error(
                1,
                ErrorKind::OutOfOrderRound { round: 1, expected: "this round's exec to have run" },
            ));
        }
        Ok(bytes.clone())
    }

    pub fn round1_accept(&mut self, from: usize, bytes: &[u8]) -> Result<(), TssError> {
        self.stage.require_open(1).map_err(|k| self.error(1, k))?;

        let envelope = message::decode(bytes).map_err(|k| self.error_from(1, k, from))?;
        message::check_sender(&envelope, from).map_err(|k| self.error_from(1, k, from))?;

        match envelope.payload {
            Some(SigningPayload::Round1Cipher(_)) => {
                message::expect_round1_cipher(&envelope)
                    .map_err(|k| self.error_from(1, k, from))?;
                self.temp
                    .round1_cipher_msgs
                    .store(from, bytes)
                    .map_err(|k| self.error_from(1, k, from))
            }
            Some(SigningPayload::Round1Proof(_)) => {
                message::expect_round1_proof(&envelope)
                    .map_err(|k| self.error_from(1, k, from))?;
                message::check_recipient(&envelope, self.params.party_index())
                    .map_err(|k| self.error_from(1, k, from))?;
                self.temp
                    .round1_proof_msgs
                    .store(from, bytes)
                    .map_err(|k| self.error_from(1, k, from))
            }
            _ => Err(self.error_from(
                1,
                ErrorKind::UnexpectedMessageType { expected: "SignRound1Message" },
                from,
            )),
        }
    }

    /// Round 1 finishes only once both the ciphertext and the proof of
    /// every party have been accepted.
    pub fn round1_finish(&mut self) -> Result<(), TssError> {
        self.stage.require_open(1).map_err(|k| self.error(1, k))?;
        self.temp.round1_cipher_msgs.finish().map_err(|k| self.error(1, k))?;
        self.temp.round1_proof_msgs.finish().map_err(|k| self.error(1, k))?;
        self.stage.complete(1).map_err(|k| self.error(1, k))
    }
}
