// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Signing round 3: aggregate nonce points, produce the partial signature.
//!
//! After verifying every counterpart's log proof, each received `R_j` has
//! its small-order component cleared before aggregation. The EdDSA
//! challenge is the wide reduction of `SHA-512(R || A || M)`, the curve's
//! standard rule rather than keygen's rejection sampling, and the
//! partial signature is `s_i = lambda * x_i + k_i`.

use log::{error, info};
use sha2::{Digest, Sha512};

use crate::crypto::{curve, logproof};
use crate::eddsa::signing::message::{self, SigningPayload, SignRound3Message};
use crate::eddsa::signing::SigningSession;
use crate::tss::error::{ErrorKind, TssError};

impl SigningSession {
    pub fn round3_exec(&mut self) -> Result<Vec<u8>, TssError> {
        self.stage.begin(3).map_err(|k| self.error(3, k))?;

        let i = self.params.party_index();
        info!("party {}: signing round 3 start", i);

        let k = self
            .temp
            .k
            .clone()
            .ok_or_else(|| self.error(3, ErrorKind::MissingParameter("nonce share")))?;
        let ped_i = self.keys.ring_pedersen_pks[i]
            .clone()
            .ok_or_else(|| self.error(3, ErrorKind::MissingParameter("own ring-Pedersen parameters")))?;

        let mut big_r = curve::scalar_base_mult(&k);

        for j in 0..self.params.party_count() {
            if j == i {
                continue;
            }
            let bytes = self
                .temp
                .round2_messages
                .get(j)
                .map_err(|k| self.error(3, k))?
                .to_vec();
            let envelope = message::decode(&bytes).map_err(|k| self.error_from(3, k, j))?;
            let r2_msg = message::expect_round2(&envelope).map_err(|k| self.error_from(3, k, j))?;

            let big_r_j = curve::decompress(&r2_msg.big_r).ok_or_else(|| {
                self.error_from(
                    3,
                    ErrorKind::MalformedMessage("R_j is not a curve point".into()),
                    j,
                )
            })?;
            let log_proof = logproof::LogProof::from_bytes(&r2_msg.log_proof)
                .map_err(|e| self.error_from(3, ErrorKind::MalformedMessage(e.to_string()), j))?;

            let k_ciphertext_j = self.temp.k_ciphertexts[j]
                .clone()
                .ok_or_else(|| self.error_from(3, ErrorKind::MissingParameter("nonce ciphertext"), j))?;
            let n_j = self.keys.paillier_pks[j]
                .as_ref()
                .ok_or_else(|| self.error_from(3, ErrorKind::MissingParameter("Paillier key"), j))?
                .n
                .clone();
            let context_j = self.proof_context(j);
            if let Err(e) = logproof::verify(
                &self.proof_config,
                &context_j,
                &k_ciphertext_j,
                &n_j,
                &ped_i,
                &big_r_j,
                &log_proof,
            ) {
                error!("party {}: log proof of party {} rejected: {}", i, j, e);
                return Err(self.error_from(
                    3,
                    ErrorKind::ProofVerificationFailed { proof: "log", party: j },
                    j,
                ));
            }

            big_r += curve::eight_inv_eight(&big_r_j);
        }

        let r_bytes = curve::compress(&big_r);
        let eddsa_pub = self
            .keys
            .eddsa_pub
            .ok_or_else(|| self.error(3, ErrorKind::MissingParameter("combined public key")))?;
        let pub_bytes = curve::compress(&eddsa_pub);

        // lambda = H512(R || A || M), wide-reduced into the scalar field.
        let mut hasher = Sha512::new();
        hasher.update(r_bytes);
        hasher.update(pub_bytes);
        hasher.update(&self.message);
        let mut digest = [0u8; 64];
        digest.copy_from_slice(&hasher.finalize());
        let lambda = curve::scalar_reduce_wide(&digest);

        let priv_xi = self
            .keys
            .priv_xi
            .as_ref()
            .ok_or_else(|| self.error(3, ErrorKind::MissingParameter("private share")))?;
        let x_scalar = curve::scalar_from_bigint(priv_xi);
        let k_scalar = curve::scalar_from_bigint(&k);
        let s_i = lambda * x_scalar + k_scalar;

        self.temp.si = Some(s_i.to_bytes());
        self.temp.r_bytes = Some(r_bytes);

        let envelope = message::new_broadcast(
            i,
            SigningPayload::Round3(SignRound3Message { sigma_share: s_i.to_bytes().to_vec() }),
        );
        let bytes = message::encode(&envelope);
        self.temp
            .round3_messages
            .store_own(i, &bytes)
            .map_err(|k| self.error(3, k))?;
        Ok(bytes)
    }

    pub fn round3_accept(&mut self, from: usize, bytes: &[u8]) -> Result<(), TssError> {
        self.stage.require_open(3).map_err(|k| self.error(3, k))?;

        let envelope = message::decode(bytes).map_err(|k| self.error_from(3, k, from))?;
        message::check_sender(&envelope, from).map_err(|k| self.error_from(3, k, from))?;
        message::expect_round3(&envelope).map_err(|k| self.error_from(3, k, from))?;

        self.temp
            .round3_messages
            .store(from, bytes)
            .map_err(|k| self.error_from(3, k, from))
    }

    pub fn round3_finish(&mut self) -> Result<(), TssError> {
        self.stage.require_open(3).map_err(|k| self.error(3, k))?;
        self.temp.round3_messages.finish().map_err(|k| self.error(3, k))?;
        self.stage.complete(3).map_err(|k| self.error(3, k))
    }
}
