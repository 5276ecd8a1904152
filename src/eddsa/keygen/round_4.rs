// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Keygen round 4: finalize.
//!
//! Re-derives every peer's challenge, verifies the Schnorr proofs, sums the
//! public shares into the combined EdDSA public key and serializes the save
//! data. A failed proof is fatal for the session.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::traits::Identity;
use log::{error, info};

use crate::crypto::schnorr;
use crate::eddsa::keygen::message;
use crate::eddsa::keygen::KeygenSession;
use crate::tss::error::{ErrorKind, TssError};

impl KeygenSession {
    /// Terminal round: no accept window, returns the serialized save data.
    pub fn round4_exec(&mut self) -> Result<Vec<u8>, TssError> {
        self.stage.finalize(4).map_err(|k| self.error(4, k))?;

        let i = self.params.party_index();
        info!("party {}: keygen round 4 start", i);

        for j in 0..self.params.party_count() {
            if j == i {
                continue;
            }
            let bytes = self
                .temp
                .round3_messages
                .get(j)
                .map_err(|k| self.error(4, k))?
                .to_vec();
            let envelope = message::decode(&bytes).map_err(|k| self.error_from(4, k, j))?;
            let r3_msg = message::expect_round3(&envelope).map_err(|k| self.error_from(4, k, j))?;

            let payload = self.temp.payloads[j]
                .as_ref()
                .ok_or_else(|| self.error(4, ErrorKind::MissingParameter("round 2 opening")))?;
            let pub_xj = self.save.pub_xj[j]
                .as_ref()
                .ok_or_else(|| self.error(4, ErrorKind::MissingParameter("peer public share")))?;

            let challenge = self
                .schnorr_challenge(j, pub_xj, &payload.commited_a)
                .map_err(|k| self.error(4, k))?;
            if !schnorr::verify(&payload.commited_a, pub_xj, &challenge, &r3_msg.sch_proof_int()) {
                error!("party {}: schnorr proof verification failed for party {}", i, j);
                return Err(self.error_from(
                    4,
                    ErrorKind::ProofVerificationFailed { proof: "schnorr", party: j },
                    j,
                ));
            }
        }

        let mut eddsa_pub = EdwardsPoint::identity();
        for (j, share) in self.save.pub_xj.iter().enumerate() {
            let point = share
                .as_ref()
                .ok_or_else(|| self.error_from(4, ErrorKind::MissingParameter("public share"), j))?;
            eddsa_pub += point;
        }
        self.save.eddsa_pub = Some(eddsa_pub);

        let blob = self.save.to_bytes().map_err(|k| self.error(4, k))?;
        info!("party {}: keygen finished", i);
        Ok(blob)
    }
}
