// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Signing final round: combine partial signatures and self-verify.
//!
//! The partial scalars are summed modulo the group order, the signature is
//! assembled as `R || s`, and a standard EdDSA verification runs against
//! the combined public key before anything is released. A verification
//! failure here is fatal: it implies an arithmetic fault or an earlier
//! forgery, neither of which a retry can fix.

use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::{Signature, VerifyingKey};
use log::{error, info};

use crate::crypto::curve;
use crate::eddsa::signing::message::{self, SignatureData};
use crate::eddsa::signing::SigningSession;
use crate::tss::error::{ErrorKind, TssError};

impl SigningSession {
    /// Terminal round: no accept window, returns the signature data.
    pub fn final_exec(&mut self) -> Result<SignatureData, TssError> {
        self.stage.finalize(4).map_err(|k| self.error(4, k))?;

        let i = self.params.party_index();
        info!("party {}: signing final round start", i);

        let si = self
            .temp
            .si
            .ok_or_else(|| self.error(4, ErrorKind::MissingParameter("own partial signature")))?;
        let mut sum = Scalar::from_bytes_mod_order(si);

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

            let arr: [u8; 32] = r3_msg.sigma_share[..].try_into().map_err(|_| {
                self.error_from(
                    4,
                    ErrorKind::MalformedMessage("partial signature has wrong length".into()),
                    j,
                )
            })?;
            let s_j = Option::<Scalar>::from(Scalar::from_canonical_bytes(arr)).ok_or_else(|| {
                self.error_from(
                    4,
                    ErrorKind::MalformedMessage("partial signature scalar is non-canonical".into()),
                    j,
                )
            })?;
            sum += s_j;
        }

        let r_bytes = self
            .temp
            .r_bytes
            .ok_or_else(|| self.error(4, ErrorKind::MissingParameter("aggregated nonce point")))?;

        let mut signature = [0u8; 64];
        signature[..32].copy_from_slice(&r_bytes);
        signature[32..].copy_from_slice(&sum.to_bytes());

        let eddsa_pub = self
            .keys
            .eddsa_pub
            .ok_or_else(|| self.error(4, ErrorKind::MissingParameter("combined public key")))?;
        let verifying_key = VerifyingKey::from_bytes(&curve::compress(&eddsa_pub))
            .map_err(|e| self.error(4, ErrorKind::Crypto(e.to_string())))?;
        if verifying_key
            .verify_strict(&self.message, &Signature::from_bytes(&signature))
            .is_err()
        {
            error!("party {}: assembled signature failed verification", i);
            return Err(self.error(4, ErrorKind::SignatureVerificationFailed));
        }

        info!("party {}: signing finished", i);
        Ok(SignatureData {
            signature: signature.to_vec(),
            r: r_bytes.to_vec(),
            s: sum.to_bytes().to_vec(),
            m: self.message.clone(),
        })
    }
}
