use num_bigint::BigInt;
use num_traits::One;
use thiserror::Error;

use crate::crypto::curve;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("invalid proof parameters: {0}")]
    InvalidParameters(&'static str),
    #[error("malformed proof encoding: {0}")]
    Malformed(String),
    #[error("proof verification failed: {0}")]
    VerificationFailed(&'static str),
}

/// Range bounds shared by the Paillier-side zero-knowledge proofs.
///
/// Threaded explicitly into every prove / verify call; constructed once per
/// session from the negotiated curve order. Witnesses are bounded by
/// `2^ell` and the masks by `2^(ell + epsilon)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofConfig {
    q: BigInt,
    ell: usize,
    epsilon: usize,
}

impl ProofConfig {
    pub fn new(q: BigInt) -> Self {
        ProofConfig {
            q,
            ell: 256,
            epsilon: 512,
        }
    }

    /// Config for the Ed25519 group order.
    pub fn for_edwards() -> Self {
        Self::new(curve::curve_order().clone())
    }

    pub fn q(&self) -> &BigInt {
        &self.q
    }

    /// `2^ell`, the witness bound.
    pub fn two_pow_ell(&self) -> BigInt {
        BigInt::one() << self.ell
    }

    /// `2^(ell + epsilon)`, the mask bound and the verifier's range check.
    pub fn two_pow_ell_eps(&self) -> BigInt {
        BigInt::one() << (self.ell + self.epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_bound_dominates_challenge_times_witness() {
        let cfg = ProofConfig::for_edwards();
        // |e * k| < q^2 must stay far below 2^(ell + epsilon), otherwise the
        // verifier's range check would reject honest transcripts.
        let q_sq = cfg.q() * cfg.q();
        assert!(q_sq < cfg.two_pow_ell_eps() >> 128);
    }
}
