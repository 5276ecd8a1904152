pub mod ckd;
pub mod curve;
pub mod encproof;
pub mod logproof;
pub mod paillier;
pub mod pedersen;
pub mod proof_config;
pub mod schnorr;
