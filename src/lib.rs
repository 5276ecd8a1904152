//! n-of-n threshold EdDSA (Ed25519) protocol engine.
//!
//! Two interactive protocols are implemented, each as a session-owned round
//! state machine driven externally through `exec` / `accept` / `finish`
//! calls per round:
//!
//! * [`eddsa::keygen`]: four-round distributed key generation with a
//!   commit-reveal binding and per-party Schnorr knowledge proofs,
//!   producing a combined EdDSA public key and per-party save data.
//! * [`eddsa::signing`]: four-round signing over a message digest using
//!   Paillier-encrypted nonce shares and range / log zero-knowledge proofs,
//!   producing a standard EdDSA signature.
//!
//! Message transport is external: rounds emit wire bytes and consume peer
//! bytes handed in by the caller. The crate never blocks on I/O.

pub mod common;
pub mod crypto;
pub mod eddsa;
pub mod tss;
