//! Index signing for the Pallet package repository.
//!
//! This crate provides:
//! - Ed25519 key generation and key-file parsing
//! - Detached signing of index control archives
//! - Signature verification

pub mod error;
pub mod key;
pub mod signer;

pub use error::{SignerError, SignerResult};
pub use key::{KeyPair, PublicKey, SecretKey};
pub use signer::{verify_signature, Ed25519Signer, IndexSigner};
