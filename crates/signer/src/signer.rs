//! Index archive signing and verification.

use crate::error::{SignerError, SignerResult};
use crate::key::{KeyPair, PublicKey};
use ed25519_dalek::Signer as _;
use ed25519_dalek::Verifier;

/// Trait for signing index control archives.
pub trait IndexSigner: Send + Sync + 'static {
    /// Sign raw archive bytes and return the detached signature.
    fn sign(&self, data: &[u8]) -> Vec<u8>;

    /// Get the key name.
    fn key_name(&self) -> &str;

    /// Name of the signature entry embedded in a signed index archive.
    fn signature_entry_name(&self) -> String {
        format!(".SIGN.ED25519.{}.pub", self.key_name())
    }
}

/// An Ed25519-backed index signer.
pub struct Ed25519Signer {
    keypair: KeyPair,
}

impl Ed25519Signer {
    /// Create a new signer from a key pair.
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Create from a key-file secret string.
    pub fn from_secret_key(s: &str) -> SignerResult<Self> {
        let keypair = KeyPair::from_secret_key(s)?;
        Ok(Self::new(keypair))
    }

    /// Generate a new signer with a random key.
    pub fn generate(key_name: impl Into<String>) -> Self {
        Self::new(KeyPair::generate(key_name))
    }

    /// Get the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.keypair.public
    }

    /// Get the key-file public string.
    pub fn public_key_string(&self) -> String {
        self.keypair.to_public_key()
    }
}

impl IndexSigner for Ed25519Signer {
    fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.keypair
            .secret
            .signing_key()
            .sign(data)
            .to_bytes()
            .to_vec()
    }

    fn key_name(&self) -> &str {
        &self.keypair.name
    }
}

/// Verify a detached signature over archive bytes.
pub fn verify_signature(
    data: &[u8],
    signature: &[u8],
    public_key: &PublicKey,
) -> SignerResult<()> {
    let sig_array: [u8; 64] = signature.try_into().map_err(|_| {
        SignerError::InvalidSignature(format!("expected 64 bytes, got {}", signature.len()))
    })?;

    let signature = ed25519_dalek::Signature::from_bytes(&sig_array);

    public_key
        .verifying_key()
        .verify(data, &signature)
        .map_err(|_| SignerError::VerificationFailed)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let signer = Ed25519Signer::generate("alpine-main-1");
        let data = b"control archive bytes";

        let sig = signer.sign(data);
        assert_eq!(sig.len(), 64);
        verify_signature(data, &sig, signer.public_key()).unwrap();
    }

    #[test]
    fn verify_with_wrong_key_fails() {
        let signer1 = Ed25519Signer::generate("key-1");
        let signer2 = Ed25519Signer::generate("key-2");

        let sig = signer1.sign(b"payload");
        let result = verify_signature(b"payload", &sig, signer2.public_key());
        assert!(matches!(result, Err(SignerError::VerificationFailed)));
    }

    #[test]
    fn verify_tampered_data_fails() {
        let signer = Ed25519Signer::generate("key-1");
        let sig = signer.sign(b"payload");
        let result = verify_signature(b"tampered", &sig, signer.public_key());
        assert!(result.is_err());
    }

    #[test]
    fn signature_entry_name_includes_key_name() {
        let signer = Ed25519Signer::generate("alpine-main-1");
        assert_eq!(
            signer.signature_entry_name(),
            ".SIGN.ED25519.alpine-main-1.pub"
        );
    }
}
