//! Identity derivation from Ed25519 keys.
//!
//! An [`Identity`] is the BLAKE3 hash of the 32-byte Ed25519 public key, so
//! the same key always maps to the same principal and the principal reveals
//! nothing beyond the key it was derived from.
//!
//! # Example
//!
//! ```
//! use feed_core::identity::{IdentityKeyPair, derive_identity};
//!
//! let keypair = IdentityKeyPair::generate();
//! let identity = derive_identity(&keypair.public_key());
//!
//! assert_eq!(identity, keypair.identity());
//! assert_eq!(identity.to_string().len(), 64);
//! ```

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use crate::types::Identity;

/// Derive the Identity owned by an Ed25519 public key.
pub fn derive_identity(public_key: &VerifyingKey) -> Identity {
    let hash = blake3::hash(public_key.as_bytes());
    Identity::from_bytes(*hash.as_bytes())
}

/// An Ed25519 signing key together with the Identity it controls.
pub struct IdentityKeyPair {
    signing_key: SigningKey,
}

impl IdentityKeyPair {
    /// Generate a fresh key pair from the OS random source.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a key pair from its 32-byte secret.
    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// The public half of the pair.
    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// The secret key bytes.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// The Identity derived from the public key.
    pub fn identity(&self) -> Identity {
        derive_identity(&self.public_key())
    }
}

impl std::fmt::Debug for IdentityKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityKeyPair")
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}
