use crate::encoding;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// A queue token signer.
pub trait Signer {
    /// Compute the base64url encoded signature for a token body.
    fn sign(&self, message: &str) -> String;

    /// Check that a signature matches the given token body.
    fn verify(&self, message: &str, signature: &str) -> bool {
        let expected = self.sign(message);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }
}

/// A signer that hashes the token body followed by the secret key using SHA-256.
///
/// This is a plain keyed hash, not an HMAC, so it is open to length extension attacks.
pub struct Sha256Signer<'a> {
    secret_key: &'a str,
}

impl<'a> Sha256Signer<'a> {
    /// Create a new signer for a secret key.
    pub fn new(secret_key: &'a str) -> Self {
        Self { secret_key }
    }
}

impl Signer for Sha256Signer<'_> {
    fn sign(&self, message: &str) -> String {
        let digest = Sha256::new().chain_update(message).chain_update(self.secret_key).finalize();
        encoding::encode(digest)
    }
}
