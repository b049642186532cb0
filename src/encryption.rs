use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::Md5;
use sha2::{Digest, Sha256};

type Aes256CbcEncryptor = cbc::Encryptor<Aes256>;
type Aes256CbcDecryptor = cbc::Decryptor<Aes256>;

const BLOCK_SIZE: usize = 16;

/// The cipher used to encrypt a token payload.
///
/// The key is the SHA-256 digest of the secret key and the IV is the MD5 digest of the token
/// identifier, so every token gets its own IV without having to carry it in the token.
#[derive(Clone)]
pub struct PayloadCipher {
    key: [u8; 32],
    iv: [u8; 16],
}

impl PayloadCipher {
    /// Construct a cipher for the given secret key and token identifier.
    pub fn new(secret_key: &str, token_identifier: &str) -> Self {
        let key = Sha256::digest(secret_key).into();
        let iv = Md5::digest(token_identifier).into();
        Self { key, iv }
    }

    /// Encrypt a payload using AES-256 in CBC mode with PKCS#7 padding.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        Aes256CbcEncryptor::new(&self.key.into(), &self.iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    /// Decrypt a payload that was encrypted via [`PayloadCipher::encrypt`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, DecryptError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(DecryptError::BlockAlignment(ciphertext.len()));
        }
        Aes256CbcDecryptor::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| DecryptError::Padding)
    }
}

/// An error when decrypting a payload.
#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
    #[error("ciphertext length {0} is not a multiple of the block size")]
    BlockAlignment(usize),

    #[error("invalid padding")]
    Padding,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding;

    const SECRET_KEY: &str = "5ebbf794-1665-4d48-80d6-21ac34be7faedf9e10b3-551a-4682-bb77-fee59d6355d6";
    const TOKEN_IDENTIFIER: &str = "a21d423a-43fd-4821-84fa-4390f6a2fd3e";
    const PAYLOAD: &str = r#"{"r":0.45678663514,"k":"somekey","cd":{"color":"blue","size":"medium"}}"#;
    const ENCRYPTED_PAYLOAD: &str =
        "0rDlI69F1Dx4Twps5qD4cQrbXbCRiezBd6fH1PVm6CnVY456FALkAhN3rgVrh_PGCJHcEXN5zoqFg65MH8WZc_CQdD63hJre3Sedu0-9zIs";

    #[test]
    fn known_ciphertext() {
        let cipher = PayloadCipher::new(SECRET_KEY, TOKEN_IDENTIFIER);
        let encrypted = cipher.encrypt(PAYLOAD.as_bytes());
        assert_eq!(encoding::encode(&encrypted), ENCRYPTED_PAYLOAD);

        let decrypted = cipher.decrypt(&encrypted).expect("decrypt failed");
        assert_eq!(decrypted, PAYLOAD.as_bytes());
    }

    #[test]
    fn iv_depends_on_token_identifier() {
        let first = PayloadCipher::new(SECRET_KEY, "first").encrypt(PAYLOAD.as_bytes());
        let second = PayloadCipher::new(SECRET_KEY, "second").encrypt(PAYLOAD.as_bytes());
        assert_ne!(first, second);
    }

    #[test]
    fn empty_plaintext() {
        let cipher = PayloadCipher::new(SECRET_KEY, TOKEN_IDENTIFIER);
        let encrypted = cipher.encrypt(&[]);
        assert_eq!(encrypted.len(), BLOCK_SIZE);
        assert_eq!(cipher.decrypt(&encrypted).expect("decrypt failed"), Vec::<u8>::new());
    }

    #[test]
    fn misaligned_ciphertext() {
        let cipher = PayloadCipher::new(SECRET_KEY, TOKEN_IDENTIFIER);
        let mut encrypted = cipher.encrypt(PAYLOAD.as_bytes());
        encrypted.pop();
        let err = cipher.decrypt(&encrypted).expect_err("decrypt succeeded");
        assert!(matches!(err, DecryptError::BlockAlignment(_)));

        let err = cipher.decrypt(&[]).expect_err("decrypt succeeded");
        assert!(matches!(err, DecryptError::BlockAlignment(0)));
    }

    #[test]
    fn wrong_key() {
        let encrypted = PayloadCipher::new(SECRET_KEY, TOKEN_IDENTIFIER).encrypt(PAYLOAD.as_bytes());
        let decrypted = PayloadCipher::new("other key", TOKEN_IDENTIFIER).decrypt(&encrypted);
        // A wrong key almost always breaks the padding but it can't be guaranteed.
        if let Ok(decrypted) = decrypted {
            assert_ne!(decrypted, PAYLOAD.as_bytes());
        }
    }
}
