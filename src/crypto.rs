//! Public-key encryption over secp256k1 (ECIES: ECDH, HKDF-SHA256,
//! AES-256-GCM). Keys use the same hex forms wallets print.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use hkdf::Hkdf;
use k256::ecdh::{EphemeralSecret, diffie_hellman};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

/// Fixed identity used by the encryption demo.
pub const DEMO_PRIVATE_KEY: &str =
    "66ddcea898d9ac261eac727fdda2bc024d47db54e66685c0db81471822b6ee3c";
pub const DEMO_MESSAGE: &str = "My name is Satoshi Buterin";

const HKDF_INFO: &[u8] = b"onchain-social/ecies/v1";
const UNCOMPRESSED_LEN: usize = 65;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("malformed ciphertext")]
    MalformedCiphertext,
    #[error("key derivation failed")]
    KeyDerivation,
    #[error("cipher operation failed")]
    Cipher,
    #[error("plaintext is not utf-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Hex-encoded ECIES payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encrypted {
    pub ephem_public_key: String,
    pub nonce: String,
    pub ciphertext: String,
}

impl Encrypted {
    /// Single hex string: ephemeral key ‖ nonce ‖ ciphertext.
    pub fn to_hex_string(&self) -> String {
        format!("{}{}{}", self.ephem_public_key, self.nonce, self.ciphertext)
    }

    pub fn from_hex_string(s: &str) -> Result<Self, CryptoError> {
        let bytes = decode_hex(s)?;
        if bytes.len() < UNCOMPRESSED_LEN + NONCE_LEN + TAG_LEN {
            return Err(CryptoError::MalformedCiphertext);
        }
        let (ephemeral, rest) = bytes.split_at(UNCOMPRESSED_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        Ok(Self {
            ephem_public_key: hex::encode(ephemeral),
            nonce: hex::encode(nonce),
            ciphertext: hex::encode(ciphertext),
        })
    }
}

/// Uncompressed public key (64 bytes, no `04` prefix) as hex.
pub fn public_key_from_private(private_key: &str) -> Result<String, CryptoError> {
    let secret = parse_private_key(private_key)?;
    let point = secret.public_key().to_encoded_point(false);
    Ok(hex::encode(&point.as_bytes()[1..]))
}

pub fn encrypt(public_key: &str, plaintext: &str) -> Result<Encrypted, CryptoError> {
    let recipient = parse_public_key(public_key)?;

    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let ephemeral_point = ephemeral.public_key().to_encoded_point(false);
    let shared = ephemeral.diffie_hellman(&recipient);

    let cipher = derive_cipher(shared.raw_secret_bytes(), ephemeral_point.as_bytes())?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| CryptoError::Cipher)?;

    Ok(Encrypted {
        ephem_public_key: hex::encode(ephemeral_point.as_bytes()),
        nonce: hex::encode(nonce),
        ciphertext: hex::encode(ciphertext),
    })
}

pub fn decrypt(private_key: &str, encrypted: &Encrypted) -> Result<String, CryptoError> {
    let secret = parse_private_key(private_key)?;
    let ephemeral_bytes = decode_hex(&encrypted.ephem_public_key)?;
    let ephemeral =
        PublicKey::from_sec1_bytes(&ephemeral_bytes).map_err(|_| CryptoError::InvalidPublicKey)?;

    let nonce = decode_hex(&encrypted.nonce)?;
    if nonce.len() != NONCE_LEN {
        return Err(CryptoError::MalformedCiphertext);
    }
    let ciphertext = decode_hex(&encrypted.ciphertext)?;

    let shared = diffie_hellman(secret.to_nonzero_scalar(), ephemeral.as_affine());
    let cipher = derive_cipher(shared.raw_secret_bytes(), &ephemeral_bytes)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
        .map_err(|_| CryptoError::Cipher)?;

    Ok(String::from_utf8(plaintext)?)
}

#[derive(Debug, Clone)]
pub struct DemoReport {
    pub public_key: String,
    pub encrypted: Encrypted,
    pub decrypted: String,
}

impl DemoReport {
    pub fn succeeded(&self) -> bool {
        self.decrypted == DEMO_MESSAGE
    }
}

/// Encrypts [`DEMO_MESSAGE`] to the demo identity, serializes the payload
/// and decrypts it again.
pub fn run_demo() -> Result<DemoReport, CryptoError> {
    let public_key = public_key_from_private(DEMO_PRIVATE_KEY)?;
    let encrypted = encrypt(&public_key, DEMO_MESSAGE)?;
    // Decrypt from the compact form a wallet would hand back.
    let received = Encrypted::from_hex_string(&encrypted.to_hex_string())?;
    let decrypted = decrypt(DEMO_PRIVATE_KEY, &received)?;
    Ok(DemoReport {
        public_key,
        encrypted,
        decrypted,
    })
}

fn derive_cipher(shared_secret: &[u8], ephemeral_public: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    let hkdf = Hkdf::<Sha256>::new(Some(ephemeral_public), shared_secret);
    let mut key = [0u8; 32];
    hkdf.expand(HKDF_INFO, &mut key)
        .map_err(|_| CryptoError::KeyDerivation)?;
    Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::KeyDerivation)
}

fn parse_private_key(private_key: &str) -> Result<SecretKey, CryptoError> {
    let bytes = decode_hex(private_key)?;
    if bytes.len() != 32 {
        return Err(CryptoError::InvalidPrivateKey);
    }
    SecretKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)
}

fn parse_public_key(public_key: &str) -> Result<PublicKey, CryptoError> {
    let mut bytes = decode_hex(public_key)?;
    if bytes.len() == UNCOMPRESSED_LEN - 1 {
        bytes.insert(0, 0x04);
    }
    PublicKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)
}

fn decode_hex(s: &str) -> Result<Vec<u8>, CryptoError> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(digits)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET_MESSAGE: &str = "My name is Satoshi Buterin";

    #[test]
    fn round_trips_with_fixed_keypair() {
        let public_key = public_key_from_private(DEMO_PRIVATE_KEY).unwrap();
        let encrypted = encrypt(&public_key, SECRET_MESSAGE).unwrap();
        assert_eq!(decrypt(DEMO_PRIVATE_KEY, &encrypted).unwrap(), SECRET_MESSAGE);
    }

    #[test]
    fn demo_succeeds() {
        let report = run_demo().unwrap();
        assert!(report.succeeded());
        assert_eq!(report.decrypted, SECRET_MESSAGE);
    }

    #[test]
    fn public_key_is_uncompressed_without_prefix() {
        let public_key = public_key_from_private(DEMO_PRIVATE_KEY).unwrap();
        assert_eq!(public_key.len(), 128);
        assert_eq!(public_key, public_key_from_private(&format!("0x{DEMO_PRIVATE_KEY}")).unwrap());
        assert!(parse_public_key(&format!("04{public_key}")).is_ok());
    }

    #[test]
    fn each_encryption_uses_fresh_ephemeral_key() {
        let public_key = public_key_from_private(DEMO_PRIVATE_KEY).unwrap();
        let first = encrypt(&public_key, SECRET_MESSAGE).unwrap();
        let second = encrypt(&public_key, SECRET_MESSAGE).unwrap();
        assert_ne!(first.ephem_public_key, second.ephem_public_key);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn wrong_key_fails() {
        let public_key = public_key_from_private(DEMO_PRIVATE_KEY).unwrap();
        let encrypted = encrypt(&public_key, SECRET_MESSAGE).unwrap();
        let other = "0101010101010101010101010101010101010101010101010101010101010101";
        assert!(matches!(decrypt(other, &encrypted), Err(CryptoError::Cipher)));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let public_key = public_key_from_private(DEMO_PRIVATE_KEY).unwrap();
        let mut encrypted = encrypt(&public_key, SECRET_MESSAGE).unwrap();
        let mut bytes = hex::decode(&encrypted.ciphertext).unwrap();
        bytes[0] ^= 0xff;
        encrypted.ciphertext = hex::encode(bytes);
        assert!(decrypt(DEMO_PRIVATE_KEY, &encrypted).is_err());
    }

    #[test]
    fn compact_string_form_decrypts() {
        let public_key = public_key_from_private(DEMO_PRIVATE_KEY).unwrap();
        let encrypted = encrypt(&public_key, SECRET_MESSAGE).unwrap();
        let parsed = Encrypted::from_hex_string(&encrypted.to_hex_string()).unwrap();
        assert_eq!(parsed, encrypted);
        assert!(matches!(
            Encrypted::from_hex_string("abcd"),
            Err(CryptoError::MalformedCiphertext)
        ));
    }

    #[test]
    fn rejects_bad_keys() {
        assert!(matches!(
            public_key_from_private("1234"),
            Err(CryptoError::InvalidPrivateKey)
        ));
        assert!(matches!(
            public_key_from_private(&"0".repeat(64)),
            Err(CryptoError::InvalidPrivateKey)
        ));
        assert!(matches!(encrypt("zz", "x"), Err(CryptoError::Hex(_))));
    }
}
