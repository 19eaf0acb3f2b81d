//! Domain-separated derivation inputs.
//!
//! The verification code and the site password come from two different
//! KDF inputs under the same salt:
//!
//! ```text
//! verification: master
//! site:         master ‖ \f 䨺 ‖ hostname ‖ \f ꙮ ‖ alphabet
//! ```
//!
//! The alphabet is part of the site input so that switching charsets gives
//! an unrelated bit stream rather than a re-rendering of the same one.

use secrecy::{ExposeSecret, SecretString};
use sitepass_core::Alphabet;
use zeroize::Zeroizing;

/// Separates the master password from the hostname.
pub const HOST_MARKER: &str = "\u{000C}\u{4A3A}";

/// Separates the hostname from the serialized alphabet.
pub const ALPHABET_MARKER: &str = "\u{000C}\u{A66E}";

/// KDF input for the verification code: the master password alone.
pub fn verification_secret(master: &SecretString) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(master.expose_secret().as_bytes().to_vec())
}

/// KDF input for a site password.
pub fn site_secret(
    master: &SecretString,
    hostname: &str,
    alphabet: &Alphabet,
) -> Zeroizing<Vec<u8>> {
    let alphabet = alphabet.serialized();
    let master = master.expose_secret().as_bytes();

    let mut buf = Zeroizing::new(Vec::with_capacity(
        master.len() + HOST_MARKER.len() + hostname.len() + ALPHABET_MARKER.len() + alphabet.len(),
    ));
    buf.extend_from_slice(master);
    buf.extend_from_slice(HOST_MARKER.as_bytes());
    buf.extend_from_slice(hostname.as_bytes());
    buf.extend_from_slice(ALPHABET_MARKER.as_bytes());
    buf.extend_from_slice(alphabet.as_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitepass_core::Charset;

    #[test]
    fn test_site_secret_layout() {
        let master = SecretString::from("pw");
        let alphabet = Alphabet::new("ab").unwrap();
        let secret = site_secret(&master, "example.com", &alphabet);

        let mut expected = b"pw".to_vec();
        expected.extend_from_slice(&[0x0C, 0xE4, 0xA8, 0xBA]);
        expected.extend_from_slice(b"example.com");
        expected.extend_from_slice(&[0x0C, 0xEA, 0x99, 0xAE]);
        expected.extend_from_slice(b"ab");
        assert_eq!(secret.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_verification_secret_is_master_only() {
        let master = SecretString::from("correct horse");
        assert_eq!(verification_secret(&master).as_slice(), b"correct horse");
    }

    #[test]
    fn test_inputs_differ_per_purpose_and_alphabet() {
        let master = SecretString::from("pw");
        let verify = verification_secret(&master);
        let digits = site_secret(&master, "h", &Charset::Digits.alphabet());
        let lower = site_secret(&master, "h", &Charset::Lower.alphabet());

        assert_ne!(verify.as_slice(), digits.as_slice());
        assert_ne!(digits.as_slice(), lower.as_slice());
    }
}
