//! sitepass-crypto: deterministic site passwords from a master password
//!
//! Pipeline: compose input → KDF (scrypt / Argon2id) → cut into symbols → rejection-sample
//!
//! ```text
//! (master, salt)                          ──scrypt──▶ 1024 bits ──5-bit symbols──▶ verification code
//! (master ‖ host ‖ alphabet, salt)        ──scrypt──▶ 1024+ bits ──⌈log2 σ⌉-bit symbols──▶ site password
//! ```
//!
//! Nothing is stored: identical inputs regenerate identical output.

pub mod bits;
pub mod compose;
pub mod kdf;
pub mod pipeline;
pub mod synth;

pub use bits::{extract, SymbolStream};
pub use kdf::{derive, DerivedBuffer, KdfParams};
pub use pipeline::{
    Derivation, GeneratedPair, Generator, SiteRequest, VERIFICATION_ALPHABET, VERIFICATION_LENGTH,
};
pub use synth::{synthesize, synthesize_symbols};
