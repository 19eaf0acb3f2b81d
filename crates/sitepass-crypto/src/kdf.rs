//! Key derivation adapter: scrypt (default) or Argon2id → derived buffer

use argon2::{Algorithm, Argon2, Params, Version};
use sitepass_core::config::{KdfAlgorithm, KdfConfig};
use sitepass_core::{SitepassError, SitepassResult};
use zeroize::Zeroize;

/// Output length used when nothing longer is needed (1024 bits).
pub const DEFAULT_OUTPUT_LEN: usize = 128;

/// Bytes produced by one derivation. Zeroized on drop.
pub struct DerivedBuffer {
    bytes: Vec<u8>,
}

impl DerivedBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Drop for DerivedBuffer {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedBuffer")
            .field("bytes", &"[REDACTED]")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Cost parameters for the password-hashing primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfParams {
    Scrypt {
        /// log2(N)
        log_n: u8,
        r: u32,
        p: u32,
    },
    Argon2id {
        /// Memory cost in KiB
        mem_cost_kib: u32,
        time_cost: u32,
        parallelism: u32,
    },
}

impl Default for KdfParams {
    /// scrypt N = 2^18, r = 8, p = 1: several seconds per derivation.
    fn default() -> Self {
        KdfParams::Scrypt {
            log_n: 18,
            r: 8,
            p: 1,
        }
    }
}

impl KdfParams {
    pub fn from_config(config: &KdfConfig) -> Self {
        match config.algorithm {
            KdfAlgorithm::Scrypt => KdfParams::Scrypt {
                log_n: config.scrypt_log_n,
                r: config.scrypt_r,
                p: config.scrypt_p,
            },
            KdfAlgorithm::Argon2id => KdfParams::Argon2id {
                mem_cost_kib: config.argon2_mem_cost_kib,
                time_cost: config.argon2_time_cost,
                parallelism: config.argon2_parallelism,
            },
        }
    }

    pub fn algorithm(&self) -> KdfAlgorithm {
        match self {
            KdfParams::Scrypt { .. } => KdfAlgorithm::Scrypt,
            KdfParams::Argon2id { .. } => KdfAlgorithm::Argon2id,
        }
    }
}

/// Stretch `secret` with `salt` into `output_len` pseudorandom bytes.
///
/// Any error from the primitive (bad cost parameters, unsupported output
/// length, an Argon2 salt under 8 bytes) is returned as `DerivationFailed`.
pub fn derive(
    secret: &[u8],
    salt: &[u8],
    params: &KdfParams,
    output_len: usize,
) -> SitepassResult<DerivedBuffer> {
    let mut bytes = vec![0u8; output_len];

    match *params {
        KdfParams::Scrypt { log_n, r, p } => {
            let scrypt_params = scrypt::Params::new(log_n, r, p, scrypt::Params::RECOMMENDED_LEN)
                .map_err(|e| {
                    SitepassError::DerivationFailed(format!("invalid scrypt params: {e}"))
                })?;
            // The output length comes from the buffer, not from Params.
            scrypt::scrypt(secret, salt, &scrypt_params, &mut bytes)
                .map_err(|e| SitepassError::DerivationFailed(format!("scrypt failed: {e}")))?;
        }
        KdfParams::Argon2id {
            mem_cost_kib,
            time_cost,
            parallelism,
        } => {
            let argon2_params = Params::new(mem_cost_kib, time_cost, parallelism, Some(output_len))
                .map_err(|e| {
                    SitepassError::DerivationFailed(format!("invalid Argon2id params: {e}"))
                })?;
            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);
            argon2
                .hash_password_into(secret, salt, &mut bytes)
                .map_err(|e| SitepassError::DerivationFailed(format!("Argon2id failed: {e}")))?;
        }
    }

    Ok(DerivedBuffer { bytes })
}
