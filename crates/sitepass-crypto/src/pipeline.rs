//! Generation pipeline: compose → derive → extract → synthesize
//!
//! The two derivations behind one "generate" action (verification code and
//! site password) share nothing mutable, so the async entry points run them
//! as independent blocking tasks that may finish in either order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use secrecy::SecretString;
use sitepass_core::config::KdfConfig;
use sitepass_core::types::MAX_LENGTH;
use sitepass_core::{Alphabet, Passcode, SitepassError, SitepassResult};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::compose;
use crate::kdf::{self, KdfParams, DEFAULT_OUTPUT_LEN};
use crate::synth::{self, required_buffer_len};

/// Alphabet of the verification code.
pub const VERIFICATION_ALPHABET: &str = "123456789abcdefghijkmnprstuvwxyz";

/// Symbols shown for the verification code.
pub const VERIFICATION_LENGTH: usize = 3;

/// Everything except the master password that selects one site password.
#[derive(Debug, Clone)]
pub struct SiteRequest {
    pub salt: String,
    pub hostname: String,
    pub alphabet: Alphabet,
    pub length: usize,
}

/// A synthesized passcode and the wall time it took.
#[derive(Debug)]
pub struct Derivation {
    pub passcode: Passcode,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct GeneratedPair {
    pub verification: Derivation,
    pub site: Derivation,
}

#[derive(Debug, Clone)]
pub struct Generator {
    params: KdfParams,
    output_len: usize,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(KdfParams::default(), DEFAULT_OUTPUT_LEN)
    }
}

impl Generator {
    pub fn new(params: KdfParams, output_len: usize) -> Self {
        Self { params, output_len }
    }

    pub fn from_config(config: &KdfConfig) -> Self {
        Self::new(KdfParams::from_config(config), config.output_len)
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Derived buffer length for `length` symbols over `sigma`: the configured
    /// minimum, raised when the request needs more bits.
    ///
    /// Lengths above [`MAX_LENGTH`] are rejected with `DerivationFailed`.
    pub fn buffer_len(&self, sigma: usize, length: usize) -> SitepassResult<usize> {
        if length > MAX_LENGTH {
            return Err(SitepassError::DerivationFailed(format!(
                "requested length {length} exceeds the maximum of {MAX_LENGTH} symbols"
            )));
        }
        let required = required_buffer_len(sigma, length).ok_or_else(|| {
            SitepassError::DerivationFailed(format!(
                "buffer size for {length} symbols over {sigma} overflows"
            ))
        })?;
        Ok(self.output_len.max(required))
    }

    /// Short code over [`VERIFICATION_ALPHABET`] that depends only on the
    /// master password and salt.
    pub fn verification_code(
        &self,
        master: &SecretString,
        salt: &str,
    ) -> SitepassResult<Derivation> {
        let alphabet = Alphabet::new(VERIFICATION_ALPHABET)?;
        let secret = compose::verification_secret(master);
        self.run("verification", &secret, salt, &alphabet, VERIFICATION_LENGTH)
    }

    pub fn site_password(
        &self,
        master: &SecretString,
        request: &SiteRequest,
    ) -> SitepassResult<Derivation> {
        let secret = compose::site_secret(master, &request.hostname, &request.alphabet);
        self.run(
            "site",
            &secret,
            &request.salt,
            &request.alphabet,
            request.length,
        )
    }

    fn run(
        &self,
        purpose: &'static str,
        secret: &[u8],
        salt: &str,
        alphabet: &Alphabet,
        length: usize,
    ) -> SitepassResult<Derivation> {
        let started = Instant::now();
        let output_len = self.buffer_len(alphabet.len(), length)?;

        let buffer = kdf::derive(secret, salt.as_bytes(), &self.params, output_len)?;
        let passcode = synth::synthesize(buffer.as_bytes(), alphabet, length)?;
        drop(buffer);

        let elapsed = started.elapsed();
        debug!(
            purpose,
            algorithm = %self.params.algorithm(),
            output_len,
            sigma = alphabet.len(),
            bits_per_symbol = alphabet.bits_per_symbol(),
            elapsed_ms = elapsed.as_millis() as u64,
            "derivation complete"
        );

        if passcode.is_shorter_than(length) {
            warn!(
                purpose,
                requested = length,
                produced = passcode.symbol_count(),
                output_len,
                "derived buffer exhausted before reaching requested length; \
                 raise kdf.output_len or shorten the password"
            );
        }

        Ok(Derivation { passcode, elapsed })
    }

    /// Run [`Generator::verification_code`] on the blocking pool.
    pub fn spawn_verification(
        &self,
        master: Arc<SecretString>,
        salt: String,
    ) -> JoinHandle<SitepassResult<Derivation>> {
        let generator = self.clone();
        tokio::task::spawn_blocking(move || generator.verification_code(&master, &salt))
    }

    /// Run [`Generator::site_password`] on the blocking pool.
    pub fn spawn_site(
        &self,
        master: Arc<SecretString>,
        request: SiteRequest,
    ) -> JoinHandle<SitepassResult<Derivation>> {
        let generator = self.clone();
        tokio::task::spawn_blocking(move || generator.site_password(&master, &request))
    }

    /// Both derivations concurrently; the first error wins.
    pub async fn generate(
        &self,
        master: Arc<SecretString>,
        request: SiteRequest,
    ) -> SitepassResult<GeneratedPair> {
        let verification = self.spawn_verification(Arc::clone(&master), request.salt.clone());
        let site = self.spawn_site(master, request);

        let (verification, site) = tokio::join!(verification, site);
        Ok(GeneratedPair {
            verification: joined(verification)?,
            site: joined(site)?,
        })
    }
}

/// Flatten a blocking-task result.
pub fn joined(
    result: Result<SitepassResult<Derivation>, JoinError>,
) -> SitepassResult<Derivation> {
    result.map_err(|e| SitepassError::Other(anyhow::anyhow!("derivation task failed: {e}")))?
}
