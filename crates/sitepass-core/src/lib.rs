//! sitepass-core: shared building blocks for the sitepass front ends
//!
//! - `config`  - TOML configuration schema and loader
//! - `error`   - `SitepassError` / `SitepassResult`
//! - `logging` - tracing subscriber setup
//! - `reveal`  - countdown state machine that erases a displayed password
//! - `types`   - `Alphabet`, `Charset` presets and `Passcode`

pub mod config;
pub mod error;
pub mod logging;
pub mod reveal;
pub mod types;

pub use error::{SitepassError, SitepassResult};
pub use reveal::{RevealState, RevealTimer, SecretDisplay, TickOutcome};
pub use types::{Alphabet, Charset, Passcode};
