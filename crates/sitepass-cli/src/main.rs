//! sitepass: deterministic per-site passwords
//!
//! Commands:
//!   generate --salt S --host H   - derive a site password and reveal it briefly
//!   verify --salt S              - show the verification code for a master password
//!   charsets                     - list the built-in alphabets
//!   config show                  - display the effective configuration

mod terminal;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use sitepass_core::config::{default_config_path, expand_tilde, SitepassConfig};
use sitepass_core::logging::{init_logging, LogTarget};
use sitepass_core::types::MAX_LENGTH;
use sitepass_core::{Alphabet, Charset, Passcode, RevealTimer, TickOutcome};
use sitepass_crypto::{Generator, SiteRequest};

use terminal::LineDisplay;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sitepass",
    version,
    about = "Deterministic site passwords",
    long_about = "sitepass: derive a strong per-site password from one master password, \
                  a salt and the site's hostname. Nothing is stored."
)]
struct Cli {
    /// Path to config.toml (default: ~/.config/sitepass/config.toml)
    #[arg(long, short = 'c', env = "SITEPASS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Derive the password for one site
    ///
    /// The master password is prompted for on the terminal unless
    /// SITEPASS_PASSWORD is set.
    Generate {
        #[command(flatten)]
        secret: SecretArgs,

        /// Site hostname (e.g. example.com)
        #[arg(long)]
        host: String,

        /// Built-in alphabet by name or label (see `sitepass charsets`)
        #[arg(long, conflicts_with = "alphabet")]
        charset: Option<String>,

        /// Custom alphabet, one symbol per character
        #[arg(long)]
        alphabet: Option<String>,

        /// Password length in symbols, 1 to 1024 (overrides config)
        #[arg(long, short = 'n', value_parser = parse_length)]
        length: Option<usize>,

        /// Write the password to stdout instead of revealing it briefly
        #[arg(long)]
        print: bool,

        /// Seconds the password stays visible (overrides config)
        #[arg(long)]
        reveal_secs: Option<u32>,
    },

    /// Show the verification code for a master password
    Verify {
        #[command(flatten)]
        secret: SecretArgs,
    },

    /// List the built-in alphabets
    Charsets {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(clap::Args, Debug)]
struct SecretArgs {
    /// Salt shared by all of your sites
    #[arg(long, short = 's', env = "SITEPASS_SALT", hide_env_values = true)]
    salt: String,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .as_deref()
        .map(expand_tilde)
        .unwrap_or_else(default_config_path);
    let config = SitepassConfig::load(&config_path)?;
    init_logging(&config.log, LogTarget::Stderr)?;

    match cli.command {
        Commands::Generate {
            secret,
            host,
            charset,
            alphabet,
            length,
            print,
            reveal_secs,
        } => {
            let alphabet = resolve_alphabet(&config, charset.as_deref(), alphabet.as_deref())?;
            let request = SiteRequest {
                salt: secret.salt,
                hostname: host,
                alphabet,
                length: length.unwrap_or(config.generate.length),
            };
            cmd_generate(&config, request, print, reveal_secs).await
        }
        Commands::Verify { secret } => cmd_verify(&config, secret).await,
        Commands::Charsets { json } => cmd_charsets(json),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &config_path),
    }
}

// ── Input helpers ─────────────────────────────────────────────────────────────

/// `--alphabet` > `--charset` > `generate.charset` from config
fn resolve_alphabet(
    config: &SitepassConfig,
    charset: Option<&str>,
    alphabet: Option<&str>,
) -> Result<Alphabet> {
    if let Some(symbols) = alphabet {
        return Alphabet::new(symbols).context("parsing --alphabet");
    }
    let charset = match charset {
        Some(name) => name.parse::<Charset>().context("parsing --charset")?,
        None => config.generate.charset,
    };
    Ok(charset.alphabet())
}

const PASSWORD_ENV: &str = "SITEPASS_PASSWORD";

fn parse_length(s: &str) -> Result<usize, String> {
    let length: usize = s.parse().map_err(|e| format!("{e}"))?;
    if (1..=MAX_LENGTH).contains(&length) {
        Ok(length)
    } else {
        Err(format!("must be between 1 and {MAX_LENGTH}"))
    }
}

/// Read the master password from `SITEPASS_PASSWORD`, else prompt for it.
/// There is no flag for it: argv is visible to every local user.
fn read_master() -> Result<SecretString> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(password));
    }
    let password =
        rpassword::prompt_password("Master password: ").context("reading master password")?;
    Ok(SecretString::from(password))
}

fn make_spinner(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{prefix:.bold} {spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ── `sitepass generate` ───────────────────────────────────────────────────────

async fn cmd_generate(
    config: &SitepassConfig,
    request: SiteRequest,
    print: bool,
    reveal_secs: Option<u32>,
) -> Result<()> {
    let master = Arc::new(read_master()?);
    let generator = Generator::from_config(&config.kdf);

    let pb = make_spinner("derive");
    pb.set_message(format!(
        "{} ({} symbols, {} per symbol)",
        request.hostname,
        request.length,
        bits_label(request.alphabet.bits_per_symbol())
    ));
    let pair = generator.generate(master, request).await;
    pb.finish_and_clear();
    let pair = pair.context("deriving password")?;

    eprintln!(
        "verification: {}  ({} ms)",
        pair.verification.passcode.as_str(),
        pair.verification.elapsed.as_millis()
    );
    tracing::debug!(
        elapsed_ms = pair.site.elapsed.as_millis() as u64,
        "site password derived"
    );

    if print || !std::io::stdout().is_terminal() {
        println!("{}", pair.site.passcode.as_str());
        return Ok(());
    }

    let seconds = reveal_secs.unwrap_or(config.reveal.seconds);
    let tick = Duration::from_millis(config.reveal.tick_ms);
    reveal(pair.site.passcode, seconds, tick).await
}

fn bits_label(bits: u32) -> String {
    if bits == 1 {
        "1 bit".into()
    } else {
        format!("{bits} bits")
    }
}

/// Show the password on one line until the timer or Enter erases it.
async fn reveal(passcode: Passcode, seconds: u32, tick: Duration) -> Result<()> {
    let mut display = LineDisplay::new(std::io::stdout());
    let mut timer = RevealTimer::new(seconds);
    timer.password_computed(passcode, &mut display);

    let mut ticks = tokio::time::interval(tick);
    // First tick of an interval completes immediately.
    ticks.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        let outcome = tokio::select! {
            _ = ticks.tick() => timer.tick(&mut display),
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    display.rewind_line();
                    timer.manual_clear(&mut display)
                }
                Ok(None) | Err(_) => {
                    stdin_open = false;
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => timer.manual_clear(&mut display),
        };
        if outcome == TickOutcome::Cleared {
            break;
        }
    }
    display.finish();
    Ok(())
}

// ── `sitepass verify` ─────────────────────────────────────────────────────────

async fn cmd_verify(config: &SitepassConfig, secret: SecretArgs) -> Result<()> {
    let master = Arc::new(read_master()?);
    let generator = Generator::from_config(&config.kdf);

    let pb = make_spinner("derive");
    pb.set_message("verification code");
    let code = sitepass_crypto::pipeline::joined(
        generator.spawn_verification(master, secret.salt).await,
    );
    pb.finish_and_clear();
    let code = code.context("deriving verification code")?;

    println!("{}", code.passcode.as_str());
    tracing::debug!(elapsed_ms = code.elapsed.as_millis() as u64, "verification code derived");
    Ok(())
}

// ── `sitepass charsets` ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CharsetInfo {
    name: &'static str,
    label: &'static str,
    size: usize,
    bits_per_symbol: u32,
}

fn charset_table() -> Vec<CharsetInfo> {
    Charset::ALL
        .iter()
        .map(|c| {
            let alphabet = c.alphabet();
            CharsetInfo {
                name: c.name(),
                label: c.label(),
                size: alphabet.len(),
                bits_per_symbol: alphabet.bits_per_symbol(),
            }
        })
        .collect()
}

fn cmd_charsets(json: bool) -> Result<()> {
    let table = charset_table();
    if json {
        let rendered = serde_json::to_string_pretty(&table).context("serializing charsets")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{:<16} {:<12} {:>6} {:>5}", "NAME", "LABEL", "SIZE", "BITS");
    for info in &table {
        println!(
            "{:<16} {:<12} {:>6} {:>5}",
            info.name, info.label, info.size, info.bits_per_symbol
        );
    }
    Ok(())
}

// ── `sitepass config show` ────────────────────────────────────────────────────

fn cmd_config_show(config: &SitepassConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_alphabet_precedence() {
        let mut config = SitepassConfig::default();
        config.generate.charset = Charset::Digits;

        let a = resolve_alphabet(&config, None, None).unwrap();
        assert_eq!(a, Charset::Digits.alphabet());

        let a = resolve_alphabet(&config, Some("lower"), None).unwrap();
        assert_eq!(a, Charset::Lower.alphabet());

        let a = resolve_alphabet(&config, None, Some("xyz")).unwrap();
        assert_eq!(a.serialized(), "xyz");
    }

    #[test]
    fn test_resolve_alphabet_rejects_bad_input() {
        let config = SitepassConfig::default();
        assert!(resolve_alphabet(&config, Some("no-such-charset"), None).is_err());
        assert!(resolve_alphabet(&config, None, Some("x")).is_err());
    }

    #[test]
    fn test_charset_and_alphabet_conflict() {
        let err = Cli::try_parse_from([
            "sitepass",
            "generate",
            "--salt",
            "s",
            "--host",
            "h",
            "--charset",
            "digits",
            "--alphabet",
            "ab",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_length_is_bounded_at_parse_time() {
        let parse = |n: &str| {
            Cli::try_parse_from(["sitepass", "generate", "-s", "s", "--host", "h", "-n", n])
        };
        let cli = parse("1024").unwrap();
        assert!(matches!(cli.command, Commands::Generate { length: Some(1024), .. }));

        let overflowing = (usize::MAX / 8).to_string();
        for bad in ["0", "1025", overflowing.as_str(), "ten"] {
            let err = parse(bad).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{bad}");
        }
    }

    #[test]
    fn test_master_password_is_not_an_argument() {
        let err = Cli::try_parse_from([
            "sitepass",
            "generate",
            "--salt",
            "s",
            "--host",
            "h",
            "--password",
            "hunter2",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);

        let err = Cli::try_parse_from(["sitepass", "verify", "--salt", "s", "hunter2"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_charset_table_covers_all_presets() {
        let table = charset_table();
        assert_eq!(table.len(), Charset::ALL.len());
        let digits = table.iter().find(|c| c.name == "digits").unwrap();
        assert_eq!(digits.size, 10);
        assert_eq!(digits.bits_per_symbol, 4);
    }
}
