use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{SitepassError, SitepassResult};

/// Largest alphabet whose indices fit a 16-bit extracted symbol.
pub const MAX_ALPHABET_SIZE: usize = 1 << 16;

/// Password lengths offered by the front ends.
pub const LENGTH_CHOICES: [usize; 5] = [8, 12, 16, 20, 24];

pub const DEFAULT_LENGTH: usize = 16;

/// Longest password, in symbols, the pipeline will derive.
pub const MAX_LENGTH: usize = 1024;

/// Ordered output symbols, addressed by position.
///
/// Repeated symbols are kept: the position → symbol mapping is what
/// defines a derived password, and a repeated symbol is simply drawn more
/// often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    pub fn new(symbols: &str) -> SitepassResult<Self> {
        Self::from_symbols(symbols.chars().collect())
    }

    pub fn from_symbols(symbols: Vec<char>) -> SitepassResult<Self> {
        if symbols.len() < 2 {
            return Err(SitepassError::InvalidAlphabet(format!(
                "need at least 2 symbols, got {}",
                symbols.len()
            )));
        }
        if symbols.len() > MAX_ALPHABET_SIZE {
            return Err(SitepassError::InvalidAlphabet(format!(
                "at most {MAX_ALPHABET_SIZE} symbols supported, got {}",
                symbols.len()
            )));
        }
        Ok(Self { symbols })
    }

    /// Every code point from `start` to `end` inclusive.
    pub fn from_range(start: char, end: char) -> SitepassResult<Self> {
        Self::from_symbols((start..=end).collect())
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }

    /// `ceil(log2(len))`, the width of one extracted symbol.
    pub fn bits_per_symbol(&self) -> u32 {
        bits_for(self.symbols.len())
    }

    /// The symbols concatenated in order, as mixed into the site secret.
    pub fn serialized(&self) -> String {
        self.symbols.iter().collect()
    }
}

/// `ceil(log2(sigma))` for `sigma >= 2`; 0 below that.
pub fn bits_for(sigma: usize) -> u32 {
    if sigma < 2 {
        0
    } else {
        usize::BITS - (sigma - 1).leading_zeros()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized())
    }
}

impl FromStr for Alphabet {
    type Err = SitepassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

const LOWER: &str = "123456789abcdefghijkmnprstuvwxyz";
const UPPER: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ123456789";
const KEYS: &str = "!#$%&()*+-/<=>?@[]^";
const HIRAGANA: &str = "あいうえおかきくけこさしすせそたちつてとなにぬねのはひふへほまみむめもやゆよらりるれろわをんー";

/// Built-in character tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Charset {
    Digits,
    Lower,
    #[default]
    Mixed,
    MixedSymbols,
    Hiragana,
    MiscSymbols,
    Squared,
}

impl Charset {
    pub const ALL: &[Charset] = &[
        Charset::Digits,
        Charset::Lower,
        Charset::Mixed,
        Charset::MixedSymbols,
        Charset::Hiragana,
        Charset::MiscSymbols,
        Charset::Squared,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Charset::Digits => "digits",
            Charset::Lower => "lower",
            Charset::Mixed => "mixed",
            Charset::MixedSymbols => "mixed-symbols",
            Charset::Hiragana => "hiragana",
            Charset::MiscSymbols => "misc-symbols",
            Charset::Squared => "squared",
        }
    }

    /// Short sample shown next to the choice.
    pub fn label(&self) -> &'static str {
        match self {
            Charset::Digits => "0-9",
            Charset::Lower => "01ab",
            Charset::Mixed => "01aB",
            Charset::MixedSymbols => "01aB%",
            Charset::Hiragana => "あ",
            Charset::MiscSymbols => "☀☁",
            Charset::Squared => "㍍㌠",
        }
    }

    pub fn alphabet(&self) -> Alphabet {
        let symbols: Vec<char> = match self {
            Charset::Digits => "0123456789".chars().collect(),
            Charset::Lower => LOWER.chars().collect(),
            Charset::Mixed => LOWER.chars().chain(UPPER.chars()).collect(),
            Charset::MixedSymbols => LOWER
                .chars()
                .chain(UPPER.chars())
                .chain(KEYS.chars())
                .chain(KEYS.chars())
                .collect(),
            Charset::Hiragana => HIRAGANA.chars().collect(),
            Charset::MiscSymbols => ('\u{2600}'..='\u{266F}').collect(),
            Charset::Squared => ('\u{3300}'..='\u{3357}').collect(),
        };
        // Every preset holds well over 2 symbols.
        Alphabet { symbols }
    }

    pub fn next(&self) -> Charset {
        let i = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Charset {
        let i = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = SitepassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s || c.label() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|c| c.name()).collect();
                SitepassError::InvalidAlphabet(format!(
                    "unknown charset '{s}' (expected one of: {})",
                    names.join(", ")
                ))
            })
    }
}

/// A synthesized password. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Passcode {
    text: Zeroizing<String>,
}

impl Passcode {
    pub fn new(text: String) -> Self {
        Self {
            text: Zeroizing::new(text),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of symbols (not bytes).
    pub fn symbol_count(&self) -> usize {
        self.text.chars().count()
    }

    /// True when stream exhaustion left fewer than `requested` symbols.
    pub fn is_shorter_than(&self, requested: usize) -> bool {
        self.symbol_count() < requested
    }

    /// Non-secret stand-in of the same symbol count.
    pub fn placeholder(&self) -> String {
        "*".repeat(self.symbol_count())
    }
}

impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Passcode")
            .field("text", &"[REDACTED]")
            .field("symbols", &self.symbol_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_rejects_fewer_than_two_symbols() {
        assert!(matches!(
            Alphabet::new(""),
            Err(SitepassError::InvalidAlphabet(_))
        ));
        assert!(matches!(
            Alphabet::new("x"),
            Err(SitepassError::InvalidAlphabet(_))
        ));
        assert!(Alphabet::new("xy").is_ok());
    }

    #[test]
    fn test_alphabet_counts_chars_not_bytes() {
        let a = Alphabet::new("あい").unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.get(1), Some('い'));
        assert_eq!(a.serialized(), "あい");
    }

    #[test]
    fn test_alphabet_keeps_repeated_symbols() {
        let a = Alphabet::new("abab").unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a.get(2), Some('a'));
    }

    #[test]
    fn test_bits_per_symbol() {
        assert_eq!(bits_for(2), 1);
        assert_eq!(bits_for(3), 2);
        assert_eq!(bits_for(10), 4);
        assert_eq!(bits_for(16), 4);
        assert_eq!(bits_for(17), 5);
        assert_eq!(bits_for(32), 5);
        assert_eq!(bits_for(33), 6);
        assert_eq!(bits_for(MAX_ALPHABET_SIZE), 16);
    }

    #[test]
    fn test_preset_sizes() {
        assert_eq!(Charset::Digits.alphabet().len(), 10);
        assert_eq!(Charset::Lower.alphabet().len(), 32);
        assert_eq!(Charset::Mixed.alphabet().len(), 65);
        assert_eq!(Charset::MixedSymbols.alphabet().len(), 103);
        assert_eq!(Charset::Hiragana.alphabet().len(), 47);
        assert_eq!(Charset::MiscSymbols.alphabet().len(), 0x70);
        assert_eq!(Charset::Squared.alphabet().len(), 0x58);
    }

    #[test]
    fn test_mixed_symbols_extends_mixed() {
        let mixed = Charset::Mixed.alphabet().serialized();
        let with_keys = Charset::MixedSymbols.alphabet().serialized();
        assert!(with_keys.starts_with(&mixed));
        assert!(with_keys.ends_with("!#$%&()*+-/<=>?@[]^!#$%&()*+-/<=>?@[]^"));
    }

    #[test]
    fn test_charset_parse_by_name_or_label() {
        assert_eq!("digits".parse::<Charset>().unwrap(), Charset::Digits);
        assert_eq!("01aB%".parse::<Charset>().unwrap(), Charset::MixedSymbols);
        assert!("nope".parse::<Charset>().is_err());
    }

    #[test]
    fn test_charset_cycle_wraps() {
        assert_eq!(Charset::Squared.next(), Charset::Digits);
        assert_eq!(Charset::Digits.prev(), Charset::Squared);
        let mut c = Charset::Digits;
        for _ in 0..Charset::ALL.len() {
            c = c.next();
        }
        assert_eq!(c, Charset::Digits);
    }

    #[test]
    fn test_passcode_debug_is_redacted() {
        let p = Passcode::new("hunter2".into());
        let dbg = format!("{p:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn test_passcode_placeholder_matches_symbol_count() {
        let p = Passcode::new("☀☁x".into());
        assert_eq!(p.placeholder(), "***");
        assert!(p.is_shorter_than(4));
        assert!(!p.is_shorter_than(3));
    }
}
