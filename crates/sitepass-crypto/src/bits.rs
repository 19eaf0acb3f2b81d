//! Bit extraction: derived bytes → fixed-width symbols, MSB first
//!
//! The buffer is read as one bit string, most significant bit of each byte
//! first, bytes in order. Symbol `k` covers bits `k*w .. (k+1)*w`. The cursor
//! stops while `i + w < bit_len` still holds, so the last symbol that would
//! fit is never produced. Existing passwords depend on that boundary.

/// Widest symbol the extractor produces.
pub const MAX_BITS_PER_SYMBOL: u32 = 16;

/// One-shot stream of `bits_per_symbol`-wide values read from a buffer.
#[derive(Debug, Clone)]
pub struct SymbolStream<'a> {
    buffer: &'a [u8],
    bits: u32,
    cursor: usize,
}

impl<'a> SymbolStream<'a> {
    /// Empty when `bits_per_symbol` is outside `1..=16`.
    pub fn new(buffer: &'a [u8], bits_per_symbol: u32) -> Self {
        let bits = if (1..=MAX_BITS_PER_SYMBOL).contains(&bits_per_symbol) {
            bits_per_symbol
        } else {
            0
        };
        Self {
            buffer,
            bits,
            cursor: 0,
        }
    }

    fn bit_len(&self) -> usize {
        self.buffer.len() * 8
    }

    fn byte_at(&self, pos: usize) -> u32 {
        self.buffer.get(pos).copied().map_or(0, u32::from)
    }
}

impl Iterator for SymbolStream<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        let bits = self.bits as usize;
        if bits == 0 || self.cursor + bits >= self.bit_len() {
            return None;
        }
        let pos = self.cursor / 8;
        let rem = self.cursor % 8;

        // 24-bit window so rem + bits <= 23 always fits. For rem + bits <= 16
        // the third byte is shifted out entirely.
        let window =
            (self.byte_at(pos) << 16) | (self.byte_at(pos + 1) << 8) | self.byte_at(pos + 2);
        let value = (window >> (24 - (rem + bits))) & ((1u32 << bits) - 1);

        self.cursor += bits;
        Some(value as u16)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = remaining_symbols(self.bit_len(), self.cursor, self.bits as usize);
        (n, Some(n))
    }
}

impl ExactSizeIterator for SymbolStream<'_> {}

/// Number of cursor positions `i = start + k*bits` with `i + bits < bit_len`.
fn remaining_symbols(bit_len: usize, start: usize, bits: usize) -> usize {
    if bits == 0 || start + bits >= bit_len {
        return 0;
    }
    (bit_len - start).div_ceil(bits) - 1
}

/// Number of symbols [`extract`] yields for `byte_len` bytes.
pub fn symbol_count(byte_len: usize, bits_per_symbol: u32) -> usize {
    if !(1..=MAX_BITS_PER_SYMBOL).contains(&bits_per_symbol) {
        return 0;
    }
    remaining_symbols(byte_len * 8, 0, bits_per_symbol as usize)
}

/// Cut `buffer` into `bits_per_symbol`-wide unsigned integers.
pub fn extract(buffer: &[u8], bits_per_symbol: u32) -> Vec<u16> {
    SymbolStream::new(buffer, bits_per_symbol).collect()
}
