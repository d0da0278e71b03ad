//! LibCompress-style Huffman decompression
//!
//! Legacy WeakAuras strings wrap their payload in the LibCompress container:
//! a codec byte (`\x01` = stored, `\x03` = Huffman), then for Huffman a
//! symbol count byte (`count - 1`), the original size as a 3-byte
//! little-endian integer, the bit-packed code table, and the bit-packed
//! codes. Code-table bits encode a code LSB-first: `0` for a zero bit, `10`
//! for a one bit, terminated by `11`.
//!
//! Decompression stops once the declared original size has been produced;
//! trailing padding bits are ignored, and a code stream that ends before
//! reaching that size yields the symbols it did carry, as the in-game
//! decompressor does. There is no compressor here because the encode
//! pipeline always uses DEFLATE, like the game does.

use crate::{CodecError, Result};
use std::borrow::Cow;
use std::collections::BTreeMap;

const STORED: u8 = 1;
const HUFFMAN: u8 = 3;

/// Code-length keyed lookup table: length -> code bits -> symbol
type CodeTable = BTreeMap<u32, BTreeMap<u32, u8>>;

pub fn decompress(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    match bytes.first() {
        Some(&STORED) => return Ok(Cow::Borrowed(&bytes[1..])),
        Some(&HUFFMAN) => {}
        Some(&other) => return Err(CodecError::UnknownCompressionCodec(other)),
        None => return Err(CodecError::TruncatedInput),
    }

    if bytes.len() < 5 {
        return Err(CodecError::TruncatedInput);
    }

    let num_symbols = usize::from(bytes[1]) + 1;
    let original_size =
        usize::from(bytes[2]) | usize::from(bytes[3]) << 8 | usize::from(bytes[4]) << 16;
    if original_size == 0 {
        return Err(CodecError::TruncatedInput);
    }

    let mut bits = BitReader::new(&bytes[5..]);
    let table = read_code_table(&mut bits, num_symbols)?;

    let mut result = Vec::with_capacity(original_size);
    loop {
        while let Some((code_len, symbol)) = lookup(&table, &bits) {
            result.push(symbol);
            bits.discard(code_len);

            if result.len() == original_size {
                return Ok(Cow::Owned(result));
            }
        }

        if !bits.refill()? {
            // Out of input before the declared size was reached; return what
            // the bit stream actually contained.
            return Ok(Cow::Owned(result));
        }
    }
}

fn read_code_table(bits: &mut BitReader<'_>, num_symbols: usize) -> Result<CodeTable> {
    let mut table = CodeTable::new();

    for _ in 0..num_symbols {
        bits.fill_to(8)?;
        let symbol = bits.take(8) as u8;

        // Pull bytes until the code terminator ("11") is inside the window.
        while bits.window() & (bits.window() >> 1) == 0 {
            if !bits.refill()? {
                return Err(CodecError::TruncatedInput);
            }
        }

        let mut cut = 0u32;
        let mut code_len = 0u32;
        let mut code = 0u32;
        while (bits.window() >> cut) & 3 < 3 {
            if (bits.window() >> cut) & 1 != 0 {
                code |= 1 << code_len;
                cut += 1;
            }
            code_len += 1;
            cut += 1;
        }
        bits.discard(cut + 2);

        if code_len == 0 {
            return Err(CodecError::MalformedHuffman);
        }

        table.entry(code_len).or_default().insert(code, symbol);
    }

    Ok(table)
}

/// Find the symbol whose code matches the head of the bit window,
/// shortest code first.
fn lookup(table: &CodeTable, bits: &BitReader<'_>) -> Option<(u32, u8)> {
    table
        .iter()
        .take_while(|(&code_len, _)| code_len <= bits.len())
        .find_map(|(&code_len, codes)| {
            codes
                .get(&(bits.window() & mask(code_len)))
                .map(|&symbol| (code_len, symbol))
        })
}

#[inline]
fn mask(n: u32) -> u32 {
    if n == 0 {
        0
    } else {
        u32::MAX >> (32 - n)
    }
}

// ----------------------------------------------------------------------------
// Bit window
// ----------------------------------------------------------------------------

/// A 32-bit LSB-first bit window over a byte slice
struct BitReader<'a> {
    bytes: core::slice::Iter<'a, u8>,
    window: u32,
    len: u32,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes: bytes.iter(),
            window: 0,
            len: 0,
        }
    }

    #[inline]
    fn window(&self) -> u32 {
        self.window
    }

    #[inline]
    fn len(&self) -> u32 {
        self.len
    }

    /// Pull one more byte into the window. Returns `false` when the input is
    /// exhausted; a window that is already too full to accept a byte means
    /// the stream holds a code longer than the format allows.
    fn refill(&mut self) -> Result<bool> {
        if self.len > 24 {
            return Err(CodecError::MalformedHuffman);
        }
        match self.bytes.next() {
            Some(&byte) => {
                self.window |= u32::from(byte) << self.len;
                self.len += 8;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn fill_to(&mut self, need: u32) -> Result<()> {
        while self.len < need {
            if !self.refill()? {
                return Err(CodecError::TruncatedInput);
            }
        }
        Ok(())
    }

    fn take(&mut self, n: u32) -> u32 {
        let value = self.window & mask(n);
        self.discard(n);
        value
    }

    fn discard(&mut self, n: u32) {
        self.window = if n >= 32 { 0 } else { self.window >> n };
        self.len -= n.min(self.len);
    }
}
