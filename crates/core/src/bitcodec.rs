//! Bit-level codecs for EPC binary representations.
//!
//! Everything here operates on plain strings: bit strings are `0`/`1`
//! characters, decimal values are digit strings.  Keeping values as strings
//! end to end means no integer type ever bounds a tag-width quantity; the
//! decimal conversions below work digit-wise for that reason.

use crate::error::{ErrorKind, Result, TdtError};
use epc_tdt_scheme_tables::PadDir;

// ─── Bit padding ────────────────────────────────────────────────────────────

/// Strip pad bits from one side of a bit string.
///
/// `compaction_bits` is the character width for compacted fields (5–8) and
/// `0` for numeric fields.  At widths of 4 and above the kept length is
/// rounded *up* to a whole number of characters so that a trailing or leading
/// zero bit belonging to a real character survives.
///
/// For `PadDir::Right` the prefix ending at the last `1` is kept; for
/// `PadDir::Left` the suffix starting at the first `1`.  An all-zero input
/// strips to the empty string.
pub fn strip_bit_padding(bits: &str, dir: PadDir, compaction_bits: u32) -> String {
    let round_up = |kept: usize| -> usize {
        if compaction_bits >= 4 {
            let k = compaction_bits as usize;
            kept.div_ceil(k) * k
        } else {
            kept
        }
    };
    match dir {
        PadDir::Right => {
            let kept = bits.rfind('1').map_or(0, |i| i + 1);
            let kept = round_up(kept).min(bits.len());
            bits[..kept].to_string()
        }
        PadDir::Left => {
            let kept = bits.find('1').map_or(0, |i| bits.len() - i);
            let kept = round_up(kept).min(bits.len());
            bits[bits.len() - kept..].to_string()
        }
    }
}

// ─── Character compaction ───────────────────────────────────────────────────

fn check_compaction(k: u32) -> Result<()> {
    if (5..=8).contains(&k) {
        Ok(())
    } else {
        Err(TdtError::new(
            ErrorKind::UnsupportedCompaction,
            format!("unsupported compaction width {k} (expected 5, 6, 7, or 8 bits)"),
        ))
    }
}

/// Decode a bit string into characters at `k` bits per character.
///
/// Each `k`-bit chunk is read as an unsigned byte.  5-bit values are offset
/// by 64 into the uppercase alphabet, 6-bit values below 32 likewise; 7- and
/// 8-bit values are emitted as-is (ISO 15962 compaction families).
pub fn binary_to_string(bits: &str, k: u32) -> Result<String> {
    check_compaction(k)?;
    let k = k as usize;
    let mut out = String::with_capacity(bits.len() / k + 1);
    let mut rest = bits;
    while !rest.is_empty() {
        let take = k.min(rest.len());
        let (chunk, tail) = rest.split_at(take);
        rest = tail;
        let byte = u8::from_str_radix(chunk, 2).map_err(|_| {
            TdtError::new(
                ErrorKind::InvalidBinary,
                format!("bit string chunk {chunk:?} contains characters other than 0/1"),
            )
        })?;
        let ch = match k {
            5 => byte + 64,
            6 if byte < 32 => byte + 64,
            _ => byte,
        };
        out.push(char::from(ch));
    }
    Ok(out)
}

/// Encode characters into a bit string at `k` bits per character.
///
/// Each character's code point is taken modulo `2^k` and rendered as exactly
/// `k` bits.  Inverse of [`binary_to_string`] for in-alphabet text.
pub fn string_to_binary(text: &str, k: u32) -> Result<String> {
    check_compaction(k)?;
    let mut out = String::with_capacity(text.len() * k as usize);
    for ch in text.chars() {
        let value = (ch as u32) % (1u32 << k);
        out.push_str(&format!("{value:0width$b}", width = k as usize));
    }
    Ok(out)
}

// ─── Decimal ↔ binary ───────────────────────────────────────────────────────

/// Interpret a bit string as a non-negative integer, returned as a decimal
/// string.  The empty string maps to `"0"`.
///
/// Works digit-wise (double-and-add on a decimal accumulator), so tag-width
/// inputs of 96 bits and beyond convert exactly.
pub fn bin_to_dec(bits: &str) -> Result<String> {
    // Little-endian decimal digits of the accumulator.
    let mut digits: Vec<u8> = vec![0];
    for bit in bits.chars() {
        let add = match bit {
            '0' => 0,
            '1' => 1,
            other => {
                return Err(TdtError::new(
                    ErrorKind::InvalidBinary,
                    format!("bit string contains non-binary character {other:?}"),
                ));
            }
        };
        let mut carry = add;
        for d in digits.iter_mut() {
            let v = *d * 2 + carry;
            *d = v % 10;
            carry = v / 10;
        }
        while carry > 0 {
            digits.push(carry % 10);
            carry /= 10;
        }
    }
    while digits.len() > 1 && digits.last() == Some(&0) {
        digits.pop();
    }
    Ok(digits
        .iter()
        .rev()
        .map(|d| char::from(b'0' + d))
        .collect())
}

/// Render a non-negative decimal string as a minimum-width bit string.
/// The empty string maps to `"0"`.
pub fn dec_to_bin(dec: &str) -> Result<String> {
    if !dec.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TdtError::new(
            ErrorKind::InvalidArgument,
            format!("cannot render {dec:?} as binary: not a decimal string"),
        ));
    }
    // Big-endian decimal digits, repeatedly halved; remainders are the bits
    // from least significant up.
    let mut digits: Vec<u8> = dec.bytes().map(|b| b - b'0').collect();
    if digits.is_empty() {
        return Ok("0".to_string());
    }
    let mut bits_rev = Vec::new();
    while digits.iter().any(|&d| d != 0) {
        let mut rem = 0u8;
        for d in digits.iter_mut() {
            let v = rem * 10 + *d;
            *d = v / 2;
            rem = v % 2;
        }
        bits_rev.push(rem);
    }
    if bits_rev.is_empty() {
        return Ok("0".to_string());
    }
    Ok(bits_rev
        .iter()
        .rev()
        .map(|&b| if b == 1 { '1' } else { '0' })
        .collect())
}

// ─── Text padding ───────────────────────────────────────────────────────────

/// Pad `s` with `pad` on the given side until it is `required_len`
/// characters long.  No-op when `s` is already long enough.
pub fn apply_pad_char(s: &str, dir: PadDir, pad: char, required_len: usize) -> String {
    let len = s.chars().count();
    if len >= required_len {
        return s.to_string();
    }
    let padding: String = std::iter::repeat(pad).take(required_len - len).collect();
    match dir {
        PadDir::Left => format!("{padding}{s}"),
        PadDir::Right => format!("{s}{padding}"),
    }
}

/// Remove a consecutive run of `pad` from the given side of `s`.
pub fn strip_pad_char(s: &str, dir: PadDir, pad: char) -> String {
    match dir {
        PadDir::Left => s.trim_start_matches(pad).to_string(),
        PadDir::Right => s.trim_end_matches(pad).to_string(),
    }
}
