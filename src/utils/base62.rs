//! Base62 codec for counter-derived short codes.
//!
//! Maps non-negative integers to strings over the ordered alphabet
//! `0-9a-zA-Z` (digit values 0..61), most significant digit first.
//! The symbol table is a compile-time constant, so the codec carries no state.

/// Ordered alphabet; the index of a symbol is its digit value.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = ALPHABET.len() as u64;

/// Longest possible encoding (`u64::MAX` is 11 symbols).
const MAX_ENCODED_LEN: usize = 11;

const INVALID: u8 = u8::MAX;

static DECODE_TABLE: [u8; 128] = build_decode_table();

const fn build_decode_table() -> [u8; 128] {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Errors returned by [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("cannot decode an empty string")]
    EmptyInput,
    #[error("invalid base62 symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
    #[error("base62 value does not fit in 64 bits")]
    Overflow,
}

/// Encodes `n` in base 62. Zero encodes to `"0"`.
///
/// # Examples
///
/// ```
/// use shortener::utils::base62::encode;
///
/// assert_eq!(encode(0), "0");
/// assert_eq!(encode(62), "10");
/// assert_eq!(encode(123_456_789), "8m0Kx");
/// ```
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return char::from(ALPHABET[0]).to_string();
    }

    let mut buf = [0u8; MAX_ENCODED_LEN];
    let mut pos = MAX_ENCODED_LEN;

    while n > 0 {
        pos -= 1;
        buf[pos] = ALPHABET[(n % BASE) as usize];
        n /= BASE;
    }

    buf[pos..].iter().map(|&b| char::from(b)).collect()
}

/// Decodes a base62 string produced by [`encode`].
///
/// # Errors
///
/// - [`DecodeError::EmptyInput`] for `""`
/// - [`DecodeError::InvalidSymbol`] if any character is outside the alphabet
/// - [`DecodeError::Overflow`] if the value exceeds `u64::MAX`
pub fn decode(s: &str) -> Result<u64, DecodeError> {
    if s.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    if let Some((position, symbol)) = s.chars().enumerate().find(|(_, c)| digit_value(*c).is_none())
    {
        return Err(DecodeError::InvalidSymbol { symbol, position });
    }

    s.chars().try_fold(0u64, |acc, c| {
        let digit = digit_value(c).ok_or(DecodeError::Overflow)?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or(DecodeError::Overflow)
    })
}

fn digit_value(c: char) -> Option<u64> {
    let idx = c as usize;
    if idx >= DECODE_TABLE.len() {
        return None;
    }

    match DECODE_TABLE[idx] {
        INVALID => None,
        v => Some(u64::from(v)),
    }
}
