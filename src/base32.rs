//! RFC4648 base32 codec working on 5-bit groups.
//!
//! Encoding is lowercase unless asked otherwise and never emits `=` padding,
//! decoding is case-insensitive and ignores whitespace.

/// Number of bits carried by a single base32 symbol
const SYMBOL_BITS: u32 = 5;
const SYMBOL_MASK: u32 = 0x1f;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Base32Error {
    #[error("Invalid base32 character, found {0:?}. Expected one of: a-z, A-Z or 2-7")]
    InvalidCharacter(char),
    #[error("Invalid base32 symbol value, found {0}. Expected a value between 0 and 31")]
    InvalidSymbolValue(u8),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    #[default]
    Lower,
    Upper,
}

/// Number of symbols needed to carry every bit of `byte_len` bytes
pub fn encoded_len(byte_len: usize) -> usize {
    (byte_len * 8).div_ceil(SYMBOL_BITS as usize)
}

/// Encodes `data` into exactly `symbol_count` lowercase symbols.
///
/// See [`encode_with_case`].
pub fn encode(data: &[u8], symbol_count: usize) -> String {
    encode_with_case(data, symbol_count, Case::Lower)
}

/// Encodes `data` into exactly `symbol_count` uppercase symbols.
pub fn encode_upper(data: &[u8], symbol_count: usize) -> String {
    encode_with_case(data, symbol_count, Case::Upper)
}

/// Reads `data` as a bit stream (most significant bit first) and emits one
/// symbol per 5 bits, stopping after `symbol_count` symbols.
///
/// When the stream runs out before `symbol_count * 5` bits the missing bits
/// are zero, bits beyond it are ignored. Use [`encoded_len`] to encode the
/// whole input.
pub fn encode_with_case(data: &[u8], symbol_count: usize, case: Case) -> String {
    let mut output = String::with_capacity(symbol_count);
    let mut bytes = data.iter().copied();

    let mut buffer: u32 = 0;
    let mut buffered_bits: u32 = 0;

    for _ in 0..symbol_count {
        if buffered_bits < SYMBOL_BITS {
            buffer = (buffer << 8) | u32::from(bytes.next().unwrap_or(0));
            buffered_bits += 8;
        }

        buffered_bits -= SYMBOL_BITS;
        let value = (buffer >> buffered_bits) & SYMBOL_MASK;
        buffer &= (1 << buffered_bits) - 1;

        output.push(symbol_char(value as u8, case));
    }

    output
}

/// Decodes base32 text into bytes.
///
/// Whitespace is skipped. The bits of all symbols are concatenated and
/// regrouped into `ceil(bits / 8)` bytes; a trailing partial byte keeps its
/// bits in the high positions and zeros below.
pub fn decode(text: &str) -> Result<Vec<u8>, Base32Error> {
    let values = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(decode_symbol)
        .collect::<Result<Vec<u8>, Base32Error>>()?;

    let total_bits = values.len() * SYMBOL_BITS as usize;
    let mut output = Vec::with_capacity(total_bits.div_ceil(8));

    let mut buffer: u32 = 0;
    let mut buffered_bits: u32 = 0;

    for value in values {
        buffer = (buffer << SYMBOL_BITS) | u32::from(value);
        buffered_bits += SYMBOL_BITS;

        if buffered_bits >= 8 {
            buffered_bits -= 8;
            output.push((buffer >> buffered_bits) as u8);
            buffer &= (1 << buffered_bits) - 1;
        }
    }

    if buffered_bits > 0 {
        output.push((buffer << (8 - buffered_bits)) as u8);
    }

    Ok(output)
}

/// Maps a 5-bit value to its symbol: 0-25 are letters, 26-31 are `2`-`7`
pub fn encode_symbol(value: u8, case: Case) -> Result<char, Base32Error> {
    if u32::from(value) > SYMBOL_MASK {
        return Err(Base32Error::InvalidSymbolValue(value));
    }

    Ok(symbol_char(value, case))
}

/// Maps a symbol back to its 5-bit value, accepting either letter case
pub fn decode_symbol(symbol: char) -> Result<u8, Base32Error> {
    match symbol {
        'a'..='z' => Ok(symbol as u8 - b'a'),
        'A'..='Z' => Ok(symbol as u8 - b'A'),
        '2'..='7' => Ok(symbol as u8 - b'2' + 26),
        _ => Err(Base32Error::InvalidCharacter(symbol)),
    }
}

pub fn is_valid_symbol(symbol: char) -> bool {
    matches!(symbol, 'a'..='z' | 'A'..='Z' | '2'..='7')
}

// `value` must already be in 0..=31
fn symbol_char(value: u8, case: Case) -> char {
    let ascii = match (value, case) {
        (0..=25, Case::Lower) => b'a' + value,
        (0..=25, Case::Upper) => b'A' + value,
        _ => b'2' + value - 26,
    };

    ascii as char
}
