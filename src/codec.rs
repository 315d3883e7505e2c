//! Base-62 identifier codec
//!
//! Short keys are the base-62 spelling of the numeric identifier the store
//! assigns to each record. The alphabet order below is part of the public
//! contract: changing it would make every previously issued key resolve to a
//! different record.

use thiserror::Error;

/// Digit alphabet, indexed by digit value
///
/// - `a`..`z` -> 0..25
/// - `A`..`Z` -> 26..51
/// - `0`..`9` -> 52..61
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Numeral base (the alphabet length)
pub const BASE: u64 = 62;

/// Length of the longest key `encode` can produce (`u64::MAX` -> "v8QrKbgkrIp")
pub const MAX_KEY_LEN: usize = 11;

/// Errors returned by the codec
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("short key is empty")]
    EmptyInput,

    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("short key exceeds the 64-bit identifier range")]
    Overflow,

    #[error("identifier {0} is negative")]
    NegativeInput(i64),
}

/// Returns the digit value of `c`, or `None` if it is not in the alphabet
pub fn digit_value(c: char) -> Option<u8> {
    let value = match c {
        'a'..='z' => c as u32 - 'a' as u32,
        'A'..='Z' => c as u32 - 'A' as u32 + 26,
        '0'..='9' => c as u32 - '0' as u32 + 52,
        _ => return None,
    };
    Some(value as u8)
}

/// Returns the alphabet character for `value`, or `None` if `value >= 62`
pub fn digit_char(value: u8) -> Option<char> {
    ALPHABET.get(value as usize).map(|&b| b as char)
}

/// Encodes an identifier as a short key
///
/// Zero encodes to `"a"` so the result is never empty. Every other value is
/// written most significant digit first, like ordinary positional notation.
///
/// # Example
///
/// ```
/// use shortlink::codec::encode;
///
/// assert_eq!(encode(0), "a");
/// assert_eq!(encode(62), "ba");
/// ```
pub fn encode(mut id: u64) -> String {
    if id == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut buf = [0u8; MAX_KEY_LEN];
    let mut start = buf.len();
    while id > 0 {
        start -= 1;
        buf[start] = ALPHABET[(id % BASE) as usize];
        id /= BASE;
    }

    buf[start..].iter().map(|&b| b as char).collect()
}

/// Encodes a signed identifier, rejecting negative values
///
/// For callers whose storage layer hands out signed primary keys.
pub fn encode_signed(id: i64) -> Result<String, CodecError> {
    u64::try_from(id)
        .map(encode)
        .map_err(|_| CodecError::NegativeInput(id))
}

/// Decodes a short key back into its identifier
///
/// Accumulation uses checked integer arithmetic, so every key up to
/// `u64::MAX` decodes exactly and anything larger is reported as
/// [`CodecError::Overflow`] instead of wrapping.
///
/// Leading `a` digits are zeros and are accepted (`"ab"` decodes to 1); it is
/// up to the caller to insist on the canonical spelling if it cares.
///
/// # Errors
///
/// * [`CodecError::EmptyInput`] - `key` is empty
/// * [`CodecError::InvalidCharacter`] - `key` contains a character outside the alphabet
/// * [`CodecError::Overflow`] - the value does not fit in a `u64`
pub fn decode(key: &str) -> Result<u64, CodecError> {
    if key.is_empty() {
        return Err(CodecError::EmptyInput);
    }

    key.chars()
        .enumerate()
        .try_fold(0u64, |acc, (position, character)| {
            let value = digit_value(character)
                .ok_or(CodecError::InvalidCharacter { character, position })?;
            acc.checked_mul(BASE)
                .and_then(|acc| acc.checked_add(u64::from(value)))
                .ok_or(CodecError::Overflow)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Positional value computed straight from the alphabet table
    fn expected_key(digits: &[usize]) -> String {
        digits.iter().map(|&d| ALPHABET[d] as char).collect()
    }

    #[test]
    fn zero_is_first_symbol() {
        assert_eq!(encode(0), "a");
        assert_eq!(decode("a"), Ok(0));
    }

    #[test]
    fn single_digit_boundary() {
        assert_eq!(encode(61), "9");
        assert_eq!(encode(61).len(), 1);
        assert_eq!(encode(62), expected_key(&[1, 0]));
        assert_eq!(encode(62), "ba");
    }

    #[test]
    fn known_values_follow_alphabet_order() {
        // 100 = 1 * 62 + 38
        assert_eq!(encode(100), expected_key(&[1, 38]));
        assert_eq!(encode(100), "bM");
        // 3843 = 61 * 62 + 61
        assert_eq!(encode(3843), "99");
        // 3844 = 62^2
        assert_eq!(encode(3844), "baa");
    }

    #[test]
    fn large_values_are_exact() {
        let max_signed = i64::MAX as u64;
        assert_eq!(encode(max_signed), "k9viXaIfiWh");
        assert_eq!(decode("k9viXaIfiWh"), Ok(max_signed));

        assert_eq!(encode(u64::MAX), "v8QrKbgkrIp");
        assert_eq!(encode(u64::MAX).len(), MAX_KEY_LEN);
        assert_eq!(decode("v8QrKbgkrIp"), Ok(u64::MAX));

        // 2^53 + 1 is the first integer an f64 cannot represent
        let beyond_f64 = (1u64 << 53) + 1;
        assert_eq!(decode(&encode(beyond_f64)), Ok(beyond_f64));
    }

    #[test]
    fn alphabet_is_a_bijection() {
        for value in 0..62u8 {
            let c = digit_char(value).unwrap();
            assert_eq!(digit_value(c), Some(value));
        }
        for &b in ALPHABET.iter() {
            let c = b as char;
            assert_eq!(digit_char(digit_value(c).unwrap()), Some(c));
        }
        assert_eq!(digit_char(62), None);
    }

    #[test]
    fn alphabet_ranges() {
        assert_eq!(digit_value('a'), Some(0));
        assert_eq!(digit_value('z'), Some(25));
        assert_eq!(digit_value('A'), Some(26));
        assert_eq!(digit_value('Z'), Some(51));
        assert_eq!(digit_value('0'), Some(52));
        assert_eq!(digit_value('9'), Some(61));
        assert_eq!(digit_value('-'), None);
        assert_eq!(digit_value('é'), None);
    }

    #[test]
    fn rejects_empty_key() {
        assert_eq!(decode(""), Err(CodecError::EmptyInput));
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        assert_eq!(
            decode("a!b"),
            Err(CodecError::InvalidCharacter { character: '!', position: 1 })
        );
        assert_eq!(
            decode("ab c"),
            Err(CodecError::InvalidCharacter { character: ' ', position: 2 })
        );
        assert!(matches!(
            decode("ü"),
            Err(CodecError::InvalidCharacter { character: 'ü', .. })
        ));
    }

    #[test]
    fn rejects_values_above_u64() {
        // u64::MAX + 1
        assert_eq!(decode("v8QrKbgkrIq"), Err(CodecError::Overflow));
        // 62^11
        assert_eq!(decode("baaaaaaaaaaa"), Err(CodecError::Overflow));
    }

    #[test]
    fn leading_zero_digits_are_tolerated() {
        assert_eq!(decode("ab"), Ok(1));
        assert_eq!(encode(1), "b");
    }

    #[test]
    fn signed_input() {
        assert_eq!(encode_signed(0), Ok("a".to_string()));
        assert_eq!(encode_signed(i64::MAX), Ok("k9viXaIfiWh".to_string()));
        assert_eq!(encode_signed(-1), Err(CodecError::NegativeInput(-1)));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(id in any::<u64>()) {
            let key = encode(id);
            prop_assert!(!key.is_empty() && key.len() <= MAX_KEY_LEN);
            prop_assert_eq!(decode(&key), Ok(id));
        }

        #[test]
        fn encode_inverts_decode_on_canonical_keys(key in "[b-zA-Z0-9][a-zA-Z0-9]{0,9}") {
            let id = decode(&key).unwrap();
            prop_assert_eq!(encode(id), key);
        }
    }
}
