//! Variable byte integer encoding.
//!
//! Little-endian base-128 groups with the high bit of each byte flagging a
//! continuation. At most four bytes, so the largest value is 268,435,455:
//! - 0-127: 1 byte
//! - 128-16383: 2 bytes
//! - 16384-2097151: 3 bytes
//! - 2097152-268435455: 4 bytes

use crate::constants::{VARBYTEINT_FIN_MASK, VARBYTEINT_MASK, VARBYTEINT_MAX, VARBYTEINT_MAX_BYTES};
use crate::error::{DecodeError, EncodeError};

/// Decodes a variable byte integer from the front of `buf`.
///
/// Returns `Ok(Some((value, bytes_consumed)))` when a terminating byte was
/// found, `Ok(None)` if the buffer ends before the encoding does, and `Err`
/// when four bytes pass without termination.
///
/// # Example
/// ```
/// use mqwire_protocol::varint::decode;
/// let (value, consumed) = decode(&[0x80, 0x01]).unwrap().unwrap();
/// assert_eq!(value, 128);
/// assert_eq!(consumed, 2);
/// ```
pub fn decode(buf: &[u8]) -> Result<Option<(u32, usize)>, DecodeError> {
    let mut value = 0u32;
    let mut shift = 0u32;

    for (i, &byte) in buf.iter().take(VARBYTEINT_MAX_BYTES).enumerate() {
        value |= ((byte & VARBYTEINT_MASK) as u32) << shift;
        if byte & VARBYTEINT_FIN_MASK == 0 {
            return Ok(Some((value, i + 1)));
        }
        shift += 7;
    }

    if buf.len() >= VARBYTEINT_MAX_BYTES {
        return Err(DecodeError::InvalidVarInt);
    }

    Ok(None)
}

/// Number of bytes needed to encode `value`, or 0 if it is not encodable.
///
/// # Example
/// ```
/// use mqwire_protocol::varint::encoded_len;
/// assert_eq!(encoded_len(127), 1);
/// assert_eq!(encoded_len(128), 2);
/// assert_eq!(encoded_len(268_435_456), 0);
/// ```
pub fn encoded_len(value: u32) -> usize {
    match value {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        2_097_152..=VARBYTEINT_MAX => 4,
        _ => 0,
    }
}

/// Rejects values that do not fit in four groups.
pub fn check(value: usize, field: &'static str) -> Result<u32, EncodeError> {
    if value > VARBYTEINT_MAX as usize {
        return Err(EncodeError::TooLarge {
            field,
            size: value,
            max: VARBYTEINT_MAX as usize,
        });
    }
    Ok(value as u32)
}

/// Encodes `value` into `buf`, returning the number of bytes used.
///
/// `value` must not exceed [`VARBYTEINT_MAX`]; callers validate with
/// [`check`] first.
pub fn encode_to_slice(mut value: u32, buf: &mut [u8; VARBYTEINT_MAX_BYTES]) -> usize {
    debug_assert!(value <= VARBYTEINT_MAX);
    let mut i = 0;
    loop {
        let mut byte = (value & VARBYTEINT_MASK as u32) as u8;
        value >>= 7;
        if value > 0 {
            byte |= VARBYTEINT_FIN_MASK;
        }
        buf[i] = byte;
        i += 1;
        if value == 0 || i == VARBYTEINT_MAX_BYTES {
            break;
        }
    }
    i
}
