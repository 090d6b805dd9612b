//! Length-prefixed framing for protocol bodies.
//!
//! Every message on the wire is `<4 ASCII decimal digits><body>`, where the
//! digits give the body length in bytes, zero-padded. Decoding lives in
//! [`super::Reassembler`] because it needs state across reads.

use thiserror::Error;

/// Number of ASCII digits in the length prefix.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Largest body the four-digit prefix can describe.
pub const MAX_BODY_LEN: usize = 9999;

/// Errors raised while framing or unframing protocol bodies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The body does not fit in a four-digit prefix.
    #[error("body of {len} bytes exceeds the {MAX_BODY_LEN} byte frame limit")]
    BodyTooLong {
        /// Length of the rejected body.
        len: usize,
    },
    /// The length prefix contained something other than ASCII digits.
    #[error("length prefix {prefix:?} is not a decimal number")]
    InvalidLengthPrefix {
        /// Raw prefix as received, lossily decoded for display.
        prefix: String,
    },
}

/// Frames `body` for transmission.
///
/// # Errors
///
/// Returns [`FrameError::BodyTooLong`] when the body exceeds [`MAX_BODY_LEN`].
pub fn encode(body: &[u8]) -> Result<Vec<u8>, FrameError> {
    if body.len() > MAX_BODY_LEN {
        return Err(FrameError::BodyTooLong { len: body.len() });
    }
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_LEN + body.len());
    frame.extend_from_slice(format!("{:04}", body.len()).as_bytes());
    frame.extend_from_slice(body);
    Ok(frame)
}

/// Parses a complete four-byte prefix into a body length.
pub(crate) fn parse_prefix(prefix: &[u8]) -> Result<usize, FrameError> {
    let invalid = || FrameError::InvalidLengthPrefix {
        prefix: String::from_utf8_lossy(prefix).into_owned(),
    };
    if prefix.len() != LENGTH_PREFIX_LEN || !prefix.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    prefix.iter().try_fold(0_usize, |total, digit| {
        total
            .checked_mul(10)
            .and_then(|value| value.checked_add(usize::from(digit - b'0')))
            .ok_or_else(invalid)
    })
}
