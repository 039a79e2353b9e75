use bytes::{BufMut, Bytes, BytesMut};

use crate::mpp::checksum::Checksum;

/// Leading marker byte present on every response body, absent from requests.
pub const RESPONSE_MARKER: u8 = b'(';

/// Frame terminator for both directions.
pub const TERMINATOR: u8 = b'\r';

/// Encodes a command's text into its wire frame:
/// `<text><checksum high><checksum low><CR>`.
///
/// The checksum covers the command text only and is sent as two raw bytes,
/// not ASCII hex.
pub fn encode(text: &str) -> Bytes {
    let length = text.len() + Checksum::LENGTH + 1;
    let mut frame = BytesMut::with_capacity(length);

    frame.put_slice(text.as_bytes());
    frame.put_slice(&Checksum::compute(text.as_bytes()).to_bytes());
    frame.put_u8(TERMINATOR);

    // a length mismatch here is an encoder bug, not an environmental fault
    debug_assert_eq!(frame.len(), length);
    frame.freeze()
}

/// A response frame pulled apart into its checked pieces.
///
/// Transient: rebuilt from raw transport bytes on every exchange. The caller
/// compares `declared` against `computed` before trusting `body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Payload text with the leading `(` marker stripped.
    pub body: String,
    /// Checksum embedded in the trailing two body bytes.
    pub declared: Checksum,
    /// Checksum recomputed over marker + payload.
    pub computed: Checksum,
}

impl Frame {
    /// Splits raw transport bytes into body text and checksums.
    ///
    /// The transport may over-read into zero padding; everything after the
    /// first CR is ignored. A missing terminator is a parse failure here -
    /// waiting for more data is the transport's job, not the parser's.
    pub fn parse(raw: &[u8]) -> Result<Self, FrameError> {
        // minimum frame: marker + 2 checksum bytes + CR
        if raw.len() < 4 {
            return Err(FrameError::TooShort(raw.len()));
        }

        let end = raw
            .iter()
            .position(|&b| b == TERMINATOR)
            .ok_or(FrameError::MissingTerminator)?;
        let frame = &raw[..end];

        if frame.len() < RESPONSE_MARKER_LEN + Checksum::LENGTH {
            return Err(FrameError::TooShort(frame.len()));
        }
        if frame[0] != RESPONSE_MARKER {
            return Err(FrameError::BadMarker(frame[0]));
        }

        let checksum_at = frame.len() - Checksum::LENGTH;
        let declared = Checksum::from_bytes([frame[checksum_at], frame[checksum_at + 1]]);
        let computed = Checksum::compute(&frame[..checksum_at]);

        let body = std::str::from_utf8(&frame[RESPONSE_MARKER_LEN..checksum_at])
            .map_err(|_| FrameError::BadEncoding)?
            .to_owned();

        Ok(Self {
            body,
            declared,
            computed,
        })
    }

    /// Whether the declared checksum matches the recomputed one.
    pub fn checksum_valid(&self) -> bool {
        self.declared == self.computed
    }
}

const RESPONSE_MARKER_LEN: usize = 1;

/// Why raw bytes failed to split into a frame. Folded into
/// `Error::InvalidResponse` by the session; kept separate so tests can
/// assert on the exact failure.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame too short ({0} bytes)")]
    TooShort(usize),

    #[error("no carriage-return terminator in frame")]
    MissingTerminator,

    #[error("expected '(' marker, got 0x{0:02x}")]
    BadMarker(u8),

    #[error("frame body is not valid UTF-8")]
    BadEncoding,
}
