use crate::mpp::checksum::Checksum;

/// Everything `Device::send` can fail with.
///
/// The core performs no retries and no silent recovery; every variant is
/// surfaced to the caller so it can tell "device didn't answer" from
/// "garbled answer" from "device refused the command".
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No carriage-return terminator arrived within the read deadline.
    #[error("timed out waiting for response terminator")]
    Timeout,

    /// The frame parsed but the declared checksum disagrees with the one
    /// recomputed over the received bytes. Indicates wire corruption.
    #[error("checksum mismatch: expected {expected}, got {declared}")]
    InvalidChecksum {
        expected: Checksum,
        declared: Checksum,
    },

    /// The response could not be parsed as a frame, or its body could not be
    /// decoded into the expected record. Carries the raw bytes received.
    #[error("invalid response: {0:02x?}")]
    InvalidResponse(Vec<u8>),

    /// The device explicitly rejected the command (NAK). The frame itself
    /// was well-formed.
    #[error("command not acknowledged by device")]
    NotAcknowledged,

    /// Neither transport kind could open the device node. Carries the cause
    /// from each attempt so a bad path is diagnosable from the message alone.
    #[error("cannot open {path} as USB ({usb}) or serial ({serial})")]
    CannotOpen {
        path: String,
        usb: Box<Error>,
        serial: Box<Error>,
    },

    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
