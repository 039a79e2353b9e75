use crate::prelude::*;

use std::time::Duration;

use crate::mpp::command::Command;
use crate::mpp::decoder::Response;
use crate::mpp::frame::{self, Frame};
use crate::mpp::records::NAK_BODY;
use crate::mpp::transport::{SerialTransport, Transport, UsbTransport};

/// How long to wait for a response terminator before giving up.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 5;

/// Exclusive handle to an opened transport.
///
/// Opening tries each transport kind in order - USB raw node first, then
/// serial line - and keeps the first that opens. The underlying device
/// handle is owned by exactly one `Connection` and released on drop.
pub struct Connection {
    transport: Box<dyn Transport>,
}

impl Connection {
    pub async fn open(path: &str) -> Result<Self> {
        let usb_err = match UsbTransport::open(path).await {
            Ok(usb) => return Ok(Self::usb(usb)),
            Err(usb_err) => usb_err,
        };
        debug!("USB open of {} failed ({}), trying serial", path, usb_err);

        match SerialTransport::open(path) {
            Ok(serial) => Ok(Self::serial(serial)),
            Err(serial_err) => Err(Error::CannotOpen {
                path: path.to_owned(),
                usb: Box::new(usb_err),
                serial: Box::new(serial_err),
            }),
        }
    }

    pub fn usb(transport: UsbTransport) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    pub fn serial(transport: SerialTransport) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Wraps an arbitrary transport; used by tests to substitute a mock.
    pub fn custom(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }
}

/// One inverter at the end of a connection.
///
/// The protocol is strict request-then-response with no pipelining, so every
/// method takes `&mut self`: at most one exchange can be in flight per
/// device, enforced at compile time.
pub struct Device {
    connection: Connection,
    read_timeout: Duration,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl Device {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        }
    }

    /// Opens the device node at `path` (USB first, serial fallback).
    pub async fn open(path: &str) -> Result<Self> {
        Ok(Self::new(Connection::open(path).await?))
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Performs one typed request/response exchange.
    pub async fn send<C: Command>(&mut self, command: &C) -> Result<C::Response> {
        let text = command.encode();
        let (frame, raw) = self.exchange(&text).await?;

        C::Response::from_frame(&frame).map_err(|decode_err| {
            error!("decoding {} response failed: {}", C::command_type(), decode_err);
            Error::InvalidResponse(raw)
        })
    }

    /// Performs one exchange and returns the validated body text without
    /// structured decoding, for ad hoc/diagnostic commands.
    pub async fn send_raw(&mut self, text: &str) -> Result<String> {
        let (frame, _) = self.exchange(text).await?;
        Ok(frame.body)
    }

    /// Shared pipeline: encode, write, read to terminator, parse, validate
    /// checksum, reject NAK. Returns the parsed frame plus the raw bytes so
    /// decode failures can surface them.
    async fn exchange(&mut self, text: &str) -> Result<(Frame, Vec<u8>)> {
        let request = frame::encode(text);
        debug!("TX {}: {:02x?}", text, &request[..]);

        self.connection.transport.write_frame(&request).await?;
        let raw = self.connection.transport.read_frame(self.read_timeout).await?;
        debug!("RX {} bytes: {:02x?}", raw.len(), raw);

        let frame = match Frame::parse(&raw) {
            Ok(frame) => frame,
            Err(parse_err) => {
                error!("response to {} unparseable: {}", text, parse_err);
                return Err(Error::InvalidResponse(raw));
            }
        };

        if !frame.checksum_valid() {
            return Err(Error::InvalidChecksum {
                expected: frame.computed,
                declared: frame.declared,
            });
        }

        if frame.body == NAK_BODY {
            return Err(Error::NotAcknowledged);
        }

        Ok((frame, raw))
    }
}
