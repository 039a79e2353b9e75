#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mpp_solar::mpp::checksum::Checksum;
use mpp_solar::mpp::frame::{RESPONSE_MARKER, TERMINATOR};
use mpp_solar::mpp::transport::Transport;
use mpp_solar::{Error, Result};

/// Canned request/response byte vectors captured from a real PIP-series
/// inverter.
pub struct Factory;

impl Factory {
    pub fn qpi_request() -> Vec<u8> {
        vec![0x51, 0x50, 0x49, 0xBE, 0xAC, 0x0D]
    }

    /// `(PI30` with checksum 0x9A0B.
    pub fn qpi_response() -> Vec<u8> {
        vec![40, 80, 73, 51, 48, 154, 11, 13]
    }

    pub fn qid_request() -> Vec<u8> {
        vec![81, 73, 68, 214, 234, 13]
    }

    /// `(92631807100358` with checksum 0x97D9, zero-padded by the HID read.
    pub fn qid_response() -> Vec<u8> {
        vec![
            40, 57, 50, 54, 51, 49, 56, 48, 55, 49, 48, 48, 51, 53, 56, 151, 217, 13, 0, 0, 0, 0,
            0, 0,
        ]
    }

    pub fn qmod_request() -> Vec<u8> {
        vec![81, 77, 79, 68, 73, 193, 13]
    }

    /// `(B` with checksum 0xE7C9.
    pub fn qmod_response() -> Vec<u8> {
        vec![0x28, 0x42, 0xE7, 0xC9, 0x0D, 0, 0, 0]
    }

    pub fn qpigs_request() -> Vec<u8> {
        vec![81, 80, 73, 71, 83, 183, 169, 13]
    }

    pub fn qpigs_body() -> &'static str {
        "001.0 00.0 229.0 60.0 0000 0000 000 350 24.83 005 045 0422 0006 024.5 24.89 00000 10010110 00 03 00157 000"
    }

    /// Full captured QPIGS response, checksum 0xBD73.
    pub fn qpigs_response() -> Vec<u8> {
        let mut raw = Self::response_frame(Self::qpigs_body());
        raw.extend_from_slice(&[0, 0]);
        raw
    }

    /// Representative QPIRI body for a 48V 5kVA unit.
    pub fn qpiri_body() -> &'static str {
        "230.0 21.7 230.0 50.0 21.7 5000 4000 48.0 46.0 42.0 56.4 54.0 0 10 010 1 0 0 6 01 0 0 54.0 0 1"
    }

    /// Builds a well-formed response frame around `body`.
    pub fn response_frame(body: &str) -> Vec<u8> {
        let mut raw = vec![RESPONSE_MARKER];
        raw.extend_from_slice(body.as_bytes());
        let checksum = Checksum::compute(&raw);
        raw.extend_from_slice(&checksum.to_bytes());
        raw.push(TERMINATOR);
        raw
    }

    pub fn ack_response() -> Vec<u8> {
        Self::response_frame("ACK")
    }

    pub fn nak_response() -> Vec<u8> {
        Self::response_frame("NAK")
    }
}

/// What the mock hands back for one exchange.
pub enum MockReply {
    Bytes(Vec<u8>),
    Timeout,
}

/// Scripted transport: records every frame written and plays back queued
/// replies in order.
///
/// The write log is shared so tests can still inspect it after the device
/// has taken ownership of the transport.
pub struct MockTransport {
    written: Arc<Mutex<Vec<Vec<u8>>>>,
    replies: VecDeque<MockReply>,
}

impl MockTransport {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            written: Arc::new(Mutex::new(Vec::new())),
            replies: replies.into(),
        }
    }

    pub fn replying(raw: Vec<u8>) -> Self {
        Self::new(vec![MockReply::Bytes(raw)])
    }

    pub fn write_log(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        self.written.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write_frame(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    async fn read_frame(&mut self, _timeout: Duration) -> Result<Vec<u8>> {
        match self.replies.pop_front() {
            Some(MockReply::Bytes(raw)) => Ok(raw),
            Some(MockReply::Timeout) | None => Err(Error::Timeout),
        }
    }
}
