use crate::prelude::*;

use {
    async_trait::async_trait,
    bytes::BytesMut,
    std::time::Duration,
    tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    tokio_serial::SerialPortBuilderExt,
};

use crate::mpp::frame::TERMINATOR;

/// Line settings for the inverter's serial port.
pub const BAUD_RATE: u32 = 2400;

const READ_CHUNK_SIZE: usize = 256;

/// One byte channel to the device.
///
/// `write_frame` sends the whole buffer in one logical operation; a short
/// write is surfaced as an I/O error, never retried. `read_frame` keeps
/// issuing low-level reads until the accumulated buffer contains a
/// carriage-return, or fails with `Error::Timeout` when the deadline
/// elapses, discarding whatever partial bytes arrived.
#[async_trait]
pub trait Transport: Send {
    async fn write_frame(&mut self, bytes: &[u8]) -> Result<()>;

    async fn read_frame(&mut self, timeout: Duration) -> Result<Vec<u8>>;
}

/// Accumulates reads until a terminator shows up. Raced against the deadline
/// by the callers below; the underlying reads have no native timeout.
async fn read_until_terminator<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin + Send,
{
    let mut buffer = BytesMut::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "device closed before response terminator",
            )));
        }
        buffer.extend_from_slice(&chunk[..n]);

        if buffer.contains(&TERMINATOR) {
            return Ok(buffer.to_vec());
        }
        trace!("read {} bytes, no terminator yet", buffer.len());
    }
}

async fn write_all_checked<W>(writer: &mut W, bytes: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    writer.write_all(bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Raw device-file transport for USB HID nodes like `/dev/hidraw0`.
///
/// Owns the file handle exclusively; the descriptor is closed when the
/// transport is dropped.
pub struct UsbTransport {
    path: String,
    file: tokio::fs::File,
}

impl UsbTransport {
    pub async fn open(path: &str) -> Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .await?;
        debug!("opened USB device {}", path);
        Ok(Self {
            path: path.to_owned(),
            file,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl Transport for UsbTransport {
    async fn write_frame(&mut self, bytes: &[u8]) -> Result<()> {
        write_all_checked(&mut self.file, bytes).await
    }

    async fn read_frame(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        match tokio::time::timeout(timeout, read_until_terminator(&mut self.file)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        }
    }
}

/// Serial-line transport, fixed 2400 baud 8N1 as the device expects.
pub struct SerialTransport {
    path: String,
    stream: tokio_serial::SerialStream,
}

impl SerialTransport {
    pub fn open(path: &str) -> Result<Self> {
        let mut stream = tokio_serial::new(path, BAUD_RATE)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()?;

        #[cfg(unix)]
        stream.set_exclusive(true)?;

        debug!("opened serial device {} at {} baud", path, BAUD_RATE);
        Ok(Self {
            path: path.to_owned(),
            stream,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn write_frame(&mut self, bytes: &[u8]) -> Result<()> {
        write_all_checked(&mut self.stream, bytes).await
    }

    async fn read_frame(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        match tokio::time::timeout(timeout, read_until_terminator(&mut self.stream)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        }
    }
}
