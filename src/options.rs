use clap::{Parser, Subcommand};

/// MPP Solar - query and control MPP Solar inverters
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Options {
    /// Device node to talk to (USB raw HID node or serial port)
    #[clap(short = 'd', long = "device", default_value = "/dev/hidraw0")]
    pub device: String,

    /// Response read timeout in seconds
    #[clap(short = 't', long = "timeout", default_value_t = 5)]
    pub timeout: u64,

    /// Print responses as JSON
    #[clap(long = "json")]
    pub json: bool,

    #[clap(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Query the device protocol ID (QPI)
    ProtocolId,
    /// Query the device serial number (QID)
    SerialNumber,
    /// Query the main CPU firmware version (QVFW)
    Firmware,
    /// Query the secondary CPU firmware version (QVFW2)
    Firmware2,
    /// Query device rating information (QPIRI)
    Rating,
    /// Query flag status (QFLAG)
    Flags,
    /// Query general status parameters (QPIGS)
    Status,
    /// Query the device mode (QMOD)
    Mode,
    /// Query warning status (QPIWS)
    Warnings,
    /// Set the output rating frequency (F50/F60)
    SetFrequency {
        /// Frequency in Hz, 50 or 60
        hz: u8,
    },
    /// Enable device flags (PE), e.g. "ab" for buzzer + overload bypass
    EnableFlags {
        /// Flag letters from the set a b j k u v x y z
        letters: String,
    },
    /// Disable device flags (PD)
    DisableFlags {
        /// Flag letters from the set a b j k u v x y z
        letters: String,
    },
    /// Reset control parameters to factory defaults (PF)
    ResetDefaults,
    /// Send a raw command and print the response body
    Raw {
        /// Command text, e.g. "QPIGS"
        text: String,
    },
}

impl Options {
    pub fn new() -> Self {
        Self::parse()
    }
}
