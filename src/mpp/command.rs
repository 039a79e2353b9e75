use serde::Serialize;

use crate::mpp::decoder::Response;
use crate::mpp::records::{Acknowledgement, DeviceFlags};

/// A request the host can issue.
///
/// The associated `Response` type pins each command to the one record shape
/// its reply decodes into, so a command can never be paired with the wrong
/// decoder.
pub trait Command {
    type Response: Response;

    fn command_type() -> CommandType;

    /// Wire text: the mnemonic, plus encoded parameters for settings.
    fn encode(&self) -> String {
        Self::command_type().mnemonic().to_owned()
    }
}

/// Every command mnemonic the device understands, split into read-only
/// queries and state-changing settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandType {
    Query(Query),
    Setting(Setting),
}

impl CommandType {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Query(query) => query.mnemonic(),
            Self::Setting(setting) => setting.mnemonic(),
        }
    }

    pub fn from_mnemonic(text: &str) -> Option<Self> {
        Query::from_mnemonic(text)
            .map(Self::Query)
            .or_else(|| Setting::from_mnemonic(text).map(Self::Setting))
    }
}

impl std::fmt::Display for CommandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

macro_rules! mnemonics {
    ($name:ident { $($(#[$doc:meta])* $variant:ident => $text:literal,)* }) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$doc])* $variant,)*
        }

        impl $name {
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }

            pub fn from_mnemonic(text: &str) -> Option<Self> {
                match text {
                    $($text => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

mnemonics!(Query {
    /// Device protocol ID inquiry
    ProtocolId => "QPI",
    /// Device serial number inquiry
    SerialNumber => "QID",
    /// Main CPU firmware version inquiry
    FirmwareVersion => "QVFW",
    /// Secondary CPU firmware version inquiry
    FirmwareVersion2 => "QVFW2",
    /// Device rating information inquiry
    RatingInformation => "QPIRI",
    /// Device flag status inquiry
    FlagStatus => "QFLAG",
    /// Device general status parameters inquiry
    GeneralStatus => "QPIGS",
    /// Device mode inquiry
    Mode => "QMOD",
    /// Device warning status inquiry
    WarningStatus => "QPIWS",
    /// Default setting value information inquiry
    DefaultSetting => "QDI",
    /// Selectable max charging current inquiry
    MaxChargingCurrent => "QMCHGCR",
    /// Selectable max utility charging current inquiry
    MaxUtilityChargingCurrent => "QMUCHGCR",
    /// DSP bootstrap inquiry
    DspBootstrap => "QBOOT",
    /// Output mode inquiry
    OutputMode => "QOPM",
});

mnemonics!(Setting {
    /// Enable flag group
    FlagEnable => "PE",
    /// Disable flag group
    FlagDisable => "PD",
    /// Reset control parameters to default values
    Reset => "PF",
    /// Set device output rating frequency
    Frequency => "F",
});

// {{{ setting commands

/// Output rating frequency the device can be switched to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum OutputFrequency {
    Hz50 = 50,
    Hz60 = 60,
}

impl std::fmt::Display for OutputFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Hz", *self as u8)
    }
}

/// `F<value>`: set the output rating frequency.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SetOutputFrequency(pub OutputFrequency);

impl Command for SetOutputFrequency {
    type Response = Acknowledgement;

    fn command_type() -> CommandType {
        CommandType::Setting(Setting::Frequency)
    }

    fn encode(&self) -> String {
        format!("F{}", self.0 as u8)
    }
}

/// `PE<letters>`: enable a group of device flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EnableFlags(pub DeviceFlags);

impl Command for EnableFlags {
    type Response = Acknowledgement;

    fn command_type() -> CommandType {
        CommandType::Setting(Setting::FlagEnable)
    }

    fn encode(&self) -> String {
        format!("PE{}", self.0.letters())
    }
}

/// `PD<letters>`: disable a group of device flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DisableFlags(pub DeviceFlags);

impl Command for DisableFlags {
    type Response = Acknowledgement;

    fn command_type() -> CommandType {
        CommandType::Setting(Setting::FlagDisable)
    }

    fn encode(&self) -> String {
        format!("PD{}", self.0.letters())
    }
}

/// `PF`: reset all control parameters to factory defaults.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResetToDefault;

impl Command for ResetToDefault {
    type Response = Acknowledgement;

    fn command_type() -> CommandType {
        CommandType::Setting(Setting::Reset)
    }
}

// }}}
