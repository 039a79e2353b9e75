//! Response record types, one per device reply shape.
//!
//! Field order in each record matches token order in the wire body exactly;
//! the decoder walks both in lockstep.

use bitflags::bitflags;
use num_enum::TryFromPrimitive;
use serde::Serialize;

use crate::mpp::command::{Command, CommandType, Query};
use crate::mpp::decoder::{DecodeError, FieldReader, Response};

/// Converts a decimal wire token into a `num_enum` value.
fn enum_field<T>(reader: &mut FieldReader, field: &str) -> Result<T, DecodeError>
where
    T: TryFromPrimitive<Primitive = u8>,
{
    let (token, path) = reader.token(field)?;
    let raw: u8 = token
        .parse()
        .map_err(|_| DecodeError::bad_token(path.clone(), token, "enum"))?;
    T::try_from_primitive(raw).map_err(|_| DecodeError::bad_token(path, token, "enum"))
}

// {{{ ProtocolId

/// Device protocol ID, from a `PI<NN>` body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ProtocolId(pub u32);

impl Response for ProtocolId {
    fn decode(body: &str) -> Result<Self, DecodeError> {
        // (PI30
        let id = body
            .strip_prefix("PI")
            .filter(|digits| !digits.is_empty())
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| DecodeError::bad_token("protocol_id", body, "PI<NN>"))?;
        Ok(Self(id))
    }
}

impl std::fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `QPI`
#[derive(Copy, Clone, Debug, Default)]
pub struct ProtocolIdQuery;

impl Command for ProtocolIdQuery {
    type Response = ProtocolId;

    fn command_type() -> CommandType {
        CommandType::Query(Query::ProtocolId)
    }
}

// }}}

// {{{ SerialNumber

/// Device serial number, the whole body verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SerialNumber(pub String);

impl Response for SerialNumber {
    fn decode(body: &str) -> Result<Self, DecodeError> {
        // (92631807100358
        if body.is_empty() {
            return Err(DecodeError::bad_token("serial_number", body, "serial number"));
        }
        Ok(Self(body.to_owned()))
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `QID`
#[derive(Copy, Clone, Debug, Default)]
pub struct SerialNumberQuery;

impl Command for SerialNumberQuery {
    type Response = SerialNumber;

    fn command_type() -> CommandType {
        CommandType::Query(Query::SerialNumber)
    }
}

// }}}

// {{{ FirmwareVersion

/// CPU firmware version: two dot-separated hexadecimal fields embedded in
/// one `VERFW:`-prefixed token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FirmwareVersion {
    pub series: u32,
    pub version: u8,
}

impl FirmwareVersion {
    /// Parses the `00123.01` part: 5 hex digits, a dot, 2 hex digits.
    pub fn from_wire(text: &str) -> Option<Self> {
        let (series, version) = text.split_once('.')?;
        if series.len() != 5 || version.len() != 2 {
            return None;
        }
        Some(Self {
            series: u32::from_str_radix(series, 16).ok()?,
            version: u8::from_str_radix(version, 16).ok()?,
        })
    }
}

impl Response for FirmwareVersion {
    fn decode(body: &str) -> Result<Self, DecodeError> {
        // (VERFW:00123.01 or (VERFW2:00123.01
        body.strip_prefix("VERFW")
            .map(|rest| rest.strip_prefix('2').unwrap_or(rest))
            .and_then(|rest| rest.strip_prefix(':'))
            .and_then(Self::from_wire)
            .ok_or_else(|| DecodeError::bad_token("firmware_version", body, "VERFW:<series>.<version>"))
    }
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:05X}.{:02X}", self.series, self.version)
    }
}

/// `QVFW`
#[derive(Copy, Clone, Debug, Default)]
pub struct FirmwareVersionQuery;

impl Command for FirmwareVersionQuery {
    type Response = FirmwareVersion;

    fn command_type() -> CommandType {
        CommandType::Query(Query::FirmwareVersion)
    }
}

/// `QVFW2`
#[derive(Copy, Clone, Debug, Default)]
pub struct FirmwareVersion2Query;

impl Command for FirmwareVersion2Query {
    type Response = FirmwareVersion;

    fn command_type() -> CommandType {
        CommandType::Query(Query::FirmwareVersion2)
    }
}

// }}}

// {{{ DeviceMode

/// Operating mode, a single-letter body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceMode {
    PowerOn,
    Standby,
    Line,
    Battery,
    Fault,
    PowerSaving,
}

impl Response for DeviceMode {
    fn decode(body: &str) -> Result<Self, DecodeError> {
        // (B
        match body {
            "P" => Ok(Self::PowerOn),
            "S" => Ok(Self::Standby),
            "L" => Ok(Self::Line),
            "B" => Ok(Self::Battery),
            "F" => Ok(Self::Fault),
            "H" => Ok(Self::PowerSaving),
            _ => Err(DecodeError::bad_token("device_mode", body, "mode letter")),
        }
    }
}

impl std::fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PowerOn => "power on",
            Self::Standby => "standby",
            Self::Line => "line",
            Self::Battery => "battery",
            Self::Fault => "fault",
            Self::PowerSaving => "power saving",
        };
        f.write_str(name)
    }
}

/// `QMOD`
#[derive(Copy, Clone, Debug, Default)]
pub struct ModeQuery;

impl Command for ModeQuery {
    type Response = DeviceMode;

    fn command_type() -> CommandType {
        CommandType::Query(Query::Mode)
    }
}

// }}}

// {{{ GeneralStatus

bitflags! {
    /// Device status bits from the QPIGS 8-character bundle, b7 first on the
    /// wire.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
    pub struct DeviceStatus: u8 {
        const AC_CHARGING_ON          = 1 << 0;
        const SCC_CHARGING_ON         = 1 << 1;
        const CHARGING_ON             = 1 << 2;
        const BATTERY_VOLTAGE_STEADY  = 1 << 3;
        const LOAD_ON                 = 1 << 4;
        const SCC_FIRMWARE_UPDATED    = 1 << 5;
        const CONFIGURATION_CHANGED   = 1 << 6;
        const ADD_SBU_PRIORITY_VERSION = 1 << 7;
    }
}

bitflags! {
    /// Trailing QPIGS 3-character status bundle.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
    pub struct DeviceStatus2: u8 {
        const DUSTPROOF_INSTALLED = 1 << 0;
        const SWITCH_ON           = 1 << 1;
        const CHARGING_TO_FLOAT   = 1 << 2;
    }
}

/// General status parameters (`QPIGS`), the full 21-token body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneralStatus {
    /// Grid voltage, V.
    pub grid_voltage: f32,
    /// Grid frequency, Hz.
    pub grid_frequency: f32,
    /// AC output voltage, V.
    pub output_voltage: f32,
    /// AC output frequency, Hz.
    pub output_frequency: f32,
    /// AC output apparent power, VA.
    pub output_apparent_power: u32,
    /// AC output active power, W.
    pub output_active_power: u32,
    /// Output load percent.
    pub output_load_percent: u32,
    /// BUS voltage, V.
    pub bus_voltage: u32,
    /// Battery voltage, V.
    pub battery_voltage: f32,
    /// Battery charging current, A.
    pub battery_charging_current: u32,
    /// Battery capacity, %.
    pub battery_capacity: u32,
    /// Inverter heat sink temperature, degrees C.
    pub heat_sink_temperature: i32,
    /// PV input current for battery, A.
    pub solar_input_current: u32,
    /// PV input voltage, V.
    pub solar_input_voltage: f32,
    /// Battery voltage from SCC, V.
    pub battery_voltage_scc: f32,
    /// Battery discharge current, A.
    pub battery_discharge_current: u32,
    pub status: DeviceStatus,
    /// Battery voltage offset for fans, 10mV units.
    pub battery_voltage_offset: u32,
    pub eeprom_version: u32,
    /// PV charging power, W.
    pub pv_charging_power: u32,
    pub status2: DeviceStatus2,
}

impl Response for GeneralStatus {
    fn decode(body: &str) -> Result<Self, DecodeError> {
        // (BBB.B CC.C DDD.D EE.E FFFF GGGG HHH III JJ.JJ KKK OOO TTTT EEEE UUU.U WW.WW PPPPP b7b6b5b4b3b2b1b0 QQ VV MMMMM b10b9b8
        let mut r = FieldReader::new("general_status", body);
        Ok(Self {
            grid_voltage: r.float("grid_voltage")?,
            grid_frequency: r.float("grid_frequency")?,
            output_voltage: r.float("output_voltage")?,
            output_frequency: r.float("output_frequency")?,
            output_apparent_power: r.integer("output_apparent_power")?,
            output_active_power: r.integer("output_active_power")?,
            output_load_percent: r.integer("output_load_percent")?,
            bus_voltage: r.integer("bus_voltage")?,
            battery_voltage: r.float("battery_voltage")?,
            battery_charging_current: r.integer("battery_charging_current")?,
            battery_capacity: r.integer("battery_capacity")?,
            heat_sink_temperature: r.integer("heat_sink_temperature")?,
            solar_input_current: r.integer("solar_input_current")?,
            solar_input_voltage: r.float("solar_input_voltage")?,
            battery_voltage_scc: r.float("battery_voltage_scc")?,
            battery_discharge_current: r.integer("battery_discharge_current")?,
            status: DeviceStatus::from_bits_retain(r.bits("status", 8)?),
            battery_voltage_offset: r.integer("battery_voltage_offset")?,
            eeprom_version: r.integer("eeprom_version")?,
            pv_charging_power: r.integer("pv_charging_power")?,
            status2: DeviceStatus2::from_bits_retain(r.bits("status2", 3)?),
        })
    }
}

/// `QPIGS`
#[derive(Copy, Clone, Debug, Default)]
pub struct GeneralStatusQuery;

impl Command for GeneralStatusQuery {
    type Response = GeneralStatus;

    fn command_type() -> CommandType {
        CommandType::Query(Query::GeneralStatus)
    }
}

// }}}

// {{{ DeviceRating

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, TryFromPrimitive)]
#[repr(u8)]
pub enum BatteryType {
    Agm = 0,
    Flooded = 1,
    User = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, TryFromPrimitive)]
#[repr(u8)]
pub enum InputVoltageRange {
    Appliance = 0,
    Ups = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, TryFromPrimitive)]
#[repr(u8)]
pub enum OutputSourcePriority {
    UtilityFirst = 0,
    SolarFirst = 1,
    SbuFirst = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, TryFromPrimitive)]
#[repr(u8)]
pub enum ChargerSourcePriority {
    UtilityFirst = 0,
    SolarFirst = 1,
    SolarAndUtility = 2,
    SolarOnly = 3,
}

/// Transmitted as a 2-bit token, so decoded through the bit-bundle rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, TryFromPrimitive)]
#[repr(u8)]
pub enum MachineType {
    GridTie = 0b00,
    OffGrid = 0b01,
    Hybrid = 0b10,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, TryFromPrimitive)]
#[repr(u8)]
pub enum OutputMode {
    SingleMachine = 0,
    Parallel = 1,
    Phase1Of3 = 2,
    Phase2Of3 = 3,
    Phase3Of3 = 4,
}

/// Device rating information (`QPIRI`).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceRating {
    /// Grid rating voltage, V.
    pub grid_rating_voltage: f32,
    /// Grid rating current, A.
    pub grid_rating_current: f32,
    /// AC output rating voltage, V.
    pub output_rating_voltage: f32,
    /// AC output rating frequency, Hz.
    pub output_rating_frequency: f32,
    /// AC output rating current, A.
    pub output_rating_current: f32,
    /// AC output rating apparent power, VA.
    pub output_rating_apparent_power: u32,
    /// AC output rating active power, W.
    pub output_rating_active_power: u32,
    /// Battery rating voltage, V.
    pub battery_rating_voltage: f32,
    /// Battery re-charge voltage, V.
    pub battery_recharge_voltage: f32,
    /// Battery under voltage, V.
    pub battery_under_voltage: f32,
    /// Battery bulk charging voltage, V.
    pub battery_bulk_voltage: f32,
    /// Battery float charging voltage, V.
    pub battery_float_voltage: f32,
    pub battery_type: BatteryType,
    /// Max AC charging current, A.
    pub max_ac_charging_current: u32,
    /// Max charging current, A.
    pub max_charging_current: u32,
    pub input_voltage_range: InputVoltageRange,
    pub output_source_priority: OutputSourcePriority,
    pub charger_source_priority: ChargerSourcePriority,
    pub parallel_max_number: u8,
    pub machine_type: MachineType,
    /// 0 = transformerless, 1 = transformer.
    pub topology: u8,
    pub output_mode: OutputMode,
    /// Battery re-discharge voltage, V.
    pub battery_redischarge_voltage: f32,
    /// Whether every unit in parallel must report PV OK.
    pub pv_ok_condition_parallel: bool,
    /// Whether PV input power is balanced across the charger and load.
    pub pv_power_balance: bool,
}

impl Response for DeviceRating {
    fn decode(body: &str) -> Result<Self, DecodeError> {
        // (BBB.B CC.C DDD.D EE.E FF.F HHHH IIII JJ.J KK.K JJ.J KK.K LL.L O PP QQ0 O P Q R SS T U VV.V W X
        let mut r = FieldReader::new("device_rating", body);
        Ok(Self {
            grid_rating_voltage: r.float("grid_rating_voltage")?,
            grid_rating_current: r.float("grid_rating_current")?,
            output_rating_voltage: r.float("output_rating_voltage")?,
            output_rating_frequency: r.float("output_rating_frequency")?,
            output_rating_current: r.float("output_rating_current")?,
            output_rating_apparent_power: r.integer("output_rating_apparent_power")?,
            output_rating_active_power: r.integer("output_rating_active_power")?,
            battery_rating_voltage: r.float("battery_rating_voltage")?,
            battery_recharge_voltage: r.float("battery_recharge_voltage")?,
            battery_under_voltage: r.float("battery_under_voltage")?,
            battery_bulk_voltage: r.float("battery_bulk_voltage")?,
            battery_float_voltage: r.float("battery_float_voltage")?,
            battery_type: enum_field(&mut r, "battery_type")?,
            max_ac_charging_current: r.integer("max_ac_charging_current")?,
            max_charging_current: r.integer("max_charging_current")?,
            input_voltage_range: enum_field(&mut r, "input_voltage_range")?,
            output_source_priority: enum_field(&mut r, "output_source_priority")?,
            charger_source_priority: enum_field(&mut r, "charger_source_priority")?,
            parallel_max_number: r.integer("parallel_max_number")?,
            machine_type: {
                let raw: u8 = r.bits("machine_type", 2)?;
                MachineType::try_from_primitive(raw)
                    .map_err(|_| DecodeError::bad_token("device_rating.machine_type", raw.to_string(), "machine type"))?
            },
            topology: r.integer("topology")?,
            output_mode: enum_field(&mut r, "output_mode")?,
            battery_redischarge_voltage: r.float("battery_redischarge_voltage")?,
            pv_ok_condition_parallel: r.boolean("pv_ok_condition_parallel")?,
            pv_power_balance: r.boolean("pv_power_balance")?,
        })
    }
}

/// `QPIRI`
#[derive(Copy, Clone, Debug, Default)]
pub struct RatingQuery;

impl Command for RatingQuery {
    type Response = DeviceRating;

    fn command_type() -> CommandType {
        CommandType::Query(Query::RatingInformation)
    }
}

// }}}

// {{{ FlagStatus

bitflags! {
    /// The nine settable device flags, one letter each on the wire.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
    pub struct DeviceFlags: u16 {
        /// A: silence buzzer or open buzzer
        const BUZZER              = 1 << 0;
        /// B: overload bypass
        const OVERLOAD_BYPASS     = 1 << 1;
        /// J: power saving
        const POWER_SAVING        = 1 << 2;
        /// K: LCD escape to default page after 1min timeout
        const DISPLAY_TIMEOUT     = 1 << 3;
        /// U: overload restart
        const OVERLOAD_RESTART    = 1 << 4;
        /// V: over temperature restart
        const TEMPERATURE_RESTART = 1 << 5;
        /// X: backlight on
        const BACKLIGHT           = 1 << 6;
        /// Y: alarm on when primary source interrupts
        const ALARM               = 1 << 7;
        /// Z: fault code record
        const RECORD_FAULT        = 1 << 8;
    }
}

const FLAG_LETTERS: [(DeviceFlags, char); 9] = [
    (DeviceFlags::BUZZER, 'a'),
    (DeviceFlags::OVERLOAD_BYPASS, 'b'),
    (DeviceFlags::POWER_SAVING, 'j'),
    (DeviceFlags::DISPLAY_TIMEOUT, 'k'),
    (DeviceFlags::OVERLOAD_RESTART, 'u'),
    (DeviceFlags::TEMPERATURE_RESTART, 'v'),
    (DeviceFlags::BACKLIGHT, 'x'),
    (DeviceFlags::ALARM, 'y'),
    (DeviceFlags::RECORD_FAULT, 'z'),
];

impl DeviceFlags {
    /// The wire letters for the set flags, in documented order.
    pub fn letters(self) -> String {
        FLAG_LETTERS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, letter)| letter)
            .collect()
    }

    /// Device firmware is inconsistent about letter case, so accept both.
    pub fn from_letter(letter: char) -> Option<Self> {
        let letter = letter.to_ascii_lowercase();
        FLAG_LETTERS
            .iter()
            .find(|(_, l)| *l == letter)
            .map(|(flag, _)| *flag)
    }
}

/// Flag status (`QFLAG`): which flags are enabled and which disabled,
/// encoded as letter runs prefixed by `E` and `D`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlagStatus {
    pub enabled: DeviceFlags,
    pub disabled: DeviceFlags,
}

impl Response for FlagStatus {
    fn decode(body: &str) -> Result<Self, DecodeError> {
        // (EakxyzDbjuv
        let mut enabled = DeviceFlags::empty();
        let mut disabled = DeviceFlags::empty();
        let mut current: Option<&mut DeviceFlags> = None;

        for letter in body.chars() {
            match letter.to_ascii_uppercase() {
                'E' => current = Some(&mut enabled),
                'D' => current = Some(&mut disabled),
                _ => {
                    let flag = DeviceFlags::from_letter(letter)
                        .ok_or_else(|| DecodeError::bad_token("flag_status", body, "flag letter"))?;
                    match current {
                        Some(ref mut group) => group.insert(flag),
                        None => {
                            return Err(DecodeError::bad_token("flag_status", body, "E or D prefix"))
                        }
                    }
                }
            }
        }

        if current.is_none() {
            return Err(DecodeError::bad_token("flag_status", body, "E or D prefix"));
        }
        Ok(Self { enabled, disabled })
    }
}

/// `QFLAG`
#[derive(Copy, Clone, Debug, Default)]
pub struct FlagStatusQuery;

impl Command for FlagStatusQuery {
    type Response = FlagStatus;

    fn command_type() -> CommandType {
        CommandType::Query(Query::FlagStatus)
    }
}

// }}}

// {{{ WarningStatus

bitflags! {
    /// Warning status bits (`QPIWS`), one body character per bit with a31
    /// leftmost.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
    pub struct WarningStatus: u32 {
        const INVERTER_FAULT        = 1 << 1;
        const BUS_OVER              = 1 << 2;
        const BUS_UNDER             = 1 << 3;
        const BUS_SOFT_FAIL         = 1 << 4;
        const LINE_FAIL             = 1 << 5;
        const OPV_SHORT             = 1 << 6;
        const INVERTER_VOLTAGE_LOW  = 1 << 7;
        const INVERTER_VOLTAGE_HIGH = 1 << 8;
        const OVER_TEMPERATURE      = 1 << 9;
        const FAN_LOCKED            = 1 << 10;
        const BATTERY_VOLTAGE_HIGH  = 1 << 11;
        const BATTERY_LOW_ALARM     = 1 << 12;
        const BATTERY_SHUTDOWN      = 1 << 14;
        const OVERLOAD              = 1 << 16;
        const EEPROM_FAULT          = 1 << 17;
        const INVERTER_OVER_CURRENT = 1 << 18;
        const INVERTER_SOFT_FAIL    = 1 << 19;
        const SELF_TEST_FAIL        = 1 << 20;
        const OP_DC_VOLTAGE_OVER    = 1 << 21;
        const BATTERY_OPEN          = 1 << 22;
        const CURRENT_SENSOR_FAIL   = 1 << 23;
        const BATTERY_SHORT         = 1 << 24;
        const POWER_LIMIT           = 1 << 25;
        const PV_VOLTAGE_HIGH       = 1 << 26;
        const MPPT_OVERLOAD_FAULT   = 1 << 27;
        const MPPT_OVERLOAD_WARNING = 1 << 28;
        const BATTERY_LOW_CHARGE    = 1 << 29;
    }
}

impl Response for WarningStatus {
    fn decode(body: &str) -> Result<Self, DecodeError> {
        // (00000000000000000000000000000110
        // some firmwares append extra reserved bits; the documented 32 come first
        if body.len() < 32 || !body.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(DecodeError::bad_token("warning_status", body, "32 warning bits"));
        }
        let raw = u32::from_str_radix(&body[..32], 2)
            .map_err(|_| DecodeError::bad_token("warning_status", body, "32 warning bits"))?;
        Ok(Self::from_bits_retain(raw))
    }
}

/// `QPIWS`
#[derive(Copy, Clone, Debug, Default)]
pub struct WarningStatusQuery;

impl Command for WarningStatusQuery {
    type Response = WarningStatus;

    fn command_type() -> CommandType {
        CommandType::Query(Query::WarningStatus)
    }
}

// }}}

// {{{ Acknowledgement

/// Two-valued reply to setting commands. The session maps `NAK` to
/// `Error::NotAcknowledged` before decoding, so callers normally only ever
/// see the affirmative variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Acknowledgement {
    Acknowledged,
    NotAcknowledged,
}

/// Body of a negative acknowledgement.
pub const NAK_BODY: &str = "NAK";

impl Response for Acknowledgement {
    fn decode(body: &str) -> Result<Self, DecodeError> {
        match body {
            "ACK" => Ok(Self::Acknowledged),
            NAK_BODY => Ok(Self::NotAcknowledged),
            _ => Err(DecodeError::bad_token("acknowledgement", body, "ACK or NAK")),
        }
    }
}

// }}}
