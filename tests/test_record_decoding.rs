mod common;

use common::*;

use mpp_solar::mpp::decoder::{DecodeError, FieldReader, Response};
use mpp_solar::mpp::records::{
    Acknowledgement, BatteryType, ChargerSourcePriority, DeviceFlags, DeviceMode, DeviceRating,
    DeviceStatus, DeviceStatus2, FirmwareVersion, FlagStatus, GeneralStatus, InputVoltageRange,
    MachineType, OutputMode, OutputSourcePriority, ProtocolId, SerialNumber, WarningStatus,
};

#[test]
fn general_status_decodes_captured_body() {
    let status = GeneralStatus::decode(Factory::qpigs_body()).unwrap();

    assert_eq!(status.grid_voltage, 1.0);
    assert_eq!(status.grid_frequency, 0.0);
    assert_eq!(status.output_voltage, 229.0);
    assert_eq!(status.output_frequency, 60.0);
    assert_eq!(status.output_apparent_power, 0);
    assert_eq!(status.output_active_power, 0);
    assert_eq!(status.output_load_percent, 0);
    assert_eq!(status.bus_voltage, 350);
    assert_eq!(status.battery_voltage, 24.83);
    assert_eq!(status.battery_charging_current, 5);
    assert_eq!(status.battery_capacity, 45);
    assert_eq!(status.heat_sink_temperature, 422);
    assert_eq!(status.solar_input_current, 6);
    assert_eq!(status.solar_input_voltage, 24.5);
    assert_eq!(status.battery_voltage_scc, 24.89);
    assert_eq!(status.battery_discharge_current, 0);
    assert_eq!(
        status.status,
        DeviceStatus::ADD_SBU_PRIORITY_VERSION
            | DeviceStatus::LOAD_ON
            | DeviceStatus::CHARGING_ON
            | DeviceStatus::SCC_CHARGING_ON
    );
    assert_eq!(status.battery_voltage_offset, 0);
    assert_eq!(status.eeprom_version, 3);
    assert_eq!(status.pv_charging_power, 157);
    assert_eq!(status.status2, DeviceStatus2::empty());
}

#[test]
fn integer_radix_follows_token_width() {
    // a token exactly as wide as the type is binary, anything else decimal
    let mut r = FieldReader::new("radix", "00000011 3");
    assert_eq!(r.integer::<u8>("binary").unwrap(), 3);
    assert_eq!(r.integer::<u8>("decimal").unwrap(), 3);
}

#[test]
fn truncated_body_reports_end_of_body() {
    let err = GeneralStatus::decode("001.0 00.0").unwrap_err();
    assert_eq!(
        err,
        DecodeError::EndOfBody {
            path: "general_status.output_voltage".into(),
        }
    );
}

#[test]
fn bad_token_names_field_and_token() {
    let err = GeneralStatus::decode("001.0 bogus 229.0").unwrap_err();
    assert_eq!(
        err,
        DecodeError::BadToken {
            path: "general_status.grid_frequency".into(),
            token: "bogus".into(),
            expected: "float",
        }
    );
}

#[test]
fn consecutive_separators_yield_empty_tokens() {
    // the empty token between the doubled spaces still occupies a field slot
    let err = GeneralStatus::decode("001.0  229.0").unwrap_err();
    assert_eq!(
        err,
        DecodeError::BadToken {
            path: "general_status.grid_frequency".into(),
            token: "".into(),
            expected: "float",
        }
    );
}

#[test]
fn device_rating_decodes_representative_body() {
    let rating = DeviceRating::decode(Factory::qpiri_body()).unwrap();

    assert_eq!(rating.grid_rating_voltage, 230.0);
    assert_eq!(rating.grid_rating_current, 21.7);
    assert_eq!(rating.output_rating_voltage, 230.0);
    assert_eq!(rating.output_rating_frequency, 50.0);
    assert_eq!(rating.output_rating_current, 21.7);
    assert_eq!(rating.output_rating_apparent_power, 5000);
    assert_eq!(rating.output_rating_active_power, 4000);
    assert_eq!(rating.battery_rating_voltage, 48.0);
    assert_eq!(rating.battery_recharge_voltage, 46.0);
    assert_eq!(rating.battery_under_voltage, 42.0);
    assert_eq!(rating.battery_bulk_voltage, 56.4);
    assert_eq!(rating.battery_float_voltage, 54.0);
    assert_eq!(rating.battery_type, BatteryType::Agm);
    assert_eq!(rating.max_ac_charging_current, 10);
    assert_eq!(rating.max_charging_current, 10);
    assert_eq!(rating.input_voltage_range, InputVoltageRange::Ups);
    assert_eq!(rating.output_source_priority, OutputSourcePriority::UtilityFirst);
    assert_eq!(
        rating.charger_source_priority,
        ChargerSourcePriority::UtilityFirst
    );
    assert_eq!(rating.parallel_max_number, 6);
    assert_eq!(rating.machine_type, MachineType::OffGrid);
    assert_eq!(rating.topology, 0);
    assert_eq!(rating.output_mode, OutputMode::SingleMachine);
    assert_eq!(rating.battery_redischarge_voltage, 54.0);
    assert!(!rating.pv_ok_condition_parallel);
    assert!(rating.pv_power_balance);
}

#[test]
fn flag_status_splits_enabled_and_disabled_runs() {
    let flags = FlagStatus::decode("EakxyzDbjuv").unwrap();
    assert_eq!(
        flags.enabled,
        DeviceFlags::BUZZER
            | DeviceFlags::DISPLAY_TIMEOUT
            | DeviceFlags::BACKLIGHT
            | DeviceFlags::ALARM
            | DeviceFlags::RECORD_FAULT
    );
    assert_eq!(
        flags.disabled,
        DeviceFlags::OVERLOAD_BYPASS
            | DeviceFlags::POWER_SAVING
            | DeviceFlags::OVERLOAD_RESTART
            | DeviceFlags::TEMPERATURE_RESTART
    );
}

#[test]
fn flag_status_rejects_letters_before_prefix() {
    assert!(FlagStatus::decode("abz").is_err());
    assert!(FlagStatus::decode("").is_err());
    assert!(FlagStatus::decode("Eaq").is_err());
}

#[test]
fn device_flags_letters_round_trip() {
    let flags = DeviceFlags::BUZZER | DeviceFlags::BACKLIGHT | DeviceFlags::RECORD_FAULT;
    assert_eq!(flags.letters(), "axz");
    for letter in flags.letters().chars() {
        assert!(flags.contains(DeviceFlags::from_letter(letter).unwrap()));
    }
    // firmware sends either case
    assert_eq!(DeviceFlags::from_letter('A'), Some(DeviceFlags::BUZZER));
    assert_eq!(DeviceFlags::from_letter('q'), None);
}

#[test]
fn warning_status_decodes_bit_strings() {
    let none = WarningStatus::decode("00000000000000000000000000000000").unwrap();
    assert!(none.is_empty());

    let fault = WarningStatus::decode("00000000000000000000000000000010").unwrap();
    assert_eq!(fault, WarningStatus::INVERTER_FAULT);

    let two = WarningStatus::decode("00000000000000000000000000000110").unwrap();
    assert_eq!(two, WarningStatus::INVERTER_FAULT | WarningStatus::BUS_OVER);

    let low = WarningStatus::decode("00100000000000000000000000000000").unwrap();
    assert_eq!(low, WarningStatus::BATTERY_LOW_CHARGE);
}

#[test]
fn warning_status_tolerates_extra_reserved_bits() {
    let status = WarningStatus::decode("001000000000000000000000000000000000100").unwrap();
    assert_eq!(status, WarningStatus::BATTERY_LOW_CHARGE);
}

#[test]
fn warning_status_rejects_short_or_non_binary_bodies() {
    assert!(WarningStatus::decode("0000000000000000000000000000001").is_err());
    assert!(WarningStatus::decode("0000000000000000000000000000002x").is_err());
}

#[test]
fn firmware_version_decodes_both_prefixes() {
    let main = FirmwareVersion::decode("VERFW:00079.50").unwrap();
    assert_eq!(main.series, 0x79);
    assert_eq!(main.version, 0x50);
    assert_eq!(main.to_string(), "00079.50");

    let secondary = FirmwareVersion::decode("VERFW2:00123.01").unwrap();
    assert_eq!(secondary.series, 0x123);
    assert_eq!(secondary.version, 0x01);
    assert_eq!(secondary.to_string(), "00123.01");

    let zero = FirmwareVersion::decode("VERFW:00000.00").unwrap();
    assert_eq!(zero.to_string(), "00000.00");
}

#[test]
fn firmware_version_rejects_malformed_bodies() {
    assert!(FirmwareVersion::decode("00123.01").is_err());
    assert!(FirmwareVersion::decode("VERFW:123.01").is_err());
    assert!(FirmwareVersion::decode("VERFW:00123.1").is_err());
    assert!(FirmwareVersion::decode("VERFW:00123").is_err());
    assert!(FirmwareVersion::decode("VERFW:").is_err());
}

#[test]
fn protocol_id_decodes_digits_after_prefix() {
    assert_eq!(ProtocolId::decode("PI30").unwrap(), ProtocolId(30));
    assert!(ProtocolId::decode("PI").is_err());
    assert!(ProtocolId::decode("PI3A").is_err());
    assert!(ProtocolId::decode("XY30").is_err());
}

#[test]
fn serial_number_keeps_body_verbatim() {
    let serial = SerialNumber::decode("92631807100358").unwrap();
    assert_eq!(serial.0, "92631807100358");
    assert_eq!(serial.to_string(), "92631807100358");
    assert!(SerialNumber::decode("").is_err());
}

#[test]
fn device_mode_covers_all_letters() {
    assert_eq!(DeviceMode::decode("P").unwrap(), DeviceMode::PowerOn);
    assert_eq!(DeviceMode::decode("S").unwrap(), DeviceMode::Standby);
    assert_eq!(DeviceMode::decode("L").unwrap(), DeviceMode::Line);
    assert_eq!(DeviceMode::decode("B").unwrap(), DeviceMode::Battery);
    assert_eq!(DeviceMode::decode("F").unwrap(), DeviceMode::Fault);
    assert_eq!(DeviceMode::decode("H").unwrap(), DeviceMode::PowerSaving);
    assert!(DeviceMode::decode("Q").is_err());
    assert!(DeviceMode::decode("").is_err());
}

#[test]
fn acknowledgement_decodes_ack_and_nak() {
    assert_eq!(
        Acknowledgement::decode("ACK").unwrap(),
        Acknowledgement::Acknowledged
    );
    assert_eq!(
        Acknowledgement::decode("NAK").unwrap(),
        Acknowledgement::NotAcknowledged
    );
    assert!(Acknowledgement::decode("OK").is_err());
}
