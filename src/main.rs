use anyhow::{anyhow, Context, Result};
use log::info;
use std::io::Write;
use std::time::Duration;

use mpp_solar::mpp::command::{
    DisableFlags, EnableFlags, OutputFrequency, ResetToDefault, SetOutputFrequency,
};
use mpp_solar::mpp::records::{
    DeviceFlags, FirmwareVersion2Query, FirmwareVersionQuery, FlagStatusQuery, GeneralStatusQuery,
    ModeQuery, ProtocolIdQuery, RatingQuery, SerialNumberQuery, WarningStatusQuery,
};
use mpp_solar::options::{DeviceCommand, Options};
use mpp_solar::Device;

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::new();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        })
        .write_style(env_logger::WriteStyle::Never)
        .init();

    info!(
        "mpp-solar {} using device {}",
        mpp_solar::CARGO_PKG_VERSION,
        options.device
    );

    let mut device = Device::open(&options.device)
        .await
        .with_context(|| format!("opening device {}", options.device))?
        .with_read_timeout(Duration::from_secs(options.timeout));

    match &options.command {
        DeviceCommand::ProtocolId => {
            let response = device.send(&ProtocolIdQuery).await?;
            print_response(&response, options.json, |r| format!("protocol ID: {r}"))?;
        }
        DeviceCommand::SerialNumber => {
            let response = device.send(&SerialNumberQuery).await?;
            print_response(&response, options.json, |r| format!("serial number: {r}"))?;
        }
        DeviceCommand::Firmware => {
            let response = device.send(&FirmwareVersionQuery).await?;
            print_response(&response, options.json, |r| format!("firmware version: {r}"))?;
        }
        DeviceCommand::Firmware2 => {
            let response = device.send(&FirmwareVersion2Query).await?;
            print_response(&response, options.json, |r| {
                format!("secondary firmware version: {r}")
            })?;
        }
        DeviceCommand::Rating => {
            let response = device.send(&RatingQuery).await?;
            print_response(&response, options.json, |r| format!("{r:#?}"))?;
        }
        DeviceCommand::Flags => {
            let response = device.send(&FlagStatusQuery).await?;
            print_response(&response, options.json, |r| {
                format!(
                    "enabled: {}\ndisabled: {}",
                    r.enabled.letters(),
                    r.disabled.letters()
                )
            })?;
        }
        DeviceCommand::Status => {
            let response = device.send(&GeneralStatusQuery).await?;
            print_response(&response, options.json, |r| format!("{r:#?}"))?;
        }
        DeviceCommand::Mode => {
            let response = device.send(&ModeQuery).await?;
            print_response(&response, options.json, |r| format!("device mode: {r}"))?;
        }
        DeviceCommand::Warnings => {
            let response = device.send(&WarningStatusQuery).await?;
            print_response(&response, options.json, |r| format!("{r:?}"))?;
        }
        DeviceCommand::SetFrequency { hz } => {
            let frequency = match hz {
                50 => OutputFrequency::Hz50,
                60 => OutputFrequency::Hz60,
                other => return Err(anyhow!("unsupported output frequency {other}Hz")),
            };
            device.send(&SetOutputFrequency(frequency)).await?;
            println!("output frequency set to {frequency}");
        }
        DeviceCommand::EnableFlags { letters } => {
            let flags = parse_flags(letters)?;
            device.send(&EnableFlags(flags)).await?;
            println!("enabled flags: {}", flags.letters());
        }
        DeviceCommand::DisableFlags { letters } => {
            let flags = parse_flags(letters)?;
            device.send(&DisableFlags(flags)).await?;
            println!("disabled flags: {}", flags.letters());
        }
        DeviceCommand::ResetDefaults => {
            device.send(&ResetToDefault).await?;
            println!("control parameters reset to defaults");
        }
        DeviceCommand::Raw { text } => {
            let body = device.send_raw(text).await?;
            println!("{body}");
        }
    }

    Ok(())
}

fn print_response<T, F>(response: &T, json: bool, human: F) -> Result<()>
where
    T: serde::Serialize,
    F: FnOnce(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        println!("{}", human(response));
    }
    Ok(())
}

fn parse_flags(letters: &str) -> Result<DeviceFlags> {
    let mut flags = DeviceFlags::empty();
    for letter in letters.chars() {
        flags |= DeviceFlags::from_letter(letter)
            .ok_or_else(|| anyhow!("unknown flag letter {letter:?}"))?;
    }
    if flags.is_empty() {
        return Err(anyhow!("no flag letters given"));
    }
    Ok(flags)
}
