use kdcprims_protocol::{Calibration, HwInformation};
use serde::Serialize;

use crate::cmd::DeviceController;
use crate::exit::{controller_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct InfoOutput<'a> {
    hardware: &'a HwInformation,
    firmware: String,
    enabled: bool,
    calibration: &'a Calibration,
    transport: &'static str,
}

pub fn run(ctl: &mut DeviceController, channel: u8, format: OutputFormat) -> CliResult<i32> {
    let hardware = ctl
        .get_hw_information()
        .map_err(|err| controller_error("hardware info failed", err))?;
    let enabled = ctl
        .is_enabled(channel)
        .map_err(|err| controller_error("enable state failed", err))?;

    let calibration = *ctl.calibration();
    let out = InfoOutput {
        hardware: &hardware,
        firmware: hardware.firmware_string(),
        enabled,
        calibration: &calibration,
        transport: ctl.transport().transport_name(),
    };

    let rows = vec![
        ("Serial", hardware.serial_number.to_string()),
        ("Model", hardware.model.clone()),
        ("Type", hardware.hw_type.to_string()),
        ("Firmware", out.firmware.clone()),
        ("Hardware", hardware.hardware_version.to_string()),
        ("Channels", hardware.channel_count.to_string()),
        ("Enabled", enabled.to_string()),
        ("Stage", calibration.stage().to_string()),
        ("Motor", calibration.motor().to_string()),
        (
            "Scale",
            format!(
                "{} counts/{}",
                calibration.stage_scale(),
                calibration.stage().unit()
            ),
        ),
        ("Transport", out.transport.to_string()),
    ];

    print_report(
        &Report {
            title: "Controller",
            body: &out,
            rows,
            raw: hardware.serial_number.to_string(),
        },
        format,
    );
    Ok(SUCCESS)
}
