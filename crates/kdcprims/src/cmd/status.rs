use kdcprims_protocol::DcStatusUpdateSi;
use serde::Serialize;

use crate::cmd::DeviceController;
use crate::exit::{controller_error, CliResult, SUCCESS};
use crate::output::{fixed, print_report, OutputFormat, Report};

#[derive(Serialize)]
struct StatusOutput {
    channel: u16,
    position: f64,
    velocity: f64,
    current: i16,
    unit: &'static str,
    homed: bool,
    moving: bool,
    fault: bool,
    flags: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample: Option<usize>,
}

pub fn run(ctl: &mut DeviceController, channel: u8, format: OutputFormat) -> CliResult<i32> {
    let status = ctl
        .get_dc_status_update_si(channel)
        .map_err(|err| controller_error("status failed", err))?;
    print_status(&status, ctl.calibration().stage().unit(), None, format);
    Ok(SUCCESS)
}

/// Print one status update; `sample` numbers updates in a watch loop.
pub fn print_status(
    status: &DcStatusUpdateSi,
    unit: &'static str,
    sample: Option<usize>,
    format: OutputFormat,
) {
    let flags = status.status.active();
    let out = StatusOutput {
        channel: status.channel,
        position: status.position,
        velocity: status.velocity,
        current: status.current,
        unit,
        homed: status.status.is_homed,
        moving: status.status.is_moving(),
        fault: status.status.has_fault(),
        flags: flags.clone(),
        sample,
    };

    let mut rows = Vec::new();
    if let Some(n) = sample {
        rows.push(("Sample", n.to_string()));
    }
    rows.extend([
        ("Position", format!("{} {unit}", fixed(status.position, 4))),
        ("Velocity", format!("{} {unit}/s", fixed(status.velocity, 4))),
        ("Current", status.current.to_string()),
        ("Homed", out.homed.to_string()),
        ("Moving", out.moving.to_string()),
        ("Fault", out.fault.to_string()),
        ("Flags", flags.join(", ")),
    ]);

    print_report(
        &Report {
            title: "Status",
            body: &out,
            rows,
            raw: fixed(status.position, 4),
        },
        format,
    );
}
