use kdcprims_protocol::{JogParameters, VelocityProfile};

use crate::cmd::{DeviceController, JogParamsArgs, VelocityArgs};
use crate::exit::{controller_error, CliResult, SUCCESS};
use crate::output::{fixed, print_report, OutputFormat, Report};

/// Show the velocity profile, updating the given fields first.
pub fn velocity(
    ctl: &mut DeviceController,
    channel: u8,
    args: VelocityArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let current = ctl
        .get_trapezoidal_velocity(channel)
        .map_err(|err| controller_error("read velocity failed", err))?;

    let profile = if args.min.is_some() || args.accel.is_some() || args.max.is_some() {
        let updated = VelocityProfile {
            min_velocity: args.min.unwrap_or(current.min_velocity),
            acceleration: args.accel.unwrap_or(current.acceleration),
            max_velocity: args.max.unwrap_or(current.max_velocity),
        };
        ctl.set_trapezoidal_velocity(channel, updated)
            .map_err(|err| controller_error("set velocity failed", err))?;
        ctl.get_trapezoidal_velocity(channel)
            .map_err(|err| controller_error("read velocity failed", err))?
    } else {
        current
    };

    let unit = ctl.calibration().stage().unit();
    let rows = vec![
        ("Min velocity", format!("{} {unit}/s", fixed(profile.min_velocity, 4))),
        ("Acceleration", format!("{} {unit}/s²", fixed(profile.acceleration, 4))),
        ("Max velocity", format!("{} {unit}/s", fixed(profile.max_velocity, 4))),
    ];
    print_report(
        &Report {
            title: "Velocity profile",
            body: &profile,
            rows,
            raw: fixed(profile.max_velocity, 4),
        },
        format,
    );
    Ok(SUCCESS)
}

/// Show the jog parameters, updating the given fields first.
pub fn jog(
    ctl: &mut DeviceController,
    channel: u8,
    args: JogParamsArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let current = ctl
        .get_jog_parameters(channel)
        .map_err(|err| controller_error("read jog parameters failed", err))?;

    let changed = args.mode.is_some()
        || args.step.is_some()
        || args.min.is_some()
        || args.accel.is_some()
        || args.max.is_some()
        || args.stop_mode.is_some();

    let params = if changed {
        let updated = JogParameters {
            mode: args.mode.unwrap_or(current.mode),
            step_size: args.step.unwrap_or(current.step_size),
            min_velocity: args.min.unwrap_or(current.min_velocity),
            acceleration: args.accel.unwrap_or(current.acceleration),
            max_velocity: args.max.unwrap_or(current.max_velocity),
            stop_mode: args.stop_mode.unwrap_or(current.stop_mode),
        };
        ctl.set_jog_parameters(channel, updated)
            .map_err(|err| controller_error("set jog parameters failed", err))?;
        ctl.get_jog_parameters(channel)
            .map_err(|err| controller_error("read jog parameters failed", err))?
    } else {
        current
    };

    let unit = ctl.calibration().stage().unit();
    let rows = vec![
        ("Mode", jog_mode_name(params.mode).to_string()),
        ("Step size", format!("{} {unit}", fixed(params.step_size, 4))),
        ("Min velocity", format!("{} {unit}/s", fixed(params.min_velocity, 4))),
        ("Acceleration", format!("{} {unit}/s²", fixed(params.acceleration, 4))),
        ("Max velocity", format!("{} {unit}/s", fixed(params.max_velocity, 4))),
        ("Stop mode", stop_mode_name(params.stop_mode).to_string()),
    ];
    print_report(
        &Report {
            title: "Jog parameters",
            body: &params,
            rows,
            raw: fixed(params.step_size, 4),
        },
        format,
    );
    Ok(SUCCESS)
}

fn jog_mode_name(mode: u16) -> &'static str {
    match mode {
        1 => "continuous",
        2 => "single-step",
        _ => "unknown",
    }
}

fn stop_mode_name(mode: u16) -> &'static str {
    match mode {
        1 => "abrupt",
        2 => "profiled",
        _ => "unknown",
    }
}
