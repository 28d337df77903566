use kdcprims_protocol::StopMode;
use serde::Serialize;
use tracing::info;

use crate::cmd::status::print_status;
use crate::cmd::{
    parse_duration, DeviceController, DirectionArgs, HomeArgs, MoveAbsArgs, MoveRelArgs, StopArgs,
};
use crate::exit::{controller_error, CliResult, SUCCESS};
use crate::output::{fixed, print_report, OutputFormat, Report};

#[derive(Serialize)]
struct ActionOutput {
    action: &'static str,
    channel: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    counts: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ActionOutput {
    fn new(action: &'static str, channel: u8) -> Self {
        Self {
            action,
            channel,
            target: None,
            counts: None,
            detail: None,
        }
    }
}

pub fn enable(
    ctl: &mut DeviceController,
    channel: u8,
    on: bool,
    format: OutputFormat,
) -> CliResult<i32> {
    let action = if on { "enable" } else { "disable" };
    ctl.enable(channel, on)
        .map_err(|err| controller_error(&format!("{action} failed"), err))?;
    print_action(&ActionOutput::new(action, channel), "", format);
    Ok(SUCCESS)
}

pub fn identify(ctl: &mut DeviceController, channel: u8, format: OutputFormat) -> CliResult<i32> {
    ctl.identify(channel)
        .map_err(|err| controller_error("identify failed", err))?;
    print_action(&ActionOutput::new("identify", channel), "", format);
    Ok(SUCCESS)
}

pub fn home(
    ctl: &mut DeviceController,
    channel: u8,
    args: HomeArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    if !args.wait {
        ctl.start_home_move(channel)
            .map_err(|err| controller_error("home failed", err))?;
        print_action(&ActionOutput::new("home", channel), "", format);
        return Ok(SUCCESS);
    }

    let timeout = parse_duration(&args.wait_timeout)?;
    let interval = parse_duration(&args.poll_interval)?;
    info!(?timeout, "homing");
    let status = ctl
        .home_and_wait(channel, interval, timeout)
        .map_err(|err| controller_error("home failed", err))?;
    print_status(&status, ctl.calibration().stage().unit(), None, format);
    Ok(SUCCESS)
}

pub fn move_abs(
    ctl: &mut DeviceController,
    channel: u8,
    args: MoveAbsArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    ctl.move_absolute_position(channel, args.position)
        .map_err(|err| controller_error("move failed", err))?;
    let out = ActionOutput {
        target: Some(args.position),
        counts: Some(ctl.converter().position_to_counts(args.position)),
        ..ActionOutput::new("move-abs", channel)
    };
    print_action(&out, ctl.calibration().stage().unit(), format);
    Ok(SUCCESS)
}

pub fn move_rel(
    ctl: &mut DeviceController,
    channel: u8,
    args: MoveRelArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    ctl.move_relative_distance(channel, args.distance)
        .map_err(|err| controller_error("move failed", err))?;
    let out = ActionOutput {
        target: Some(args.distance),
        counts: Some(ctl.converter().position_to_counts(args.distance)),
        ..ActionOutput::new("move-rel", channel)
    };
    print_action(&out, ctl.calibration().stage().unit(), format);
    Ok(SUCCESS)
}

pub fn jog(
    ctl: &mut DeviceController,
    channel: u8,
    args: DirectionArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    ctl.start_jog_move(channel, args.direction)
        .map_err(|err| controller_error("jog failed", err))?;
    let out = ActionOutput {
        detail: Some(args.direction.to_string()),
        ..ActionOutput::new("jog", channel)
    };
    print_action(&out, "", format);
    Ok(SUCCESS)
}

pub fn run_continuous(
    ctl: &mut DeviceController,
    channel: u8,
    args: DirectionArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    ctl.move_continuous(channel, args.direction)
        .map_err(|err| controller_error("run failed", err))?;
    let out = ActionOutput {
        detail: Some(args.direction.to_string()),
        ..ActionOutput::new("run", channel)
    };
    print_action(&out, "", format);
    Ok(SUCCESS)
}

pub fn stop(
    ctl: &mut DeviceController,
    channel: u8,
    args: StopArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let mode = if args.soft {
        StopMode::Soft
    } else {
        StopMode::Abrupt
    };
    ctl.stop(channel, mode)
        .map_err(|err| controller_error("stop failed", err))?;
    let out = ActionOutput {
        detail: Some(mode.to_string()),
        ..ActionOutput::new("stop", channel)
    };
    print_action(&out, "", format);
    Ok(SUCCESS)
}

fn print_action(out: &ActionOutput, unit: &str, format: OutputFormat) {
    let mut rows = vec![
        ("Action", out.action.to_string()),
        ("Channel", out.channel.to_string()),
    ];
    if let Some(target) = out.target {
        rows.push(("Target", format!("{} {unit}", fixed(target, 4))));
    }
    if let Some(counts) = out.counts {
        rows.push(("Counts", counts.to_string()));
    }
    if let Some(detail) = &out.detail {
        rows.push(("Mode", detail.clone()));
    }

    print_report(
        &Report {
            title: "Sent",
            body: out,
            rows,
            raw: out.action.to_string(),
        },
        format,
    );
}
