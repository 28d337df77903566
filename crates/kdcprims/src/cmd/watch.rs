use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use kdcprims_protocol::StopMode;
use tracing::{info, warn};

use crate::cmd::status::print_status;
use crate::cmd::{parse_duration, DeviceController, WatchArgs};
use crate::exit::{controller_error, CliError, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(
    ctl: &mut DeviceController,
    channel: u8,
    args: WatchArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let unit = ctl.calibration().stage().unit();

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let started = Instant::now();
        let status = ctl
            .get_dc_status_update_si(channel)
            .map_err(|err| controller_error("status failed", err))?;
        printed += 1;
        print_status(&status, unit, Some(printed), format);

        if let Some(limit) = args.count {
            if printed >= limit {
                return Ok(SUCCESS);
            }
        }

        sleep_while_running(&running, interval.saturating_sub(started.elapsed()));
    }

    info!(samples = printed, "watch interrupted");
    if args.stop_on_exit {
        if let Err(err) = ctl.stop(channel, StopMode::Soft) {
            warn!(%err, "stop on exit failed");
            return Err(controller_error("stop failed", err));
        }
    }
    Ok(SUCCESS)
}

/// Sleep in short slices so an interrupt is noticed promptly.
fn sleep_while_running(running: &AtomicBool, total: Duration) {
    const SLICE: Duration = Duration::from_millis(50);
    let deadline = Instant::now() + total;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(SLICE.min(deadline - now));
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_flag_skips_sleep() {
        let running = AtomicBool::new(false);
        let started = Instant::now();
        sleep_while_running(&running, Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn sleeps_for_requested_time() {
        let running = AtomicBool::new(true);
        let started = Instant::now();
        sleep_while_running(&running, Duration::from_millis(120));
        assert!(started.elapsed() >= Duration::from_millis(120));
    }
}
