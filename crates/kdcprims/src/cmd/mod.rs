use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use kdcprims_protocol::{Calibration, Controller, Direction, TransactionConfig};
use kdcprims_transport::{
    SerialConfig, SerialTransport, TcpConfig, TcpTransport, Transport, DEFAULT_BAUD_RATE,
};

use crate::exit::{controller_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod convert;
pub mod info;
pub mod motion;
pub mod params;
pub mod status;
pub mod version;
pub mod watch;

/// Controller over whichever transport the device arguments select.
pub type DeviceController = Controller<Box<dyn Transport>>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print hardware information and calibration.
    Info,
    /// Print one DC status update.
    Status,
    /// Enable the drive output.
    Enable,
    /// Disable the drive output.
    Disable,
    /// Flash the front-panel LED.
    Identify,
    /// Start homing, optionally waiting until the stage reports homed.
    Home(HomeArgs),
    /// Move to an absolute position (mm or deg).
    MoveAbs(MoveAbsArgs),
    /// Move by a relative distance (mm or deg).
    MoveRel(MoveRelArgs),
    /// Jog one step using the stored jog parameters.
    Jog(DirectionArgs),
    /// Move continuously until stopped.
    Run(DirectionArgs),
    /// Stop motion.
    Stop(StopArgs),
    /// Show or set the trapezoidal velocity profile.
    Velocity(VelocityArgs),
    /// Show or set the jog parameters.
    JogParams(JogParamsArgs),
    /// Poll status until interrupted.
    Watch(WatchArgs),
    /// Convert between physical units and encoder counts (no device needed).
    Convert(ConvertArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let channel = device.channel;
    match command {
        Command::Convert(args) => convert::run(args, device, format),
        Command::Version(args) => version::run(args),
        Command::Info => info::run(&mut open_controller(device)?, channel, format),
        Command::Status => status::run(&mut open_controller(device)?, channel, format),
        Command::Enable => motion::enable(&mut open_controller(device)?, channel, true, format),
        Command::Disable => motion::enable(&mut open_controller(device)?, channel, false, format),
        Command::Identify => motion::identify(&mut open_controller(device)?, channel, format),
        Command::Home(args) => motion::home(&mut open_controller(device)?, channel, args, format),
        Command::MoveAbs(args) => {
            motion::move_abs(&mut open_controller(device)?, channel, args, format)
        }
        Command::MoveRel(args) => {
            motion::move_rel(&mut open_controller(device)?, channel, args, format)
        }
        Command::Jog(args) => motion::jog(&mut open_controller(device)?, channel, args, format),
        Command::Run(args) => {
            motion::run_continuous(&mut open_controller(device)?, channel, args, format)
        }
        Command::Stop(args) => motion::stop(&mut open_controller(device)?, channel, args, format),
        Command::Velocity(args) => {
            params::velocity(&mut open_controller(device)?, channel, args, format)
        }
        Command::JogParams(args) => {
            params::jog(&mut open_controller(device)?, channel, args, format)
        }
        Command::Watch(args) => watch::run(&mut open_controller(device)?, channel, args, format),
    }
}

/// Device selection and calibration, shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Serial port of the controller (e.g. /dev/ttyUSB0, COM6).
    #[arg(long, env = "KDCPRIMS_PORT", global = true)]
    pub port: Option<String>,
    /// host:port of a serial-over-TCP bridge. Takes precedence over --port.
    #[arg(long, env = "KDCPRIMS_ADDR", global = true)]
    pub addr: Option<String>,
    /// Serial baud rate.
    #[arg(long, env = "KDCPRIMS_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,
    /// Stage type (MTS25-Z8, MTS50-Z8, Z8xx, Z6xx, PRM1-Z8, PRMTZ8, CR1-Z7, KVS30).
    #[arg(long, env = "KDCPRIMS_STAGE", default_value = "MTS25-Z8", global = true)]
    pub stage: String,
    /// Motor type (Brushed, Brushless).
    #[arg(long, env = "KDCPRIMS_MOTOR", default_value = "Brushed", global = true)]
    pub motor: String,
    /// Transport read/write timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", global = true)]
    pub timeout: String,
    /// Motor channel.
    #[arg(long, default_value_t = 1, global = true)]
    pub channel: u8,
}

impl DeviceArgs {
    pub fn calibration(&self) -> CliResult<Calibration> {
        Calibration::lookup(&self.stage, &self.motor)
            .map_err(|err| controller_error("invalid calibration", err))
    }
}

#[derive(Args, Debug)]
pub struct HomeArgs {
    /// Block until the stage reports homed.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait when --wait is set (e.g. 60s).
    #[arg(long, default_value = "60s")]
    pub wait_timeout: String,
    /// Status poll interval when --wait is set.
    #[arg(long, default_value = "200ms")]
    pub poll_interval: String,
}

#[derive(Args, Debug)]
pub struct MoveAbsArgs {
    /// Target position.
    #[arg(allow_negative_numbers = true)]
    pub position: f64,
}

#[derive(Args, Debug)]
pub struct MoveRelArgs {
    /// Distance to move; negative moves backwards.
    #[arg(allow_negative_numbers = true)]
    pub distance: f64,
}

#[derive(Args, Debug)]
pub struct DirectionArgs {
    /// forward or reverse.
    pub direction: Direction,
}

#[derive(Args, Debug)]
pub struct StopArgs {
    /// Ramp down with the velocity profile instead of stopping abruptly.
    #[arg(long)]
    pub soft: bool,
}

#[derive(Args, Debug)]
pub struct VelocityArgs {
    /// Minimum velocity (mm/s).
    #[arg(long)]
    pub min: Option<f64>,
    /// Acceleration (mm/s²).
    #[arg(long)]
    pub accel: Option<f64>,
    /// Maximum velocity (mm/s).
    #[arg(long)]
    pub max: Option<f64>,
}

#[derive(Args, Debug)]
pub struct JogParamsArgs {
    /// Jog mode: 1 continuous, 2 single step.
    #[arg(long)]
    pub mode: Option<u16>,
    /// Step size (mm).
    #[arg(long)]
    pub step: Option<f64>,
    /// Minimum velocity (mm/s).
    #[arg(long)]
    pub min: Option<f64>,
    /// Acceleration (mm/s²).
    #[arg(long)]
    pub accel: Option<f64>,
    /// Maximum velocity (mm/s).
    #[arg(long)]
    pub max: Option<f64>,
    /// Stop mode: 1 abrupt, 2 profiled.
    #[arg(long)]
    pub stop_mode: Option<u16>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Poll interval (e.g. 500ms, 1s).
    #[arg(long, default_value = "500ms")]
    pub interval: String,
    /// Exit after N status updates.
    #[arg(long)]
    pub count: Option<usize>,
    /// Send a soft stop when interrupted.
    #[arg(long)]
    pub stop_on_exit: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Quantity {
    Position,
    Velocity,
    Acceleration,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Value to convert.
    #[arg(allow_negative_numbers = true)]
    pub value: f64,
    /// Physical quantity of the value.
    #[arg(long, short = 'q', default_value = "position")]
    pub quantity: Quantity,
    /// Treat the value as encoder counts and convert to physical units.
    #[arg(long)]
    pub from_counts: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Build the transport, resolve calibration and connect.
pub fn open_controller(device: &DeviceArgs) -> CliResult<DeviceController> {
    let timeout = parse_duration(&device.timeout)?;
    let calibration = device.calibration()?;

    let transport: Box<dyn Transport> = match (&device.addr, &device.port) {
        (Some(addr), _) => Box::new(TcpTransport::new(TcpConfig {
            addr: addr.clone(),
            timeout,
        })),
        (None, Some(port)) => Box::new(SerialTransport::new(SerialConfig {
            port: port.clone(),
            baud_rate: device.baud,
            timeout,
        })),
        (None, None) => {
            return Err(CliError::new(
                USAGE,
                "no device selected: pass --port or --addr (or set KDCPRIMS_PORT)",
            ))
        }
    };

    let mut ctl = Controller::with_config(transport, calibration, TransactionConfig::default());
    ctl.connect()
        .map_err(|err| controller_error("connect failed", err))?;
    Ok(ctl)
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
