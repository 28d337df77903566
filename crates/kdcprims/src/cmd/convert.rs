use kdcprims_protocol::UnitConverter;
use serde::Serialize;

use crate::cmd::{ConvertArgs, DeviceArgs, Quantity};
use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{fixed, print_report, OutputFormat, Report};

#[derive(Serialize)]
struct ConvertOutput {
    stage: &'static str,
    motor: &'static str,
    quantity: &'static str,
    unit: String,
    physical: f64,
    counts: i64,
}

/// Offline conversion with the selected calibration.
pub fn run(args: ConvertArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let calibration = device.calibration()?;
    let converter = UnitConverter::new(calibration);
    let base = calibration.stage().unit();

    let (quantity, unit) = match args.quantity {
        Quantity::Position => ("position", base.to_string()),
        Quantity::Velocity => ("velocity", format!("{base}/s")),
        Quantity::Acceleration => ("acceleration", format!("{base}/s²")),
    };

    let (physical, counts) = if args.from_counts {
        let counts = whole_counts(args.value)?;
        let physical = match args.quantity {
            Quantity::Position => {
                converter.counts_to_position(narrow(counts, i32::try_from(counts).ok())?)
            }
            Quantity::Velocity => {
                converter.counts_to_velocity(narrow(counts, u32::try_from(counts).ok())?)
            }
            Quantity::Acceleration => {
                converter.counts_to_acceleration(narrow(counts, u32::try_from(counts).ok())?)
            }
        };
        (physical, counts)
    } else {
        let counts = match args.quantity {
            Quantity::Position => i64::from(converter.position_to_counts(args.value)),
            Quantity::Velocity => i64::from(converter.velocity_to_counts(args.value)),
            Quantity::Acceleration => i64::from(converter.acceleration_to_counts(args.value)),
        };
        (args.value, counts)
    };

    let out = ConvertOutput {
        stage: calibration.stage().label(),
        motor: calibration.motor().label(),
        quantity,
        unit,
        physical,
        counts,
    };
    let raw = if args.from_counts {
        fixed(physical, 6)
    } else {
        counts.to_string()
    };
    let rows = vec![
        ("Stage", out.stage.to_string()),
        ("Motor", out.motor.to_string()),
        ("Quantity", quantity.to_string()),
        ("Physical", format!("{} {}", fixed(physical, 6), out.unit)),
        ("Counts", counts.to_string()),
    ];
    print_report(
        &Report {
            title: "Conversion",
            body: &out,
            rows,
            raw,
        },
        format,
    );
    Ok(SUCCESS)
}

fn whole_counts(value: f64) -> CliResult<i64> {
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(CliError::new(
            DATA_INVALID,
            format!("counts must be a whole number (got {value})"),
        ));
    }
    Ok(value as i64)
}

fn narrow<N>(counts: i64, narrowed: Option<N>) -> CliResult<N> {
    narrowed.ok_or_else(|| {
        CliError::new(
            DATA_INVALID,
            format!("counts out of range for this quantity: {counts}"),
        )
    })
}
