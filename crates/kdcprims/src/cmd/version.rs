use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("kdcprims {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: kdcprims");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("KDCPRIMS_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "features: serial={}, cli=true",
        cfg!(feature = "serial")
    );
    println!(
        "stages: {}",
        kdcprims_protocol::StageType::ALL
            .iter()
            .map(|stage| stage.label())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(SUCCESS)
}
