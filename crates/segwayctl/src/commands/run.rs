//! `segwayctl run`

use anyhow::Result;
use segway_core::ports::ConstantCommand;
use segway_core::virtual_rig::{RigDevice, RigFault, Side, VirtualGyro, VirtualMotor};
use segway_core::{BalanceLoop, Command, Hardware, RunSummary, SegwayConfig, VirtualRig};
use segway_errors::SegwayError;
use segway_scheduler::{Clock, ManualClock, SystemClock};
use tracing::{debug, info};

use crate::commands::RunArgs;
use crate::error::CliError;
use crate::output;

type RigLoop<C> = BalanceLoop<VirtualGyro, VirtualMotor, ConstantCommand, C>;

pub fn execute(args: &RunArgs, json: bool) -> Result<()> {
    let config = load_config(args)?;

    let rig = VirtualRig::new(args.voltage);
    rig.set_gyro_bias(args.gyro_bias);
    rig.set_wheel_rate(Side::Left, args.wheel_rate);
    rig.set_wheel_rate(Side::Right, args.wheel_rate);

    let summary = if args.realtime {
        drive(args, &config, &rig, SystemClock::new())?
    } else {
        drive(args, &config, &rig, ManualClock::new())?
    };

    output::print_run_summary(&summary, json);
    Ok(())
}

fn load_config(args: &RunArgs) -> Result<SegwayConfig, CliError> {
    match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::ConfigNotFound(path.clone()));
            }
            debug!(path = %path.display(), "loading configuration");
            Ok(SegwayConfig::load_from_path(path)?)
        }
        None => Ok(SegwayConfig::default()),
    }
}

fn drive<C: Clock>(
    args: &RunArgs,
    config: &SegwayConfig,
    rig: &VirtualRig,
    clock: C,
) -> Result<RunSummary, CliError> {
    let hardware = Hardware {
        gyro: rig.gyro(),
        left: rig.motor(Side::Left),
        right: rig.motor(Side::Right),
    };
    let commands = ConstantCommand(Command::new(args.speed, args.turn));
    let mut balance: RigLoop<C> =
        BalanceLoop::with_clock(config, hardware, &mut rig.battery(), commands, clock)?;

    let period = config.loop_period().map_err(SegwayError::from)?;
    info!(iterations = args.iterations, realtime = args.realtime, "starting run");

    for i in 0..args.iterations {
        if args.gyro_fault_after == Some(i) {
            info!(iteration = i, "injecting gyro disconnect");
            rig.inject_fault(RigDevice::Gyro, RigFault::Disconnected);
        }
        balance.run_iteration()?;
        rig.advance(period);
    }

    Ok(balance.summary())
}
