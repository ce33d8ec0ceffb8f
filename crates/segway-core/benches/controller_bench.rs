//! Benchmarks for the per-iteration controller work.

use criterion::{Criterion, criterion_group, criterion_main};
use segway_core::prelude::*;
use segway_scheduler::ManualClock;
use std::hint::black_box;

fn bench_controller_step(c: &mut Criterion) {
    let config = SegwayConfig::default();
    let Ok(mut controller) = BalanceController::new(&config, BatteryCompensation::unity(8.0)) else {
        return;
    };
    let mut readings = SensorReadings::default();

    c.bench_function("controller_step", |b| {
        b.iter(|| {
            readings.gyro_rate = -readings.gyro_rate + 0.5;
            readings.left_position_deg += 1.0;
            readings.right_position_deg += 1.0;
            black_box(controller.step(black_box(&readings), Command::STATIONARY))
        });
    });
}

fn bench_loop_iteration_virtual_rig(c: &mut Criterion) {
    let rig = VirtualRig::new(7.8);
    let hardware = Hardware {
        gyro: rig.gyro(),
        left: rig.motor(Side::Left),
        right: rig.motor(Side::Right),
    };
    let Ok(mut balance) = BalanceLoop::with_clock(
        &SegwayConfig::default(),
        hardware,
        &mut rig.battery(),
        Stationary,
        ManualClock::new(),
    ) else {
        return;
    };

    c.bench_function("loop_iteration_virtual_rig", |b| {
        b.iter(|| black_box(balance.run_iteration().is_ok()));
    });
}

criterion_group!(benches, bench_controller_step, bench_loop_iteration_virtual_rig);
criterion_main!(benches);
