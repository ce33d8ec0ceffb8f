//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use segway_core::{RunSummary, SegwayConfig};
use serde_json::json;
use std::path::Path;

use crate::error::CliError;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format error as JSON: {}", e),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::ConfigNotFound(_)) => "config_not_found",
        Some(CliError::InvalidConfiguration(_)) => "invalid_configuration",
        Some(CliError::ControllerFault(_)) => "controller_fault",
        Some(CliError::IoError(_)) => "io_error",
        None => "unknown",
    }
}

/// Print the outcome of a balance run
pub fn print_run_summary(summary: &RunSummary, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "summary": summary
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format run summary as JSON: {}", e),
        }
        return;
    }

    println!("{}", "Balance Run:".bold());
    println!("  Iterations: {}", summary.iterations);
    println!(
        "  Battery: {:.2} V (scaling {:.3})",
        summary.battery_voltage, summary.battery_scaling
    );

    let overruns = if summary.overruns == 0 {
        "0".green()
    } else {
        summary.overruns.to_string().yellow()
    };
    println!(
        "  Overruns: {} ({} skipped periods)",
        overruns, summary.skipped_periods
    );
    println!(
        "  Loop body: p50 {} µs, p99 {} µs",
        summary.p50_busy_ns / 1_000,
        summary.p99_busy_ns / 1_000
    );
    println!("  Max lateness: {} µs", summary.max_lateness_ns / 1_000);

    match &summary.last_output {
        Some(output) => {
            println!("{}", "Last Output:".bold());
            println!(
                "  Angle: {:.4} (sum {:.4}, rate {:.4})",
                output.angle.angle, output.angle.angle_sum, output.angle.rate
            );
            println!(
                "  Distance: {:.4} (speed {:.4}, error {:.4})",
                output.distance.distance, output.distance.speed, output.distance.distance_error
            );
            println!("  Duty: {:.3}", output.duty);
            let wheels = format!(
                "left {:.3}, right {:.3}",
                output.wheels.left, output.wheels.right
            );
            if output.saturated {
                println!("  Wheels: {} {}", wheels, "(saturated)".red());
            } else {
                println!("  Wheels: {}", wheels);
            }
        }
        None => println!("{}", "No iterations completed".yellow()),
    }
}

/// Print the result of validating a configuration file
pub fn print_config_valid(path: &Path, config: &SegwayConfig, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "path": path.display().to_string(),
            "config": config
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format config as JSON: {}", e),
        }
        return;
    }

    println!("{} {}", "✓".green(), format!("{} is valid", path.display()).bold());
    println!("  Schema: {}", config.schema_version);
    println!("  Loop period: {} s", config.timing.loop_period_s);
    let gains = config.gains.as_array();
    println!("  Gains: {:?}", gains);
    match config.actuation.duty_limit {
        Some(limit) => println!("  Duty limit: ±{}", limit),
        None => println!("  Duty limit: {}", "none".yellow()),
    }
}

/// Print a plain success message
pub fn print_success(message: &str, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "message": message
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format message as JSON: {}", e),
        }
    } else {
        println!("{} {}", "✓".green(), message);
    }
}
