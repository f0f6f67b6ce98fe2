//! Check command implementation.

use std::process::ExitCode;

use polymend::{
    all_valid_message, invalid_found_message, scan_layer, FeatureId, FeatureStore, GeoEngine,
    NO_POLYGON_LAYER,
};
use serde::Serialize;
use tracing::warn;

use super::common::{read_layer, Source};

/// Exit code when invalid geometries were found.
pub const EXIT_INVALID: u8 = 2;

/// JSON output of `check`.
#[derive(Debug, Serialize)]
struct CheckReport {
    layer: String,
    total: usize,
    valid: usize,
    invalid_ids: Vec<FeatureId>,
    scan_secs: f64,
}

/// Scan a layer and report, without writing anything.
pub fn cmd_check(layer_arg: &str, json: bool) -> anyhow::Result<ExitCode> {
    let layer = read_layer(&Source::parse(layer_arg))?;
    let info = layer.layer_info();
    if !info.is_polygonal() {
        warn!("{}", NO_POLYGON_LAYER);
        eprintln!("{}", NO_POLYGON_LAYER);
        return Ok(ExitCode::from(1));
    }

    let scan = scan_layer(&layer, &GeoEngine)?;

    if json {
        let report = CheckReport {
            layer: info.name.clone(),
            total: scan.total,
            valid: scan.valid_count(),
            invalid_ids: scan.invalid_ids.clone(),
            scan_secs: scan.elapsed.as_secs_f64(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if scan.all_valid() {
        println!("{}", all_valid_message(&info.name, &scan));
    } else {
        println!("{}", invalid_found_message(&info.name, &scan));
        let ids: Vec<String> = scan.invalid_ids.iter().map(FeatureId::to_string).collect();
        println!("invalid features: {}", ids.join(", "));
    }

    if scan.all_valid() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_INVALID))
    }
}
