//! Repair command implementation.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::bail;
use polymend::{
    Decision, DecisionProvider, FixedDecision, GeoEngine, Orchestrator, Outcome, TracingSink,
};
use tracing::info;

use super::common::{can_prompt, read_layer, write_layer, Source, Target};
use super::config::Settings;
use super::prompt::PromptDecision;

/// Options for a repair run, after config merging.
#[derive(Debug, Clone)]
pub struct RepairOptions {
    pub layer: String,
    pub output: Option<PathBuf>,
    pub in_place: bool,
    pub json: bool,
    pub settings: Settings,
}

/// Audit a layer, ask what to do, and write the result if anything changed.
pub fn cmd_repair(options: &RepairOptions) -> anyhow::Result<ExitCode> {
    let source = Source::parse(&options.layer);
    let target = Target::resolve(options.output.as_deref(), options.in_place, &source)?;
    if options.json && target == Target::Stdout {
        bail!("--json prints the report on stdout; use --output or --in-place for the layer");
    }

    let mut layer = read_layer(&source)?;

    let mut decisions: Box<dyn DecisionProvider> = match options.settings.decision {
        Some(decision) => Box::new(FixedDecision(decision)),
        None if can_prompt(&source) => Box::new(PromptDecision::stdio()),
        None => {
            info!("no decision given and no terminal to ask on, cancelling");
            Box::new(FixedDecision(Decision::Cancel))
        }
    };
    let mut sink = TracingSink;

    let engine = GeoEngine;
    let report = Orchestrator::new(&engine, &mut *decisions, &mut sink)
        .with_config(options.settings.clean)
        .run(Some(&mut layer))?;

    if target.needs_write(layer.is_modified()) {
        write_layer(&layer, &target, options.settings.pretty)?;
    } else {
        info!("layer unchanged, nothing written");
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!("{}", report.summary_line());
    }

    match report.outcome {
        Outcome::Aborted => Ok(ExitCode::from(1)),
        _ => Ok(ExitCode::SUCCESS),
    }
}
