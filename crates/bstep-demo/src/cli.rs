#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;

use bstep_core::{AnimationEvent, Value};
use bstep_runtime::EngineConfig;
use clap::Parser;
use serde::Serialize;

use crate::error::{DemoError, Result};
use crate::session::{Session, StepReport, Summary};
use crate::step::Step;

#[derive(Debug, Parser)]
#[command(
    name = "bstep",
    about = "Run binary search tree operations step by step and print their animation events",
    version
)]
pub struct Cli {
    /// Steps to run in order, e.g. `insert=10 find=7 undo jump=0`.
    #[arg(value_name = "STEP")]
    pub steps: Vec<String>,

    /// Engine configuration file (`.toml` or `.json`).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seed for random tree generation; overrides the configuration.
    #[arg(long)]
    pub seed: Option<u64>,

    /// History depth limit; overrides the configuration.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Comma-separated values inserted before the first step, unrecorded.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub values: Vec<Value>,

    /// Emit one JSON object per step instead of text.
    #[arg(long)]
    pub json: bool,

    /// Report failed steps and carry on instead of stopping.
    #[arg(long)]
    pub keep_going: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(max_depth) = self.max_depth {
            config.history.max_depth = max_depth;
        }
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(bstep_runtime::ConfigError::Validation(errors).into());
        }
        Ok(config)
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    run(&cli, &mut stdout.lock())
}

pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = cli.engine_config()?;
    if cli.print_config {
        out.write_all(config.to_toml_string()?.as_bytes())?;
        return Ok(());
    }

    let steps = cli
        .steps
        .iter()
        .map(|s| s.parse::<Step>())
        .collect::<Result<Vec<_>>>()?;

    let mut session = Session::new(&config);
    if !cli.values.is_empty() {
        session.preload(&cli.values)?;
    }

    for step in steps {
        match session.run(step) {
            Ok(report) => write_report(out, &report, cli.json)?,
            Err(err @ DemoError::Command { .. }) if cli.keep_going => {
                tracing::warn!(target: "bstep.demo", error = %err, "step failed, continuing");
                write_failure(out, &err, cli.json)?;
            }
            Err(err) => return Err(err),
        }
    }
    write_summary(out, &session.summary(), cli.json)
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    summary: &'a Summary,
}

fn write_report(out: &mut impl Write, report: &StepReport, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "[{}] {}", report.index, report.step)?;
    let mut depth = 1usize;
    for event in &report.events {
        if matches!(event, AnimationEvent::End) {
            depth = depth.saturating_sub(1).max(1);
        }
        writeln!(out, "{:indent$}{event}", "", indent = depth * 2)?;
        if matches!(event, AnimationEvent::Start) {
            depth += 1;
        }
    }
    if let Some(result) = &report.result {
        writeln!(out, "  => {result}")?;
    }
    Ok(())
}

fn write_failure(out: &mut impl Write, err: &DemoError, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, &serde_json::json!({ "error": err.to_string() }))?;
        writeln!(out)?;
    } else {
        writeln!(out, "  !! {err}")?;
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, summary: &Summary, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, &SummaryLine { summary })?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(
        out,
        "history ({} of {} applied):",
        summary.cursor,
        summary.entries.len()
    )?;
    for (i, entry) in summary.entries.iter().enumerate() {
        let mark = if i < summary.cursor { '*' } else { ' ' };
        writeln!(out, " {mark} {i}. {entry}")?;
    }
    let inorder: Vec<String> = summary.inorder.iter().map(ToString::to_string).collect();
    writeln!(out, "inorder: [{}]", inorder.join(", "))?;
    Ok(())
}
