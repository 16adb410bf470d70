use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use triage_core::status::{
    ClinicalActionState, MedicationStatus, ProcessingStatus, ReviewOwnership, StatusLabelConfig,
};
use triage_core::{
    sweep_store, CancellationToken, CoreConfig, JsonDirStore, SubmissionRecord, TriageDecision,
    TriageEngine, UrgencyLevel,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Triage SLA and escalation engine CLI")]
struct Cli {
    /// SLA threshold table YAML (defaults to the built-in table)
    #[arg(long, global = true, env = "TRIAGE_SLA_TABLE")]
    sla_table: Option<PathBuf>,
    /// Status label overlay YAML
    #[arg(long, global = true, env = "TRIAGE_STATUS_REGISTRY")]
    status_registry: Option<PathBuf>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the SLA threshold table
    Thresholds,
    /// Show the status labels for every axis value
    Labels,
    /// Evaluate a single submission JSON file
    Evaluate {
        /// Path to the submission record
        file: PathBuf,
        /// Evaluation instant, RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<String>,
    },
    /// Evaluate every submission in a directory
    Sweep {
        /// Directory of `*.json` submission records
        dir: PathBuf,
        /// Evaluation instant, RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<String>,
        /// Only list submissions that require escalation
        #[arg(long)]
        escalations_only: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'triage --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::new(
        cli.sla_table,
        cli.status_registry,
        PathBuf::from(triage_core::DEFAULT_SUBMISSIONS_DIR),
        CoreConfig::default().sweep_interval(),
    )?;
    let engine = TriageEngine::from_config(&cfg)?;

    match command {
        Commands::Thresholds => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(engine.thresholds())?);
            } else {
                print!("{}", render_thresholds(&engine));
            }
        }
        Commands::Labels => {
            if cli.json {
                let labels: serde_json::Map<String, serde_json::Value> = label_table(&engine)?
                    .into_iter()
                    .map(|(axis, entries)| -> anyhow::Result<_> {
                        let entries: BTreeMap<_, _> = entries.into_iter().collect();
                        Ok((axis.to_string(), serde_json::to_value(entries)?))
                    })
                    .collect::<anyhow::Result<_>>()?;
                println!("{}", serde_json::to_string_pretty(&labels)?);
            } else {
                print!("{}", render_labels(&label_table(&engine)?));
            }
        }
        Commands::Evaluate { file, now } => {
            let now = parse_now(now.as_deref())?;
            let record = read_record(&file)?;
            let decision = engine.compose_record(&record, now)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            } else {
                println!("{}", render_decision(&decision));
            }
        }
        Commands::Sweep {
            dir,
            now,
            escalations_only,
        } => {
            let now = parse_now(now.as_deref())?;
            if !dir.is_dir() {
                anyhow::bail!("Not a directory: {}", dir.display());
            }
            let store = JsonDirStore::new(dir);
            let report = sweep_store(&engine, &store, now, &CancellationToken::new())?;

            let mut decisions: Vec<&TriageDecision> = if escalations_only {
                report.escalations().collect()
            } else {
                report.decisions.iter().collect()
            };
            decisions.sort_by(|a, b| a.submission_id.as_str().cmp(b.submission_id.as_str()));

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&decisions)?);
            } else {
                for decision in &decisions {
                    println!("{}", render_decision(decision));
                }
                for failure in &report.failures {
                    eprintln!("Skipped {}: {}", failure.submission_id, failure.error);
                }
                println!(
                    "Evaluated {} submission(s), {} escalation(s), {} skipped.",
                    report.decisions.len(),
                    report.escalations().count(),
                    report.failures.len()
                );
            }
        }
    }

    Ok(())
}

fn parse_now(now: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match now {
        None => Ok(Utc::now()),
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("--now must be RFC 3339, got '{raw}'"))?
            .with_timezone(&Utc)),
    }
}

fn read_record(path: &Path) -> anyhow::Result<SubmissionRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid submission in {}", path.display()))
}

type AxisLabels<'a> = (&'static str, Vec<(&'static str, &'a StatusLabelConfig)>);

/// Every registered label, grouped by axis in a fixed order.
fn label_table(engine: &TriageEngine) -> anyhow::Result<Vec<AxisLabels<'_>>> {
    let registry = engine.registry();
    Ok(vec![
        (
            "processing_status",
            ProcessingStatus::ALL
                .into_iter()
                .map(|v| -> anyhow::Result<_> { Ok((v.as_str(), registry.processing(v)?)) })
                .collect::<anyhow::Result<_>>()?,
        ),
        (
            "review_ownership",
            ReviewOwnership::ALL
                .into_iter()
                .map(|v| -> anyhow::Result<_> { Ok((v.as_str(), registry.ownership(v)?)) })
                .collect::<anyhow::Result<_>>()?,
        ),
        (
            "clinical_action_state",
            ClinicalActionState::ALL
                .into_iter()
                .map(|v| -> anyhow::Result<_> { Ok((v.as_str(), registry.clinical(v)?)) })
                .collect::<anyhow::Result<_>>()?,
        ),
        (
            "medication_status",
            MedicationStatus::ALL
                .into_iter()
                .map(|v| -> anyhow::Result<_> { Ok((v.as_str(), registry.medication(v)?)) })
                .collect::<anyhow::Result<_>>()?,
        ),
    ])
}

fn render_thresholds(engine: &TriageEngine) -> String {
    let mut out = String::new();
    for level in UrgencyLevel::ALL {
        let spec = engine.thresholds_for(level);
        let roles: Vec<_> = spec.escalate_to.iter().map(|r| r.as_str()).collect();
        out.push_str(&format!(
            "{:<10} warn {:>6} min  breach {:>6} min  escalate to: {}\n",
            level.as_str(),
            spec.warn_offset_minutes,
            spec.breach_offset_minutes,
            if roles.is_empty() {
                "-".to_string()
            } else {
                roles.join(", ")
            }
        ));
    }
    out
}

fn render_label(value: &str, cfg: &StatusLabelConfig) -> String {
    format!(
        "  {:<24} {:<28} {:<7}{}\n",
        value,
        cfg.label,
        cfg.color.as_str(),
        if cfg.is_terminal { " terminal" } else { "" }
    )
}

fn render_labels(table: &[AxisLabels<'_>]) -> String {
    let mut out = String::new();
    for (axis, entries) in table {
        out.push_str(axis);
        out.push('\n');
        for (value, cfg) in entries {
            out.push_str(&render_label(value, cfg));
        }
    }
    out
}

fn render_decision(decision: &TriageDecision) -> String {
    let compliance = &decision.compliance;
    let mut line = format!(
        "{}  [{}] {} | {} | {}  {}",
        decision.submission_id,
        decision.urgency_level,
        compliance.color.as_str(),
        decision.labels.processing.label,
        compliance.message,
        compliance.countdown.formatted,
    );
    if decision.escalation.requires {
        let roles: Vec<_> = decision
            .escalation
            .escalate_to
            .iter()
            .map(|r| r.as_str())
            .collect();
        line.push_str(&format!("  ESCALATE -> {}", roles.join(", ")));
    }
    line
}
