//! Flow CLI - Command-line interface for Flow Interact
//!
//! Commands:
//! - replay: Replay a recorded signal log against a page model (batch mode)
//! - resolve: Resolve a scroll target against a page model
//! - doctor: Diagnose engine health and configuration

use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use flow_interact::signal::{
    CardFlipDetail, FloatingCallDetail, ScrollTopDetail, Signal, SpecialtyClickDetail,
};
use flow_interact::tracking::{MemorySink, Tracker};
use flow_interact::{
    attorneys, geometry, DomQuery, InteractError, PageController, PageModel, ENGINE_VERSION,
    PRODUCER_NAME,
};

/// Flow - Scroll-navigation and analytics interaction core
#[derive(Parser)]
#[command(name = "flow")]
#[command(author = "Flow Components")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Replay page signals into tracked analytics events", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded signal log against a page model (batch mode)
    Replay {
        /// Page model JSON file (use - for stdin)
        #[arg(short, long)]
        page: PathBuf,

        /// Signal log, one JSON record per line (use - for stdin)
        #[arg(short, long)]
        signals: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Skip the service-highlights re-layout workaround
        #[arg(long)]
        no_relayout: bool,
    },

    /// Resolve a scroll target against a page model
    Resolve {
        /// Page model JSON file (use - for stdin)
        #[arg(short, long)]
        page: PathBuf,

        /// Target element id
        #[arg(short, long)]
        target: String,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), FlowCliError> {
    match cli.command {
        Commands::Replay {
            page,
            signals,
            output,
            no_relayout,
        } => cmd_replay(&page, &signals, &output, no_relayout),

        Commands::Resolve { page, target } => cmd_resolve(&page, &target),

        Commands::Doctor { json } => cmd_doctor(json),
    }
}

/// One line of a recorded signal log.
#[derive(serde::Deserialize)]
struct SignalRecord {
    /// Host clock at delivery, in milliseconds.
    #[serde(default)]
    at_ms: u64,
    #[serde(flatten)]
    kind: SignalKind,
}

#[derive(serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SignalKind {
    Click {
        target_id: String,
    },
    CardFlip {
        name: String,
        is_flipped: bool,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    SpecialtyClick {
        service_id: String,
        specialty: String,
        #[serde(default)]
        attorney_name: Option<String>,
    },
    FloatingCall {
        timestamp_ms: i64,
        #[serde(default)]
        phone_number: Option<String>,
        scroll_position: f64,
    },
    ScrollTop {
        timestamp_ms: i64,
        scroll_position: f64,
    },
}

impl SignalKind {
    fn into_signal(self, page: &PageModel) -> Result<Signal, FlowCliError> {
        Ok(match self {
            SignalKind::Click { target_id } => {
                let target = page.element_by_id(&target_id).ok_or_else(|| {
                    FlowCliError::Interact(InteractError::TargetNotFound(target_id))
                })?;
                Signal::Click { target }
            }
            SignalKind::CardFlip {
                name,
                is_flipped,
                timestamp,
            } => Signal::CardFlip(CardFlipDetail {
                name,
                is_flipped,
                timestamp,
            }),
            SignalKind::SpecialtyClick {
                service_id,
                specialty,
                attorney_name,
            } => Signal::SpecialtyClick(SpecialtyClickDetail {
                service_id,
                specialty,
                attorney_name,
            }),
            SignalKind::FloatingCall {
                timestamp_ms,
                phone_number,
                scroll_position,
            } => Signal::FloatingCallClick(FloatingCallDetail {
                timestamp_ms,
                phone_number,
                scroll_position,
            }),
            SignalKind::ScrollTop {
                timestamp_ms,
                scroll_position,
            } => Signal::ScrollTopClick(ScrollTopDetail {
                timestamp_ms,
                scroll_position,
            }),
        })
    }
}

fn cmd_replay(
    page_path: &PathBuf,
    signals_path: &PathBuf,
    output: &PathBuf,
    no_relayout: bool,
) -> Result<(), FlowCliError> {
    let mut page = PageModel::from_json(&read_input(page_path)?)?;
    let signal_data = read_input(signals_path)?;

    let sink = Rc::new(RefCell::new(MemorySink::new()));
    let mut controller = PageController::new(Tracker::new(Box::new(sink.clone())));
    if no_relayout {
        controller.set_relayout_workaround(false);
    }

    controller.initialize(&mut page, 0);
    controller.on_frame(&page);

    for (index, line) in signal_data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: SignalRecord = serde_json::from_str(trimmed).map_err(|e| {
            FlowCliError::ParseError(format!("signal line {}: {}", index + 1, e))
        })?;

        controller.on_timers(&mut page, record.at_ms);
        let signal = record.kind.into_signal(&page)?;
        controller.handle_signal(&mut page, record.at_ms, &signal);
        controller.on_viewport_change(&page);
    }

    let mut out = String::new();
    for event in &sink.borrow().events {
        out.push_str(&serde_json::to_string(event)?);
        out.push('\n');
    }
    write_output(output, &out)?;

    Ok(())
}

#[derive(serde::Serialize)]
struct ResolveReport {
    target: geometry::ScrollTarget,
    navbar: geometry::NavBarMetrics,
}

fn cmd_resolve(page_path: &PathBuf, target_id: &str) -> Result<(), FlowCliError> {
    let page = PageModel::from_json(&read_input(page_path)?)?;

    let report = ResolveReport {
        target: geometry::resolve_scroll_target(&page, target_id)?,
        navbar: geometry::navbar_metrics(&page),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn cmd_doctor(json: bool) -> Result<(), FlowCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Engine version {}", ENGINE_VERSION),
    });

    let directory_size = attorneys::directory().len();
    checks.push(DoctorCheck {
        name: "attorney_directory".to_string(),
        status: if directory_size > 0 {
            CheckStatus::Ok
        } else {
            CheckStatus::Warning
        },
        message: format!("{} attorney records loaded", directory_size),
    });

    // Exercise the resolver against a synthetic page.
    let mut probe = PageModel::new(1024.0, 768.0);
    probe
        .element("section")
        .id("probe")
        .rect(flow_interact::Rect::new(0.0, 500.0, 1024.0, 100.0))
        .insert();
    checks.push(match geometry::resolve_scroll_target(&probe, "probe") {
        Ok(target) => DoctorCheck {
            name: "geometry".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Resolver ok (fallback navbar, offset {}, padding {})",
                target.offset, target.padding
            ),
        },
        Err(e) => DoctorCheck {
            name: "geometry".to_string(),
            status: CheckStatus::Error,
            message: format!("Resolver failed on synthetic page: {}", e),
        },
    });

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (replay mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let failed = checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Error));
    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} {}", report.producer, report.version);
        for check in &report.checks {
            let status = match check.status {
                CheckStatus::Ok => "OK",
                CheckStatus::Warning => "WARN",
                CheckStatus::Error => "ERROR",
            };
            println!("[{}] {}: {}", status, check.name, check.message);
        }
    }

    if failed {
        Err(FlowCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn read_input(path: &PathBuf) -> Result<String, FlowCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(path: &PathBuf, data: &str) -> Result<(), FlowCliError> {
    if path.to_string_lossy() == "-" {
        io::stdout().write_all(data.as_bytes())?;
        Ok(())
    } else {
        Ok(fs::write(path, data)?)
    }
}

enum FlowCliError {
    Io(io::Error),
    Json(serde_json::Error),
    Interact(InteractError),
    ParseError(String),
    DoctorFailed,
}

impl From<io::Error> for FlowCliError {
    fn from(e: io::Error) -> Self {
        FlowCliError::Io(e)
    }
}

impl From<serde_json::Error> for FlowCliError {
    fn from(e: serde_json::Error) -> Self {
        FlowCliError::Json(e)
    }
}

impl From<InteractError> for FlowCliError {
    fn from(e: InteractError) -> Self {
        FlowCliError::Interact(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FlowCliError> for CliError {
    fn from(e: FlowCliError) -> Self {
        match e {
            FlowCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FlowCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FlowCliError::Interact(e) => CliError {
                code: "INTERACT_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check that the page model contains the referenced elements".to_string()),
            },
            FlowCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check the signal log format".to_string()),
            },
            FlowCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
