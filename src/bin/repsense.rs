//! Repsense CLI - Command-line interface for the Repsense engine
//!
//! Commands:
//! - analyze: Score a complete transcript (batch mode)
//! - run: Process streaming turns from stdin (streaming mode)
//! - validate: Validate transcript input
//! - schema: Print schema information
//! - doctor: Diagnose engine health and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use repsense::session::Session;
use repsense::types::{Speaker, Transcript, Turn, TurnAssessment};
use repsense::{EngineError, ENGINE_VERSION, METRICS_SPEC_VERSION, PRODUCER_NAME};

/// Repsense - Deterministic signal detection and scoring for sales conversations
#[derive(Parser)]
#[command(name = "repsense")]
#[command(author = "Repsense Labs")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score sales-conversation transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a complete transcript (batch mode)
    Analyze {
        /// Input transcript file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Session ID for provenance and deterministic selection
        #[arg(long, default_value = "cli-session")]
        session_id: String,

        /// Mood label applied to counterpart turns
        #[arg(long)]
        mood: Option<String>,

        /// Conversational state label from scenario metadata
        #[arg(long)]
        state: Option<String>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Process streaming turns from stdin (one turn JSON per line)
    Run {
        /// Session ID
        #[arg(long, default_value = "cli-session")]
        session_id: String,

        /// Mood label applied to counterpart turns
        #[arg(long)]
        mood: Option<String>,

        /// Conversational state label from scenario metadata
        #[arg(long)]
        state: Option<String>,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Validate transcript input
    Validate {
        /// Input transcript file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (transcript turns)
    Input,
    /// Output schema (assessment payload)
    Output,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliErrorReport::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            session_id,
            mood,
            state,
            output_format,
        } => cmd_analyze(
            &input,
            &output,
            &session_id,
            mood.as_deref(),
            state.as_deref(),
            output_format,
        ),

        Commands::Run {
            session_id,
            mood,
            state,
            flush,
        } => cmd_run(&session_id, mood.as_deref(), state.as_deref(), flush),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),

        Commands::Doctor { json } => cmd_doctor(json),
    }
}

fn read_input(input: &PathBuf) -> Result<String, CliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn cmd_analyze(
    input: &PathBuf,
    output: &PathBuf,
    session_id: &str,
    mood: Option<&str>,
    state: Option<&str>,
    output_format: OutputFormat,
) -> Result<(), CliError> {
    let input_data = read_input(input)?;
    let transcript: Transcript = serde_json::from_str(&input_data)?;

    if transcript.is_empty() {
        return Err(CliError::NoTurns);
    }
    transcript.validate()?;

    let mut session = Session::new(session_id);
    if let Some(label) = state {
        session.set_state_label(label)?;
    }

    // Replay the transcript turn by turn, keeping the final assessment
    let mut last_assessment: Option<TurnAssessment> = None;
    for turn in transcript.turns() {
        match turn.speaker {
            Speaker::Rep => {
                session.advance_rep_turn(&turn.text)?;
            }
            Speaker::Counterpart => {
                last_assessment = Some(session.advance_counterpart_turn(&turn.text, mood)?);
            }
        }
    }

    // A rep-only transcript still yields scores, just no cue assessment
    let assessment = match last_assessment {
        Some(assessment) => assessment,
        None => TurnAssessment {
            cues: Vec::new(),
            description: repsense::Describer::describe(&[], ""),
            metrics: session.latest_results().to_vec(),
        },
    };

    let payload = session.encode(assessment);
    let output_data = match output_format {
        OutputFormat::Json => serde_json::to_string(&payload)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&payload)?,
    };

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(
    session_id: &str,
    mood: Option<&str>,
    state: Option<&str>,
    flush: bool,
) -> Result<(), CliError> {
    let mut session = Session::new(session_id);
    if let Some(label) = state {
        session.set_state_label(label)?;
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let turn: Turn = serde_json::from_str(trimmed)
            .map_err(|e| CliError::ParseError(format!("Failed to parse turn: {}", e)))?;

        let record = match turn.speaker {
            Speaker::Rep => {
                let feedback = session.advance_rep_turn(&turn.text)?;
                serde_json::to_string(&feedback)?
            }
            Speaker::Counterpart => {
                let assessment = session.advance_counterpart_turn(&turn.text, mood)?;
                let payload = session.encode(assessment);
                serde_json::to_string(&payload)?
            }
        };

        writeln!(stdout, "{}", record)?;
        if flush {
            stdout.flush()?;
        }
    }

    // Final snapshot closes the stream
    writeln!(stdout, "{}", session.snapshot().to_json()?)?;
    stdout.flush()?;

    Ok(())
}

fn cmd_validate(input: &PathBuf, json: bool) -> Result<(), CliError> {
    let input_data = read_input(input)?;
    let transcript: Transcript = serde_json::from_str(&input_data)?;

    let mut errors: Vec<ValidationErrorDetail> = Vec::new();
    for (index, turn) in transcript.turns().iter().enumerate() {
        if turn.text.trim().is_empty() {
            errors.push(ValidationErrorDetail {
                index,
                error: "empty text".to_string(),
            });
        }
    }

    let report = ValidationReport {
        total_turns: transcript.len(),
        rep_turns: transcript.rep_turns().count(),
        counterpart_turns: transcript.counterpart_turns().count(),
        invalid_turns: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total turns:       {}", report.total_turns);
        println!("Rep turns:         {}", report.rep_turns);
        println!("Counterpart turns: {}", report.counterpart_turns);
        println!("Invalid turns:     {}", report.invalid_turns);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Turn {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_turns > 0 {
        Err(CliError::ValidationFailed(report.invalid_turns))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), CliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input Schema: transcript");
            println!();
            println!("A transcript is a JSON array of turns, in conversation order:");
            println!();
            println!("  [{{ \"speaker\": \"rep\" | \"counterpart\", \"text\": \"...\" }}, ...]");
            println!();
            println!("Streaming mode (run) takes one turn object per line instead.");
            println!("Turn text must be non-empty; order is semantically meaningful.");
        }
        SchemaType::Output => {
            println!("Output Schema: assessment payload");
            println!();
            println!("- assessment_version: Payload version (1.0.0)");
            println!("- producer: {{ name, version, instance_id }}");
            println!("- session: {{ session_id, turn_count }}");
            println!("- computed_at_utc: RFC3339 timestamp");
            println!("- cues: Selected behavioral cues for the latest counterpart turn");
            println!("- description: {{ body_language, vocal_tone, physical_cues, overall_description }}");
            println!("- metrics: Eight metric results, each with:");
            println!("  - components: {{ name, score (1-5 or null), applicable, weight, rationale }}");
            println!("  - overall_score: weighted/plain average, or null");
            println!("  - not_applicable: true when no evidence was observed");
        }
    }

    Ok(())
}

fn cmd_doctor(json: bool) -> Result<(), CliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Repsense version {}", ENGINE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "metrics_spec".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "Metric catalog {} ({} metrics)",
            METRICS_SPEC_VERSION,
            repsense::metric_specs().len()
        ),
    });

    // Weight sums are a load-time invariant worth re-checking in the field
    let mut weight_status = CheckStatus::Ok;
    let mut weight_message = "Component weights sum to 1.0 for every metric".to_string();
    for spec in repsense::metric_specs() {
        let sum: f64 = spec.components.iter().map(|c| c.weight).sum();
        if (sum - 1.0).abs() > 1e-6 {
            weight_status = CheckStatus::Error;
            weight_message = format!("{:?} weights sum to {sum}", spec.id);
            break;
        }
    }
    checks.push(DoctorCheck {
        name: "component_weights".to_string(),
        status: weight_status,
        message: weight_message,
    });

    checks.push(DoctorCheck {
        name: "taxonomy".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "{} counterpart cues, {} rep metric cues",
            repsense::taxonomy::COUNTERPART_CUES.len(),
            repsense::taxonomy::REP_METRIC_CUES.len()
        ),
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
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Repsense Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(CliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    NoTurns,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Engine(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliErrorReport {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliError> for CliErrorReport {
    fn from(e: CliError) -> Self {
        match e {
            CliError::Io(e) => CliErrorReport {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CliError::Engine(e) => CliErrorReport {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'repsense validate' on the input".to_string()),
            },
            CliError::Json(e) => CliErrorReport {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax against 'repsense schema input'".to_string()),
            },
            CliError::NoTurns => CliErrorReport {
                code: "NO_TURNS".to_string(),
                message: "No turns found in input".to_string(),
                hint: Some("Ensure the transcript array is not empty".to_string()),
            },
            CliError::ValidationFailed(count) => CliErrorReport {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} turns failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            CliError::DoctorFailed => CliErrorReport {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            CliError::ParseError(msg) => CliErrorReport {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_turns: usize,
    rep_turns: usize,
    counterpart_turns: usize,
    invalid_turns: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
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
