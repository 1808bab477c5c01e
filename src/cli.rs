use clap::Parser as ClapParser;
use clap::Subcommand;
use std::io::Read;
use std::path::PathBuf;

use dragnet::judge::{load_model_config, CommandClient, Sampler};
use dragnet::logger;
use dragnet::output;
use dragnet::registry::Registry;
use dragnet::rules::config::{load_embedded_rules, load_rules, AutomationRule, RuleKind, RulesFile};
use dragnet::types::{EvalReport, Outcome, RuleReport, TraceRecord};

#[derive(ClapParser)]
#[command(
    name = "dragnet",
    version,
    about = "LLM-as-judge automation rules for trace streams"
)]
struct Cli {
    /// Path to rules YAML file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Seed the sampling gate for reproducible runs
    #[arg(long, value_name = "N", global = true)]
    seed: Option<u64>,

    /// Evaluate every rule regardless of its sampling rate
    #[arg(long, global = true)]
    no_sampling: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a batch of JSONL records against the rules
    Check {
        /// File with one JSON record per line (stdin if omitted)
        file: Option<PathBuf>,

        /// Show only: scored, skipped, failed
        #[arg(short, long)]
        filter: Option<StatusFilter>,
    },
    /// Show current rule configuration
    Rules {
        /// Show declared output fields and checks per rule
        #[arg(short, long)]
        verbose: bool,

        /// Show only: llm-as-judge, field-checks
        #[arg(short, long)]
        kind: Option<KindFilter>,
    },
    /// Validate a rules file and report every violation
    Validate {
        /// Rules file to validate (falls back to --config, then defaults)
        file: Option<PathBuf>,
    },
    /// Extract embedded starter config to ~/.config/dragnet/ for customization
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Clone, clap::ValueEnum)]
enum StatusFilter {
    Scored,
    Skipped,
    Failed,
}

impl StatusFilter {
    fn matches(&self, status: &str) -> bool {
        match self {
            StatusFilter::Scored => status == "scored",
            StatusFilter::Skipped => status == "skipped",
            StatusFilter::Failed => status != "scored" && status != "skipped",
        }
    }
}

#[derive(Clone, clap::ValueEnum)]
enum KindFilter {
    LlmAsJudge,
    FieldChecks,
}

impl KindFilter {
    fn to_rule_kind(&self) -> RuleKind {
        match self {
            KindFilter::LlmAsJudge => RuleKind::LlmAsJudge,
            KindFilter::FieldChecks => RuleKind::FieldChecks,
        }
    }
}

/// Default config directory.
fn config_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".config").join("dragnet")
}

/// Default rules file path.
fn default_config_path() -> PathBuf {
    config_dir().join("rules.yaml")
}

/// Load rules with fallback: --config flag > default path > embedded.
fn load_config(explicit_path: Option<&PathBuf>) -> Result<RulesFile, String> {
    if let Some(path) = explicit_path {
        return load_rules(path);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        return load_rules(&default_path);
    }

    load_embedded_rules()
}

/// Main entry point. Returns the process exit code.
pub fn run() -> i32 {
    yansi::whenever(yansi::Condition::TTY_AND_COLOR);

    let cli = Cli::parse();

    // Handle Init early (no config needed)
    if let Some(Commands::Init { force }) = &cli.command {
        return run_init(*force);
    }

    // Handle Validate early (it reports violations instead of refusing to run)
    if let Some(Commands::Validate { file }) = &cli.command {
        return run_validate(file.as_ref().or(cli.config.as_ref()));
    }

    let rules_file = match load_config(cli.config.as_ref()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("dragnet: {e}");
            return 2;
        }
    };

    // Invalid rules never activate.
    let registry = Registry::with_builtins();
    if let Err(e) = registry.validate(&rules_file.rules) {
        eprintln!("dragnet: invalid rules configuration:");
        for violation in &e.violations {
            eprintln!("dragnet:   {violation}");
        }
        return 2;
    }

    let mut sampler = match cli.seed {
        Some(seed) => Sampler::seeded(seed),
        None => Sampler::new(),
    };

    match cli.command {
        Some(Commands::Check { file, filter }) => run_check(
            &registry,
            &rules_file.rules,
            file,
            filter,
            &mut sampler,
            cli.no_sampling,
        ),
        Some(Commands::Rules { verbose, kind }) => run_rules(&rules_file.rules, verbose, kind),
        Some(Commands::Validate { .. }) => unreachable!(), // handled above
        Some(Commands::Init { .. }) => unreachable!(),     // handled above
        None => run_evaluate(&registry, &rules_file.rules, &mut sampler, cli.no_sampling),
    }
}

/// Evaluate mode: read one trace record from stdin, run every rule, print a
/// JSON report. Per-rule failures are data in the report, not process errors.
fn run_evaluate(
    registry: &Registry,
    rules: &[AutomationRule],
    sampler: &mut Sampler,
    no_sampling: bool,
) -> i32 {
    let mut input_str = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input_str) {
        eprintln!("dragnet: failed to read stdin: {e}");
        return 2;
    }

    let record = match TraceRecord::parse(&input_str) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("dragnet: {e}");
            return 2;
        }
    };

    let client = CommandClient::from_config(&load_model_config());
    let results = registry.evaluate_all(rules, &record, &client, sampler, no_sampling);

    for (rule, report) in rules.iter().zip(&results) {
        let entry = logger::make_entry(rule, &record, &report.outcome);
        logger::log_outcome(&entry);
    }

    let report = EvalReport {
        record_id: record.id.clone(),
        results,
    };
    print_json(&report);

    0
}

fn run_check(
    registry: &Registry,
    rules: &[AutomationRule],
    file: Option<PathBuf>,
    filter: Option<StatusFilter>,
    sampler: &mut Sampler,
    no_sampling: bool,
) -> i32 {
    let input = match read_check_input(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("dragnet: {e}");
            return 1;
        }
    };

    let mut rows: Vec<(String, String, String, String)> = Vec::new();
    let mut records = 0usize;
    let mut counts = (0usize, 0usize, 0usize); // scored, skipped, failed

    let client = CommandClient::from_config(&load_model_config());

    for (line_no, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let label_fallback = format!("line {}", line_no + 1);
        let record = match TraceRecord::parse(line) {
            Ok(r) => r,
            Err(e) => {
                rows.push((label_fallback, "-".to_string(), "invalid".to_string(), e));
                continue;
            }
        };
        records += 1;
        let label = record.id.clone().unwrap_or(label_fallback);

        for report in registry.evaluate_all(rules, &record, &client, sampler, no_sampling) {
            let (status, detail) = describe(&report);
            match status.as_str() {
                "scored" => counts.0 += 1,
                "skipped" => counts.1 += 1,
                _ => counts.2 += 1,
            }
            let show = match &filter {
                Some(f) => f.matches(&status),
                None => true,
            };
            if show {
                rows.push((label.clone(), report.rule, status, detail));
            }
        }
    }

    println!("{}", output::check_table(&rows));
    println!(
        "{} records, {} evaluations ({} scored, {} skipped, {} failed)",
        records,
        counts.0 + counts.1 + counts.2,
        counts.0,
        counts.1,
        counts.2
    );

    0
}

/// Status and a short human detail for one rule report.
fn describe(report: &RuleReport) -> (String, String) {
    match &report.outcome {
        Outcome::Skipped => ("skipped".to_string(), String::new()),
        Outcome::Scored { scores } => {
            let failed = scores.iter().filter(|s| s.failure.is_some()).count();
            let detail = if failed == 0 {
                format!("{} fields", scores.len())
            } else {
                format!("{failed}/{} fields failed", scores.len())
            };
            ("scored".to_string(), detail)
        }
        Outcome::Failed { reason } => ("failed".to_string(), reason.clone()),
    }
}

fn read_check_input(file: Option<PathBuf>) -> Result<String, String> {
    match file {
        Some(path) if path.to_str() != Some("-") => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display())),
        _ => {
            if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
                return Err(
                    "No input provided. Pass a file or pipe JSONL records to stdin.".to_string(),
                );
            }
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {e}"))?;
            Ok(buf)
        }
    }
}

fn run_rules(rules: &[AutomationRule], verbose: bool, kind: Option<KindFilter>) -> i32 {
    let filtered: Vec<&AutomationRule> = rules
        .iter()
        .filter(|r| match &kind {
            Some(k) => r.code.kind() == k.to_rule_kind(),
            None => true,
        })
        .collect();

    if verbose {
        println!("{}", output::rules_table_verbose(&filtered));
    } else {
        println!("{}", output::rules_table(&filtered));
    }

    let judges = filtered
        .iter()
        .filter(|r| r.code.kind() == RuleKind::LlmAsJudge)
        .count();
    println!(
        "{} rules ({} llm_as_judge, {} field_checks)",
        filtered.len(),
        judges,
        filtered.len() - judges
    );

    0
}

fn run_validate(path: Option<&PathBuf>) -> i32 {
    let rules_file = match load_config(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("dragnet: {e}");
            return 2;
        }
    };

    let registry = Registry::with_builtins();
    match registry.validate(&rules_file.rules) {
        Ok(()) => {
            println!("rules OK ({} rules)", rules_file.rules.len());
            0
        }
        Err(e) => {
            for violation in &e.violations {
                println!("{violation}");
            }
            println!("{} violations", e.violations.len());
            1
        }
    }
}

fn run_init(force: bool) -> i32 {
    let target_dir = config_dir();
    let rules_yaml_path = target_dir.join("rules.yaml");

    if rules_yaml_path.exists() && !force {
        eprintln!(
            "dragnet: {} already exists. Use --force to overwrite.",
            rules_yaml_path.display()
        );
        return 1;
    }

    if let Err(e) = std::fs::create_dir_all(&target_dir) {
        eprintln!("dragnet: failed to create {}: {e}", target_dir.display());
        return 1;
    }

    for (name, content) in dragnet::embedded_rules::all_files() {
        let file_path = target_dir.join(name);
        if let Err(e) = std::fs::write(&file_path, content) {
            eprintln!("dragnet: failed to write {}: {e}", file_path.display());
            return 1;
        }
    }

    println!("Starter config written to {}", target_dir.display());
    println!("Edit {} to customize.", rules_yaml_path.display());

    0
}

/// Print a JSON value to stdout.
fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("dragnet: failed to serialize output: {e}");
            println!("{{}}");
        }
    }
}
