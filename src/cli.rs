//! Command-line interface for codechat.

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::analysis::{AnalysisOptions, CodeAnalyzer};
use crate::classify::{self, ClassifyContext, ContentType, FileRef};
use crate::diff::{self, DiffCounts};
use crate::prompt::{self, PromptRequest, PromptTemplate, Turn};
use crate::report::{
    self, AnalyzeReport, ClassifyReport, DiffReport, FileAnalysis, GuessReport, PromptReport,
    RuleEntry, RulesReport,
};
use crate::rules::{self, ActiveRules, RuleBook, SuggestContext};
use crate::settings::Settings;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Extensions picked up when analyzing a directory.
const ANALYZED_EXTENSIONS: &[&str] = &["py", "pyw", "pyi", "js", "ts", "html"];

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "__pycache__", "venv", "target"];

/// Content classification, rule selection and code analysis for a chat-based
/// coding assistant.
#[derive(Parser)]
#[command(name = "codechat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: pretty or json
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: String,

    /// Path to settings YAML file (default: auto-discover)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a message as conversation, code, data or general
    Classify(ClassifyArgs),
    /// Guess the programming language of a snippet
    Guess(TextArgs),
    /// Extract fenced code blocks from a message
    Blocks(TextArgs),
    /// Show the active rules for a message or content type
    Rules(RulesArgs),
    /// Build the system prompt for a message
    Prompt(PromptArgs),
    /// Analyze a source file or directory
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Show an ndiff of two files with a change summary
    Diff(DiffArgs),
}

/// A single text argument; `-` reads standard input.
#[derive(Args)]
pub struct TextArgs {
    /// Text to process, or - for stdin
    pub input: String,
}

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Text to classify, or - for stdin
    pub input: String,

    /// Extension of the file the text came from (e.g. .py)
    #[arg(long)]
    pub file_type: Option<String>,

    /// Names of files available in the conversation
    #[arg(long, num_args = 1..)]
    pub files: Vec<String>,
}

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    /// Message used to suggest rule categories
    #[arg(short, long)]
    pub input: Option<String>,

    /// Names of files available in the conversation
    #[arg(long, num_args = 1..)]
    pub files: Vec<String>,

    /// Preset to apply (conversational, technical, full_stack, data_pipeline)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Content type to select rules for (default: classified from input)
    #[arg(long)]
    pub content_type: Option<String>,
}

/// Arguments for the prompt command.
#[derive(Args)]
pub struct PromptArgs {
    /// Message to build the prompt for, or - for stdin
    pub input: String,

    /// Names of files available in the conversation
    #[arg(long, num_args = 1..)]
    pub files: Vec<String>,

    /// Preset to apply
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Template: general, code_analysis, code_explanation, data_analysis
    #[arg(short, long)]
    pub template: Option<String>,

    /// JSON file with earlier turns: [{"role": ..., "content": ...}]
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Maximum prompt length in characters (default: from settings)
    #[arg(long)]
    pub max_length: Option<usize>,
}

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Earlier version of the file, for version changes
    #[arg(long)]
    pub previous: Option<PathBuf>,

    /// Extra rules to enable on top of the code defaults
    #[arg(short, long, num_args = 1..)]
    pub rules: Vec<String>,

    /// Preset to apply
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Exit with status 1 when any issue is reported
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the diff command.
#[derive(Args)]
pub struct DiffArgs {
    /// Previous version
    pub old: PathBuf,
    /// Current version
    pub new: PathBuf,
}

/// Install the stderr log subscriber for the given verbosity.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Dispatch a parsed command line and return the exit code.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    if cli.format != "pretty" && cli.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            cli.format
        );
        return Ok(EXIT_ERROR);
    }

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if let Err(e) = settings.validate() {
        eprintln!("Error: invalid settings: {}", e);
        return Ok(EXIT_ERROR);
    }

    let json = cli.format == "json";
    match &cli.command {
        Commands::Classify(args) => run_classify(args, json),
        Commands::Guess(args) => run_guess(args, json),
        Commands::Blocks(args) => run_blocks(args, json),
        Commands::Rules(args) => run_rules(args, &settings, json),
        Commands::Prompt(args) => run_prompt(args, &settings, json),
        Commands::Analyze(args) => run_analyze(args, &settings, json),
        Commands::Diff(args) => run_diff(args, json),
    }
}

/// Text argument, or all of stdin for `-`.
fn read_input(input: &str) -> anyhow::Result<String> {
    if input != "-" {
        return Ok(input.to_string());
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn file_refs(names: &[String]) -> Vec<FileRef> {
    names.iter().map(FileRef::new).collect()
}

/// Run the classify command.
pub fn run_classify(args: &ClassifyArgs, json: bool) -> anyhow::Result<i32> {
    let text = read_input(&args.input)?;
    let files = file_refs(&args.files);
    let ctx = ClassifyContext {
        file_type: args.file_type.as_deref(),
        available_files: Some(&files),
    };

    let report = ClassifyReport {
        content_type: classify::classify(&text, Some(&ctx)),
        conversational_phrasing: classify::has_conversational_phrasing(&text),
        contains_code: classify::contains_code(&text),
        contains_structured_data: classify::contains_structured_data(&text),
    };

    if json {
        report::write_json(&report)?;
    } else {
        report::write_classify_pretty(&report);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the guess command.
pub fn run_guess(args: &TextArgs, json: bool) -> anyhow::Result<i32> {
    let text = read_input(&args.input)?;
    let report = GuessReport::new(
        classify::guess_language(&text),
        &classify::score_languages(&text),
    );

    if json {
        report::write_json(&report)?;
    } else {
        report::write_guess_pretty(&report);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the blocks command.
pub fn run_blocks(args: &TextArgs, json: bool) -> anyhow::Result<i32> {
    let text = read_input(&args.input)?;
    let message = classify::format_message_with_code(&text);

    if json {
        report::write_json(&message)?;
    } else {
        report::write_blocks_pretty(&message);
    }
    Ok(EXIT_SUCCESS)
}

/// Preset from the command line, else the configured default.
fn resolve_preset<'a>(
    book: &RuleBook,
    explicit: Option<&'a str>,
    settings: &'a Settings,
) -> anyhow::Result<Option<&'a str>> {
    let preset = explicit.or(settings.default_preset.as_deref());
    if let Some(name) = preset {
        if book.preset(name).is_none() {
            let known: Vec<&str> = book.presets.keys().map(String::as_str).collect();
            anyhow::bail!("unknown preset {:?} (known: {})", name, known.join(", "));
        }
    }
    Ok(preset)
}

/// Active rules for a message: suggested categories merged with the
/// content-type defaults and the preset.
fn select_rules(
    book: &RuleBook,
    text: Option<&str>,
    files: &[FileRef],
    content_type: ContentType,
    preset: Option<&str>,
) -> (Vec<&'static str>, ActiveRules) {
    let suggested = rules::suggest_rule_categories(&SuggestContext {
        user_input: text,
        available_files: Some(files),
    });
    let active = book
        .get_active_rules(content_type, preset)
        .union(&book.merge_rule_sets(&suggested));
    (suggested, active)
}

/// Run the rules command.
pub fn run_rules(args: &RulesArgs, settings: &Settings, json: bool) -> anyhow::Result<i32> {
    let book = settings.rule_book();
    let preset = resolve_preset(&book, args.preset.as_deref(), settings)?;
    let files = file_refs(&args.files);

    let content_type = match args.content_type.as_deref() {
        Some(name) => match ContentType::parse(name) {
            Some(ct) => ct,
            None => {
                eprintln!(
                    "Error: invalid content type {:?}, must be conversation, code, data or general",
                    name
                );
                return Ok(EXIT_ERROR);
            }
        },
        None => {
            let ctx = ClassifyContext {
                file_type: None,
                available_files: Some(&files),
            };
            classify::classify(args.input.as_deref().unwrap_or_default(), Some(&ctx))
        }
    };

    let (suggested, active) = select_rules(&book, args.input.as_deref(), &files, content_type, preset);
    debug!(rules = active.len(), "rules selected");

    let report = RulesReport {
        content_type,
        preset: preset.map(str::to_string),
        suggested_categories: suggested.iter().map(|c| c.to_string()).collect(),
        rules: book
            .describe(&active)
            .into_iter()
            .map(|(id, description)| RuleEntry { id, description })
            .collect(),
    };

    if json {
        report::write_json(&report)?;
    } else {
        report::write_rules_pretty(&report);
    }
    Ok(EXIT_SUCCESS)
}

/// Template for a content type when none is requested.
fn default_template(content_type: ContentType) -> PromptTemplate {
    match content_type {
        ContentType::Code => PromptTemplate::CodeAnalysis,
        ContentType::Data => PromptTemplate::DataAnalysis,
        ContentType::Conversation | ContentType::General => PromptTemplate::General,
    }
}

/// Run the prompt command.
pub fn run_prompt(args: &PromptArgs, settings: &Settings, json: bool) -> anyhow::Result<i32> {
    let book = settings.rule_book();
    let preset = resolve_preset(&book, args.preset.as_deref(), settings)?;
    let text = prompt::sanitize_prompt(&read_input(&args.input)?);
    let files = file_refs(&args.files);

    let ctx = ClassifyContext {
        file_type: None,
        available_files: Some(&files),
    };
    let content_type = classify::classify(&text, Some(&ctx));

    let template = match args.template.as_deref() {
        Some(name) => match PromptTemplate::parse(name) {
            Some(t) => t,
            None => {
                eprintln!(
                    "Error: invalid template {:?}, must be general, code_analysis, code_explanation or data_analysis",
                    name
                );
                return Ok(EXIT_ERROR);
            }
        },
        None => default_template(content_type),
    };

    let history: Vec<Turn> = match &args.history {
        Some(path) => {
            let data = std::fs::read_to_string(path)?;
            serde_json::from_str(&data)?
        }
        None => Vec::new(),
    };

    let (_, active) = select_rules(&book, Some(&text), &files, content_type, preset);
    let request = PromptRequest {
        content: &text,
        template,
        available_files: &files,
        active_rules: Some(&active),
        history: &history,
    };
    let full = prompt::build_interaction_prompt(&book, &request);

    let max_len = args.max_length.unwrap_or(settings.max_prompt_length());
    let built = prompt::truncate_prompt(&full, max_len);
    let report = PromptReport {
        content_type,
        template,
        truncated: built != full,
        prompt: built,
    };

    if json {
        report::write_json(&report)?;
    } else {
        report::write_prompt_pretty(&report);
    }
    Ok(EXIT_SUCCESS)
}

/// Collect analyzable files under a directory, honoring excluded paths.
fn collect_files(root: &Path, settings: &Settings) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&&*name)
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if settings.is_path_excluded(relative) {
            debug!(path = %relative.display(), "excluded");
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if ANALYZED_EXTENSIONS.contains(&ext.as_str()) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Read a file if it is within the configured size limit and valid UTF-8.
fn read_source(path: &Path, settings: &Settings) -> anyhow::Result<Option<String>> {
    let size = std::fs::metadata(path)?.len();
    if size > settings.max_file_size() {
        warn!(path = %path.display(), size, "file exceeds max_file_size, skipped");
        return Ok(None);
    }
    match String::from_utf8(std::fs::read(path)?) {
        Ok(code) => Ok(Some(code)),
        Err(_) => {
            warn!(path = %path.display(), "file is not valid UTF-8, skipped");
            Ok(None)
        }
    }
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs, settings: &Settings, json: bool) -> anyhow::Result<i32> {
    let book = settings.rule_book();
    let preset = resolve_preset(&book, args.preset.as_deref(), settings)?;

    let mut active = book.get_active_rules(ContentType::Code, preset);
    for rule in &args.rules {
        active.enable(&book, rule, settings.max_active_rules())?;
    }

    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let analyzer = CodeAnalyzer::new(AnalysisOptions::from_settings(settings));
    let mut analyses = Vec::new();

    if metadata.is_dir() {
        if args.previous.is_some() {
            eprintln!("Error: --previous needs a single file, not a directory");
            return Ok(EXIT_ERROR);
        }
        let files = collect_files(&args.path, settings)?;
        if files.is_empty() {
            eprintln!("Warning: no files to analyze");
            return Ok(EXIT_SUCCESS);
        }
        for file in files {
            let identity = file
                .strip_prefix(&args.path)
                .unwrap_or(&file)
                .to_string_lossy()
                .to_string();
            if let Some(code) = read_source(&file, settings)? {
                let result = analyzer.analyze(&code, Some(&identity), &active);
                analyses.push(FileAnalysis { file: identity, result });
            }
        }
    } else {
        let identity = args
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| args.path.to_string_lossy().to_string());

        if let Some(previous) = &args.previous {
            if let Some(code) = read_source(previous, settings)? {
                analyzer.analyze(&code, Some(&identity), &active);
            }
        }
        if let Some(code) = read_source(&args.path, settings)? {
            let result = analyzer.analyze(&code, Some(&identity), &active);
            analyses.push(FileAnalysis { file: identity, result });
        }
    }

    let report = AnalyzeReport::new(&args.path.to_string_lossy(), analyses);
    if json {
        report::write_json(&report)?;
    } else {
        report::write_analyze_pretty(&report);
    }

    if args.strict && report.total_issues > 0 {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the diff command.
pub fn run_diff(args: &DiffArgs, json: bool) -> anyhow::Result<i32> {
    let old = std::fs::read_to_string(&args.old)?;
    let new = std::fs::read_to_string(&args.new)?;

    let lines = diff::ndiff(&old, &new);
    let counts = DiffCounts::from_diff(&lines);
    let report = DiffReport {
        lines_added: counts.added,
        lines_removed: counts.removed,
        lines_modified: counts.modified,
        summary: diff::summarize(&lines),
        diff: lines,
    };

    if json {
        report::write_json(&report)?;
    } else {
        report::write_diff_pretty(&report);
    }
    Ok(EXIT_SUCCESS)
}
