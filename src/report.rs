//! Output formatting for codechat results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, VersionChange};
use crate::classify::{ContentType, FormattedMessage, LanguageScores, LanguageTag};
use crate::prompt::PromptTemplate;

// =============================================================================
// Report structures
// =============================================================================

/// Result of the classify command.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyReport {
    pub content_type: ContentType,
    pub conversational_phrasing: bool,
    pub contains_code: bool,
    pub contains_structured_data: bool,
}

/// One language score.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub language: LanguageTag,
    pub score: usize,
}

/// Result of the guess command.
#[derive(Debug, Serialize, Deserialize)]
pub struct GuessReport {
    pub language: LanguageTag,
    pub scores: Vec<ScoreEntry>,
}

impl GuessReport {
    pub fn new(language: LanguageTag, scores: &LanguageScores) -> Self {
        Self {
            language,
            scores: scores
                .scores
                .iter()
                .map(|(language, score)| ScoreEntry {
                    language: *language,
                    score: *score,
                })
                .collect(),
        }
    }
}

/// An active rule with its description.
#[derive(Debug, Serialize, Deserialize)]
pub struct RuleEntry {
    pub id: String,
    pub description: String,
}

/// Result of the rules command.
#[derive(Debug, Serialize, Deserialize)]
pub struct RulesReport {
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub suggested_categories: Vec<String>,
    pub rules: Vec<RuleEntry>,
}

/// Result of the prompt command.
#[derive(Debug, Serialize, Deserialize)]
pub struct PromptReport {
    pub content_type: ContentType,
    pub template: PromptTemplate,
    pub truncated: bool,
    pub prompt: String,
}

/// Analysis of one file.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub file: String,
    pub result: AnalysisResult,
}

/// Result of the analyze command.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeReport {
    pub version: String,
    pub path: String,
    pub files_analyzed: usize,
    pub total_issues: usize,
    pub files: Vec<FileAnalysis>,
}

impl AnalyzeReport {
    pub fn new(path: &str, files: Vec<FileAnalysis>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.to_string(),
            files_analyzed: files.len(),
            total_issues: files.iter().map(|f| f.result.issues.len()).sum(),
            files,
        }
    }
}

/// Result of the diff command.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiffReport {
    pub lines_added: usize,
    pub lines_removed: usize,
    pub lines_modified: usize,
    pub diff: Vec<String>,
    pub summary: Vec<String>,
}

// =============================================================================
// JSON Format
// =============================================================================

/// Write any report as pretty-printed JSON on stdout.
pub fn write_json<T: Serialize>(report: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header(title: &str) {
    println!();
    print!("  ");
    print!("{}", "codechat".cyan().bold());
    print!(" v{}", env!("CARGO_PKG_VERSION"));
    println!("  {}", title.dimmed());
    println!();
}

pub fn write_classify_pretty(report: &ClassifyReport) {
    write_header("classify");
    print!("  {}", "Content type: ".dimmed());
    println!("{}", colored_content_type(report.content_type));
    print!("  {}", "Conversational phrasing: ".dimmed());
    println!("{}", yes_no(report.conversational_phrasing));
    print!("  {}", "Contains code: ".dimmed());
    println!("{}", yes_no(report.contains_code));
    print!("  {}", "Structured data: ".dimmed());
    println!("{}", yes_no(report.contains_structured_data));
    println!();
}

pub fn write_guess_pretty(report: &GuessReport) {
    write_header("guess");
    print!("  {}", "Language: ".dimmed());
    println!("{}", report.language.as_str().green().bold());
    println!();

    println!("  {}", "Scores:".bold());
    for entry in &report.scores {
        let line = format!("    {:<12} {:>3}", entry.language.as_str(), entry.score);
        if entry.language == report.language {
            println!("{}", line.green());
        } else {
            println!("{}", line);
        }
    }
    println!();
}

pub fn write_blocks_pretty(message: &FormattedMessage) {
    write_header("blocks");
    println!("  {} ({}):", "Code blocks".bold(), message.code_blocks.len());
    println!();

    for (i, block) in message.code_blocks.iter().enumerate() {
        println!("    {} {}", format!("[{}]", i + 1).dimmed(), block.language.blue());
        for line in block.code.lines() {
            println!("      {}", line);
        }
        println!();
    }

    println!("  {}", "Message:".bold());
    for line in message.content.lines() {
        println!("    {}", line);
    }
    println!();
}

pub fn write_rules_pretty(report: &RulesReport) {
    write_header("rules");
    print!("  {}", "Content type: ".dimmed());
    println!("{}", colored_content_type(report.content_type));
    if let Some(ref preset) = report.preset {
        print!("  {}", "Preset: ".dimmed());
        println!("{}", preset);
    }
    if !report.suggested_categories.is_empty() {
        print!("  {}", "Suggested categories: ".dimmed());
        println!("{}", report.suggested_categories.join(", "));
    }
    println!();

    println!("  {} ({}):", "Active rules".bold(), report.rules.len());
    for rule in &report.rules {
        println!("    {:<24} {}", rule.id.blue(), rule.description);
    }
    println!();
}

pub fn write_prompt_pretty(report: &PromptReport) {
    write_header("prompt");
    print!("  {}", "Content type: ".dimmed());
    println!("{}", colored_content_type(report.content_type));
    if report.truncated {
        println!("  {}", "(truncated to the configured length)".yellow());
    }
    println!();
    println!("{}", report.prompt);
    println!();
}

pub fn write_analyze_pretty(report: &AnalyzeReport) {
    write_header("analyze");
    print!("  {}", "Path: ".dimmed());
    println!("{}", report.path);
    print!("  {}", "Files: ".dimmed());
    println!("{}", report.files_analyzed);
    println!();

    for file in &report.files {
        write_file_analysis(file);
    }

    if report.total_issues == 0 {
        println!("  {}", "✓ No issues found".green());
    } else {
        let plural = if report.total_issues != 1 { "s" } else { "" };
        println!(
            "  {}",
            format!("✗ {} issue{}", report.total_issues, plural).red()
        );
    }
    println!();
}

fn write_file_analysis(file: &FileAnalysis) {
    let result = &file.result;
    println!("  {}", file.file.blue().bold());

    let stats = &result.stats;
    println!(
        "    {} {} total, {} code, {} comment, {} docstring, {} blank",
        "Lines:".dimmed(),
        stats.total_lines,
        stats.code_lines,
        stats.comment_lines,
        stats.docstring_lines,
        stats.empty_lines
    );

    let c = &result.complexity;
    print!("    {} ", "Complexity:".dimmed());
    write_colored_complexity(c.total_complexity);
    println!(
        "  (load {}, depth {}, branches {}, worst function {})",
        c.cognitive_load, c.nesting_depth, c.branches, c.max_method_complexity
    );

    if !result.functions.is_empty() {
        let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
        println!("    {} {}", "Functions:".dimmed(), names.join(", "));
    }
    if !result.classes.is_empty() {
        let names: Vec<&str> = result.classes.iter().map(|c| c.name.as_str()).collect();
        println!("    {} {}", "Classes:".dimmed(), names.join(", "));
    }
    if !result.dependencies.is_empty() {
        println!("    {} {}", "Dependencies:".dimmed(), result.dependencies.join(", "));
    }

    for issue in &result.issues {
        println!("    {} {}", "ISSUE".red(), issue);
    }
    for suggestion in &result.suggestions {
        println!("    {} {}", "HINT ".yellow(), suggestion);
    }

    if let Some(ref changes) = result.version_changes {
        write_version_changes(changes);
    }
    println!();
}

fn write_version_changes(changes: &VersionChange) {
    println!(
        "    {} +{} -{} ~{}  complexity {:+}",
        "Changes:".dimmed(),
        changes.lines_added,
        changes.lines_removed,
        changes.lines_modified,
        changes.complexity_delta
    );
    for breaking in &changes.breaking_changes {
        println!("    {} {}", "BREAK".red().bold(), breaking);
    }
    for significant in &changes.significant_changes {
        println!("    {} {}", "NOTE ".blue(), significant);
    }
    for summary in &changes.diff_summary {
        println!("      {}", summary.dimmed());
    }
}

pub fn write_diff_pretty(report: &DiffReport) {
    write_header("diff");
    for line in &report.diff {
        match line.get(..2) {
            Some("+ ") => println!("  {}", line.green()),
            Some("- ") => println!("  {}", line.red()),
            Some("? ") => println!("  {}", line.dimmed()),
            _ => println!("  {}", line),
        }
    }
    println!();

    println!(
        "  {} +{} -{} ~{}",
        "Summary:".bold(),
        report.lines_added,
        report.lines_removed,
        report.lines_modified
    );
    for summary in &report.summary {
        println!("    {}", summary);
    }
    println!();
}

fn write_colored_complexity(total: usize) {
    match total {
        t if t <= 10 => print!("{}", t.to_string().green().bold()),
        t if t <= 20 => print!("{}", t.to_string().green()),
        t if t <= 40 => print!("{}", t.to_string().yellow()),
        t => print!("{}", t.to_string().red()),
    }
}

fn colored_content_type(content_type: ContentType) -> ColoredString {
    match content_type {
        ContentType::Conversation => content_type.as_str().green(),
        ContentType::Code => content_type.as_str().blue(),
        ContentType::Data => content_type.as_str().magenta(),
        ContentType::General => content_type.as_str().normal(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
