//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use tracing::{info, warn};

use quizdoc_core::segment::Segmentation;
use quizdoc_core::{post_process, write_xml, Assembler, ConversionReport, Segmenter, Settings, Severity};
use quizdoc_ooxml::DocxSource;

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON files next to each XML output
    Json,
}

#[derive(Parser)]
#[command(name = "quizdoc")]
#[command(author, version, about = "Exam documents to question-bank XML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert DOCX files into question-bank XML
    Convert {
        /// Input DOCX files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Diagnostics format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write the serialized tree without restoring markup
        #[arg(long)]
        raw: bool,
    },

    /// Show how a DOCX file is segmented
    Inspect {
        /// Input DOCX file
        input: PathBuf,
    },
}

/// Run the CLI application
///
/// Parses arguments and dispatches to the matching command. A batch with
/// failed files exits with status 1 after the summary is printed.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            config,
            format,
            raw,
        } => {
            let summary = convert_command(&inputs, &output, config.as_deref(), format, raw)?;
            if summary.failed > 0 {
                std::process::exit(1);
            }
        }
        Commands::Inspect { input } => {
            inspect_command(&input)?;
        }
    }

    Ok(())
}

/// Outcome of a conversion batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files written
    pub converted: usize,
    /// Files that could not be converted
    pub failed: usize,
    /// Problems reported across converted files
    pub problems: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Converted {} file(s), {} failed, {} problem(s) reported",
            self.converted, self.failed, self.problems
        )
    }
}

/// Execute the convert command
pub fn convert_command(
    inputs: &[String],
    output_dir: &Path,
    config_path: Option<&Path>,
    format: OutputFormat,
    raw: bool,
) -> Result<BatchSummary> {
    println!("quizdoc v{}", quizdoc_core::VERSION);

    let settings = load_settings(config_path)?;
    let files = expand_inputs(inputs)?;
    if files.is_empty() {
        anyhow::bail!("No input files matched: {}", inputs.join(" "));
    }

    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let mut summary = BatchSummary::default();
    for file in &files {
        println!("Converting: {}", file.display());
        match convert_file(file, output_dir, &settings, format, raw) {
            Ok(report) => {
                summary.converted += 1;
                summary.problems += report.errors.len();
                if format == OutputFormat::Text {
                    for err in &report.errors {
                        println!("  {}", err);
                    }
                }
                println!("  {} question(s)", report.output.question_count());
            }
            Err(err) => {
                summary.failed += 1;
                warn!("{}: {:#}", file.display(), err);
                println!("  Failed: {:#}", err);
            }
        }
    }

    println!();
    println!("{}", summary);
    Ok(summary)
}

/// Convert one file into `<output_dir>/<stem>.xml`
///
/// With [`OutputFormat::Json`] the diagnostics land in
/// `<output_dir>/<stem>.errors.json`. A document that cannot be read is
/// an error and no XML is written for it.
pub fn convert_file(
    input: &Path,
    output_dir: &Path,
    settings: &Settings,
    format: OutputFormat,
    raw: bool,
) -> Result<ConversionReport> {
    let stem = input
        .file_stem()
        .with_context(|| format!("Input has no file name: {}", input.display()))?
        .to_string_lossy()
        .into_owned();

    let source = DocxSource::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))?;
    let report = Assembler::new(settings).convert_source(&source);

    if let Some(fatal) = report.errors.iter().find(|e| e.severity == Severity::Fatal) {
        anyhow::bail!("{}", fatal.message);
    }

    let xml = write_xml(&report.output, settings.output.pretty);
    let xml = if raw { xml } else { post_process(&xml) };
    let xml_path = output_dir.join(format!("{}.xml", stem));
    fs::write(&xml_path, xml)
        .with_context(|| format!("Failed to write XML file: {}", xml_path.display()))?;
    info!("Created {}", xml_path.display());

    if format == OutputFormat::Json {
        let json_path = output_dir.join(format!("{}.errors.json", stem));
        let json = serde_json::to_string_pretty(&report.errors)
            .context("Failed to serialize diagnostics to JSON")?;
        fs::write(&json_path, json)
            .with_context(|| format!("Failed to write diagnostics: {}", json_path.display()))?;
    }

    Ok(report)
}

/// Execute the inspect command
pub fn inspect_command(input: &Path) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let source = DocxSource::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))?;
    let blocks = source
        .to_blocks()
        .with_context(|| format!("Failed to read document: {}", input.display()))?;

    let segmentation = Segmenter::segment(&blocks);
    print!("{}", describe_segmentation(&segmentation));
    Ok(())
}

/// Human-readable outline of a segmentation
pub fn describe_segmentation(segmentation: &Segmentation<'_>) -> String {
    let mut output = String::new();

    if segmentation.has_materials() {
        for (index, material) in segmentation.materials.iter().enumerate() {
            let title = material
                .content
                .first()
                .map(|b| b.plain_text())
                .unwrap_or_default();
            output.push_str(&format!(
                "Material {}: {} ({} block(s))\n",
                index,
                excerpt(&title),
                material.content.len()
            ));
            describe_groups(&mut output, &material.groups, "  ");
        }
    } else {
        describe_groups(&mut output, &segmentation.groups, "");
    }

    for err in &segmentation.errors {
        output.push_str(&format!("{}\n", err));
    }
    output
}

fn describe_groups(output: &mut String, groups: &[quizdoc_core::segment::Group<'_>], indent: &str) {
    for group in groups {
        let meta = &group.meta;
        output.push_str(&format!(
            "{}Group {} [{}, {}, {}]: {} question(s)\n",
            indent,
            meta.tag,
            meta.subject,
            meta.post_type,
            meta.level_code,
            group.questions.len()
        ));
        for question in &group.questions {
            let first = question
                .blocks
                .first()
                .map(|b| b.plain_text())
                .unwrap_or_default();
            output.push_str(&format!(
                "{}  - {} ({} block(s))\n",
                indent,
                excerpt(&first),
                question.blocks.len()
            ));
        }
    }
}

fn excerpt(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() > 60 {
        format!("{}...", text.chars().take(60).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Expand input arguments into DOCX paths
///
/// Arguments with glob metacharacters are expanded and filtered to `.docx`
/// files; plain paths are taken as given.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if !input.contains(&['*', '?', '['][..]) {
            files.push(PathBuf::from(input));
            continue;
        }
        for entry in glob(input).with_context(|| format!("Invalid glob pattern: {}", input))? {
            match entry {
                Ok(path) if is_docx(&path) => files.push(path),
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Warning: Could not read {}", e);
                }
            }
        }
    }

    files.dedup();
    Ok(files)
}

fn is_docx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"))
}

/// Load settings from a config file or use defaults
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Settings::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => {
            // Try the working directory
            let candidates = ["quizdoc.toml", ".quizdoc.toml"];
            for candidate in candidates {
                if Path::new(candidate).exists() {
                    let content = fs::read_to_string(candidate)?;
                    if let Ok(settings) = Settings::from_toml_str(&content) {
                        return Ok(settings);
                    }
                }
            }
            Ok(Settings::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizdoc_ast::{Block, Paragraph};

    #[test]
    fn test_cli_parse_convert() {
        let args = vec!["quizdoc", "convert", "a.docx", "b/*.docx", "--output", "xml"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Convert {
                inputs,
                output,
                config,
                format,
                raw,
            } => {
                assert_eq!(inputs, vec!["a.docx", "b/*.docx"]);
                assert_eq!(output, PathBuf::from("xml"));
                assert!(config.is_none());
                assert_eq!(format, OutputFormat::Text);
                assert!(!raw);
            }
            _ => panic!("Expected Convert command"),
        }
    }

    #[test]
    fn test_cli_parse_convert_defaults_and_flags() {
        let args = vec!["quizdoc", "convert", "a.docx", "--format", "json", "--raw"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Convert {
                output, format, raw, ..
            } => {
                assert_eq!(output, PathBuf::from("output"));
                assert_eq!(format, OutputFormat::Json);
                assert!(raw);
            }
            _ => panic!("Expected Convert command"),
        }
    }

    #[test]
    fn test_cli_parse_convert_requires_input() {
        assert!(Cli::try_parse_from(vec!["quizdoc", "convert"]).is_err());
    }

    #[test]
    fn test_cli_parse_inspect() {
        let cli = Cli::try_parse_from(vec!["quizdoc", "inspect", "de.docx"]).unwrap();
        match cli.command {
            Commands::Inspect { input } => assert_eq!(input, PathBuf::from("de.docx")),
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_describe_segmentation_groups() {
        let blocks: Vec<Block> = ["[TOANTHPT_DS, TN, NB]", "Câu 1. Tính", "Lời giải", "1"]
            .iter()
            .map(|t| Block::Paragraph(Paragraph::from_text(*t)))
            .collect();
        let text = describe_segmentation(&Segmenter::segment(&blocks));
        assert!(text.starts_with("Group TOANTHPT_DS [TOANTHPT, TN, NB]: 1 question(s)\n"));
        assert!(text.contains("  - Câu 1. Tính (3 block(s))"));
    }

    #[test]
    fn test_describe_segmentation_materials() {
        let blocks: Vec<Block> = ["[NGUVAN_DH, TL, TH]", "HL: Đọc", "Câu 1. Hỏi"]
            .iter()
            .map(|t| Block::Paragraph(Paragraph::from_text(*t)))
            .collect();
        let text = describe_segmentation(&Segmenter::segment(&blocks));
        assert!(text.starts_with("Material 0: HL: Đọc (1 block(s))\n"));
        assert!(text.contains("  Group NGUVAN_DH"));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(80);
        assert_eq!(excerpt(&long).chars().count(), 63);
        assert_eq!(excerpt(" ngắn "), "ngắn");
    }

    #[test]
    fn test_is_docx() {
        assert!(is_docx(Path::new("de.DOCX")));
        assert!(!is_docx(Path::new("de.doc")));
        assert!(!is_docx(Path::new("de")));
    }

    #[test]
    fn test_summary_line() {
        let summary = BatchSummary {
            converted: 2,
            failed: 1,
            problems: 3,
        };
        assert_eq!(
            summary.to_string(),
            "Converted 2 file(s), 1 failed, 3 problem(s) reported"
        );
    }
}
