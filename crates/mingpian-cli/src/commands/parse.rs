//! Parse command - extract a contact from one file of recognized fragments.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use serde::Deserialize;
use tracing::{debug, info};

use mingpian_core::{CardParser, ContactRecord, MingpianConfig, RecognitionResult, TextFragment};

use super::config::load_config;
use super::rules::load_rule_set;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Fragment file (JSON array of fragments or strings, or a recognition result)
    #[arg(required = true)]
    input: PathBuf,

    /// Card image to attach to the record
    #[arg(long)]
    image: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// List the fields that could not be extracted
    #[arg(long)]
    show_missing: bool,

    /// Ignore persisted custom correction rules
    #[arg(long)]
    no_custom_rules: bool,

    /// Order fragments by bounding box instead of sequence position
    #[arg(long)]
    reading_order: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Accepted layouts of a fragment file.
#[derive(Deserialize)]
#[serde(untagged)]
enum FragmentFile {
    Fragments(Vec<TextFragment>),
    Texts(Vec<String>),
    Recognition(RecognitionResult),
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Parsing file: {}", args.input.display());

    let mut recognition = load_fragments(&args.input)?;
    if args.reading_order {
        recognition.sort_by_reading_order();
    }

    let image = match &args.image {
        Some(path) => Some(fs::read(path)?),
        None => None,
    };

    let parser = build_parser(&config, args.no_custom_rules)?;
    let result = parser.parse(&recognition.fragments, image);

    debug!("Parsed in {}ms", result.processing_time_ms);

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    if args.show_missing {
        let missing = result.record.missing_fields();
        if missing.is_empty() {
            eprintln!("{} All fields extracted", style("✓").green());
        } else {
            eprintln!("{} Missing: {}", style("ℹ").blue(), missing.join(", "));
        }
    }

    let output = format_record(&result.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Read a fragment file in any of the accepted layouts.
pub fn load_fragments(path: &Path) -> anyhow::Result<RecognitionResult> {
    let content = fs::read_to_string(path)?;
    let file: FragmentFile = serde_json::from_str(&content).map_err(|e| {
        anyhow::anyhow!("Unrecognized fragment file {}: {}", path.display(), e)
    })?;

    let recognition = match file {
        FragmentFile::Fragments(fragments) => RecognitionResult::new(fragments),
        FragmentFile::Texts(texts) => RecognitionResult::new(TextFragment::from_texts(&texts)),
        FragmentFile::Recognition(result) => result,
    };

    debug!("Loaded {} fragments", recognition.fragments.len());
    Ok(recognition)
}

pub fn build_parser(config: &MingpianConfig, builtin_only: bool) -> anyhow::Result<CardParser> {
    let rules = load_rule_set(config, builtin_only)?;
    Ok(CardParser::new()
        .with_rules(rules)
        .with_config(config.parser.clone()))
}

pub fn format_record(record: &ContactRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_record_csv(record),
        OutputFormat::Text => Ok(format_record_text(record)),
    }
}

pub const CSV_COLUMNS: [&str; 16] = [
    "name",
    "english_name",
    "chinese_name",
    "company",
    "position",
    "phone",
    "work_phone",
    "fax_phone",
    "email",
    "secondary_email",
    "website",
    "address",
    "english_address",
    "company_id",
    "social_media",
    "created_at",
];

pub fn csv_row(record: &ContactRecord) -> Vec<String> {
    let social = record
        .social_media
        .iter()
        .map(|(platform, handle)| format!("{platform}:{handle}"))
        .collect::<Vec<_>>()
        .join(";");

    vec![
        record.name.full().to_string(),
        record.name.latin().to_string(),
        record.name.cjk().to_string(),
        record.company.clone(),
        record.position.full().to_string(),
        record.phone.clone(),
        record.work_phone.clone(),
        record.fax_phone.clone(),
        record.email.clone(),
        record.secondary_email.clone(),
        record.website.clone(),
        record.address.clone(),
        record.english_address.clone(),
        record.company_id.clone(),
        social,
        record.created_at.to_rfc3339(),
    ]
}

fn format_record_csv(record: &ContactRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_COLUMNS)?;
    wtr.write_record(csv_row(record))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_record_text(record: &ContactRecord) -> String {
    let mut output = String::new();

    let lines = [
        ("Name", record.name.full()),
        ("Company", record.company.as_str()),
        ("Position", record.position.full()),
        ("Phone", record.phone.as_str()),
        ("Work", record.work_phone.as_str()),
        ("Fax", record.fax_phone.as_str()),
        ("Email", record.email.as_str()),
        ("Email 2", record.secondary_email.as_str()),
        ("Website", record.website.as_str()),
        ("Address", record.address.as_str()),
        ("Address (EN)", record.english_address.as_str()),
        ("Company ID", record.company_id.as_str()),
    ];

    for (label, value) in lines {
        if !value.is_empty() {
            output.push_str(&format!("{label}: {value}\n"));
        }
    }

    for (platform, handle) in &record.social_media {
        output.push_str(&format!("{platform}: {handle}\n"));
    }

    if output.is_empty() {
        output.push_str("No contact details found\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_every_layout() {
        let dir = tempfile::tempdir().unwrap();

        let fragments = dir.path().join("fragments.json");
        fs::write(
            &fragments,
            r#"[{"text": "王小明", "confidence": 0.9, "sequence_position": 0}]"#,
        )
        .unwrap();
        assert_eq!(load_fragments(&fragments).unwrap().texts(), vec!["王小明"]);

        let texts = dir.path().join("texts.json");
        fs::write(&texts, r#"["王小明", "0933 231 545"]"#).unwrap();
        assert_eq!(load_fragments(&texts).unwrap().fragments.len(), 2);

        let result = dir.path().join("result.json");
        fs::write(
            &result,
            r#"{"fragments": [{"text": "王小明"}], "processing_time_ms": 12}"#,
        )
        .unwrap();
        let loaded = load_fragments(&result).unwrap();
        assert_eq!(loaded.processing_time_ms, 12);
        assert_eq!(loaded.texts(), vec!["王小明"]);
    }

    #[test]
    fn test_rejects_unknown_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "42").unwrap();
        assert!(load_fragments(&path).is_err());
    }

    #[test]
    fn test_csv_has_header_and_row() {
        let mut record = ContactRecord::new();
        record.set_name("Heidie Lin 李亞畇");
        record.company_id = "52621439".to_string();

        let csv = format_record(&record, OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("name,english_name,chinese_name"));
        assert!(lines.next().unwrap().starts_with("Heidie Lin 李亞畇,Heidie Lin,李亞畇"));
    }

    #[test]
    fn test_text_skips_empty_fields() {
        let mut record = ContactRecord::new();
        record.email = "a@b.com".to_string();

        let text = format_record(&record, OutputFormat::Text).unwrap();
        assert_eq!(text, "Email: a@b.com\n");

        let empty = format_record(&ContactRecord::new(), OutputFormat::Text).unwrap();
        assert_eq!(empty, "No contact details found\n");
    }
}
