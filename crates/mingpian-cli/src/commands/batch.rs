//! Batch command - parse many fragment files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use mingpian_core::{CardParser, ContactRecord};

use super::config::load_config;
use super::parse::{build_parser, format_record, load_fragments, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching fragment files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Ignore persisted custom correction rules
    #[arg(long)]
    no_custom_rules: bool,
}

/// Result of parsing a single file.
struct FileResult {
    path: PathBuf,
    record: Option<ContactRecord>,
    warnings: usize,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(build_parser(&config, args.no_custom_rules)?);
    let results =
        match parse_files(files, parser, args.jobs, args.continue_on_error, &overall_pb).await {
            Ok(results) => results,
            Err(e) => {
                overall_pb.abandon();
                return Err(e);
            }
        };

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(record) = &result.record {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("card");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_record(record, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.record.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Parse `files` on blocking tasks, at most `jobs` at a time.
///
/// Without `continue_on_error` no new file is started after the first
/// failure and the failure is returned. Results keep the order of `files`.
async fn parse_files(
    files: Vec<PathBuf>,
    parser: Arc<CardParser>,
    jobs: usize,
    continue_on_error: bool,
    pb: &ProgressBar,
) -> anyhow::Result<Vec<FileResult>> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    // Set by the first failure unless errors are tolerated.
    let stop = Arc::new(AtomicBool::new(false));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        if stop.load(Ordering::SeqCst) {
            break;
        }

        let parser = Arc::clone(&parser);
        let stop = Arc::clone(&stop);
        let pb = pb.clone();

        tasks.spawn_blocking(move || {
            let _permit = permit;
            if stop.load(Ordering::SeqCst) {
                return None;
            }

            let result = parse_single_file(path, &parser);
            if result.error.is_some() && !continue_on_error {
                stop.store(true, Ordering::SeqCst);
            }
            pb.inc(1);
            Some((index, result))
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let Some((index, result)) = joined? else {
            continue;
        };

        if let Some(message) = &result.error {
            if continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), message);
            } else {
                error!("Failed to process {}: {}", result.path.display(), message);
                tasks.abort_all();
                anyhow::bail!("Processing failed: {}", message);
            }
        }

        results.push((index, result));
    }

    results.sort_by_key(|(index, _)| *index);
    Ok(results.into_iter().map(|(_, r)| r).collect())
}

fn parse_single_file(path: PathBuf, parser: &CardParser) -> FileResult {
    let file_start = Instant::now();

    let outcome = load_fragments(&path).and_then(|recognition| {
        if !recognition.has_text() {
            anyhow::bail!("No text fragments in file");
        }
        Ok(parser.parse(&recognition.fragments, None))
    });

    let processing_time_ms = file_start.elapsed().as_millis() as u64;

    match outcome {
        Ok(parsed) => FileResult {
            path,
            warnings: parsed.warnings.len(),
            record: Some(parsed.record),
            error: None,
            processing_time_ms,
        },
        Err(e) => FileResult {
            path,
            record: None,
            warnings: 0,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "name",
        "company",
        "phone",
        "email",
        "company_id",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time = result.processing_time_ms.to_string();

        if let Some(record) = &result.record {
            wtr.write_record([
                filename,
                "success",
                record.name.full(),
                &record.company,
                &record.phone,
                &record.email,
                &record.company_id,
                &result.warnings.to_string(),
                &time,
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                &time,
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_cards(dir: &Path) -> Vec<PathBuf> {
        let broken = dir.join("a.json");
        let good = dir.join("b.json");
        let other = dir.join("c.json");
        fs::write(&broken, "{ not json").unwrap();
        fs::write(&good, r#"["王小明", "0933 231 545"]"#).unwrap();
        fs::write(&other, r#"["heidie@test.com"]"#).unwrap();
        vec![broken, good, other]
    }

    #[tokio::test]
    async fn test_first_failure_stops_remaining_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_cards(dir.path());
        let pb = ProgressBar::hidden();

        let result = parse_files(files, Arc::new(CardParser::new()), 1, false, &pb).await;

        assert!(result.is_err());
        assert_eq!(pb.position(), 1);
    }

    #[tokio::test]
    async fn test_continue_on_error_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_cards(dir.path());
        let pb = ProgressBar::hidden();

        let results = parse_files(files, Arc::new(CardParser::new()), 2, true, &pb)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].error.is_some());
        assert_eq!(results[1].record.as_ref().unwrap().name.full(), "王小明");
        assert_eq!(results[2].record.as_ref().unwrap().email, "heidie@test.com");
        assert_eq!(pb.position(), 3);
    }
}
