//! Transcript parsing orchestration with Rayon-based parallelism.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::errors::LinkTrailResult;
use crate::models::{FetchRecord, FileScan};
use crate::resolve::outcome::OutcomeClassifier;
use crate::resolve::provenance::ProvenanceResolver;
use crate::scanner::blocks::{tool_start_regex, BlockScanner};

/// Read a transcript as UTF-8, replacing undecodable bytes.
pub fn read_transcript(path: &Path) -> LinkTrailResult<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Scanner, resolver and classifier configured once and shared by every file.
pub struct TranscriptParser {
    start_re: Regex,
    lookback: usize,
    resolver: ProvenanceResolver,
    classifier: OutcomeClassifier,
}

impl TranscriptParser {
    pub fn new(config: &ScanConfig) -> LinkTrailResult<Self> {
        config.validate()?;
        Ok(Self {
            start_re: tool_start_regex(&config.fetch_tool)?,
            lookback: config.lookback_lines,
            resolver: ProvenanceResolver::new(config)?,
            classifier: OutcomeClassifier::new(config),
        })
    }

    /// Produce one record per closed fetch block in `text`.
    pub fn parse_transcript(&self, text: &str, file: &str) -> FileScan {
        let lines: Vec<&str> = text.lines().collect();
        let mut scanner = BlockScanner::from_regex(&lines, self.start_re.clone(), self.lookback);
        let mut records = Vec::new();

        for scanned in scanner.by_ref() {
            let content = scanned.block.content.as_str();
            let provenance = self.resolver.resolve(scanned.context, content);
            let outcome = self.classifier.classify(content);
            let summary = if outcome.success && !content.is_empty() {
                Some(self.classifier.summarize(content))
            } else {
                None
            };
            match &outcome.error_kind {
                Some(kind) => debug!(
                    file,
                    line = scanned.block.start_line,
                    source = %provenance.source,
                    error = %kind,
                    "fetch failed: {}",
                    kind.describe()
                ),
                None => debug!(
                    file,
                    line = scanned.block.start_line,
                    source = %provenance.source,
                    "fetch succeeded"
                ),
            }
            records.push(FetchRecord::new(
                provenance,
                outcome,
                summary,
                scanned.block.start_line,
                file,
            ));
        }

        let unterminated_blocks = scanner.unterminated_blocks();
        if unterminated_blocks > 0 {
            warn!("{file}: skipped {unterminated_blocks} unterminated fetch block(s)");
        }

        FileScan {
            file: file.to_string(),
            records,
            unterminated_blocks,
        }
    }

    pub fn parse_file(&self, path: &Path) -> LinkTrailResult<FileScan> {
        let text = read_transcript(path)?;
        let scan = self.parse_transcript(&text, &path.display().to_string());
        info!("{}: {} fetch block(s)", scan.file, scan.records.len());
        Ok(scan)
    }

    fn parse_or_skip(&self, path: &Path) -> Option<FileScan> {
        match self.parse_file(path) {
            Ok(scan) => Some(scan),
            Err(e) => {
                warn!("Could not read {}: {e}", path.display());
                None
            }
        }
    }

    /// Parse every file, skipping unreadable ones, and return records in
    /// file-name order.
    pub fn parse_files(&self, files: &[PathBuf], workers: Option<usize>) -> Vec<FetchRecord> {
        if files.is_empty() {
            return vec![];
        }

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(workers) = workers {
            builder = builder.num_threads(workers.max(1));
        }

        let scans: Vec<Option<FileScan>> = match builder.build() {
            Ok(pool) => pool.install(|| files.par_iter().map(|p| self.parse_or_skip(p)).collect()),
            Err(e) => {
                // Fallback to sequential
                warn!("Thread pool unavailable ({e}); parsing sequentially");
                files.iter().map(|p| self.parse_or_skip(p)).collect()
            }
        };

        aggregate(scans.into_iter().flatten())
    }
}

fn file_name_key(record: &FetchRecord) -> (String, &str) {
    let name = Path::new(&record.file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (name, record.file.as_str())
}

/// Stable sort by file name (full path breaks ties); block order within a
/// file is preserved.
pub fn sort_records(records: &mut [FetchRecord]) {
    records.sort_by(|a, b| file_name_key(a).cmp(&file_name_key(b)));
}

/// Flatten per-file scans into one deterministically ordered sequence.
pub fn aggregate(scans: impl IntoIterator<Item = FileScan>) -> Vec<FetchRecord> {
    let mut records: Vec<FetchRecord> = scans.into_iter().flat_map(|s| s.records).collect();
    sort_records(&mut records);
    records
}
