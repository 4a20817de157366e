//! Success/failure classification and summaries for fetch results.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{ScanConfig, DEFAULT_EVIDENCE_CHARS, DEFAULT_SHORT_CONTENT_CHARS, DEFAULT_SUMMARY_CHARS};
use crate::models::{ErrorKind, OutcomeResult};
use crate::scanner::patterns::char_prefix;

enum Signature {
    Fixed(ErrorKind),
    /// Captures the status digits in group 1.
    HttpStatus,
}

// ---------------------------------------------------------------------------
// Compiled regex patterns (LazyLock for one-time init)
// ---------------------------------------------------------------------------

/// Failure signatures in priority order; the first match wins.
static FAILURE_SIGNATURES: LazyLock<Vec<(Regex, Signature)>> = LazyLock::new(|| {
    let fixed = |pattern: &str, kind| (Regex::new(pattern).unwrap(), Signature::Fixed(kind));
    vec![
        fixed(r"(?i)getaddrinfo ENOTFOUND", ErrorKind::DnsNotFound),
        fixed(r"(?i)ETIMEDOUT", ErrorKind::ConnectionTimedOut),
        fixed(r"(?i)ECONNREFUSED", ErrorKind::ConnectionRefused),
        fixed(r"(?i)ECONNRESET", ErrorKind::ConnectionReset),
        (
            Regex::new(r"Request failed with status code ([0-9]+)").unwrap(),
            Signature::HttpStatus,
        ),
        fixed(r"(?i)certificate has expired", ErrorKind::SslExpired),
        fixed(r"(?i)Hostname/IP does not match certificate", ErrorKind::SslMismatch),
        fixed(r"(?i)self[- ]signed certificate", ErrorKind::SslSelfSigned),
        fixed(r"(?i)unable to verify the first certificate", ErrorKind::SslChain),
        fixed(r"(?i)Prompt is too long", ErrorKind::ContentTooLong),
        fixed(r"(?i)socket hang up", ErrorKind::SocketHangup),
        fixed(r"(?i)timeout", ErrorKind::Timeout),
    ]
});

/// Section headings whose first following line describes the page.
static OVERVIEW_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["What They Do", "Overview", "Company Overview", "Business Description"]
        .iter()
        .map(|heading| Regex::new(&format!(r"(?i)##\s*{heading}\s*\n+(.+)")).unwrap())
        .collect()
});

const REDIRECT_WORDS: &[&str] = &["redirect", "moved"];
const FAILURE_WORDS: &[&str] = &["error", "failed", "denied", "forbidden"];

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct OutcomeClassifier {
    short_content_chars: usize,
    evidence_chars: usize,
    summary_chars: usize,
}

impl Default for OutcomeClassifier {
    fn default() -> Self {
        Self {
            short_content_chars: DEFAULT_SHORT_CONTENT_CHARS,
            evidence_chars: DEFAULT_EVIDENCE_CHARS,
            summary_chars: DEFAULT_SUMMARY_CHARS,
        }
    }
}

impl OutcomeClassifier {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            short_content_chars: config.short_content_chars,
            evidence_chars: config.evidence_chars,
            summary_chars: config.summary_chars,
        }
    }

    fn evidence(&self, content: &str) -> String {
        char_prefix(content, self.evidence_chars).trim().to_string()
    }

    pub fn classify(&self, content: &str) -> OutcomeResult {
        if content.is_empty() {
            return OutcomeResult::failed(ErrorKind::EmptyResponse, None);
        }

        for (pattern, signature) in FAILURE_SIGNATURES.iter() {
            let Some(caps) = pattern.captures(content) else {
                continue;
            };
            let kind = match signature {
                Signature::Fixed(kind) => kind.clone(),
                Signature::HttpStatus => caps
                    .get(1)
                    .map(|m| ErrorKind::Http(m.as_str().to_string()))
                    .unwrap_or(ErrorKind::GenericError),
            };
            return OutcomeResult::failed(kind, Some(self.evidence(content)));
        }

        // Very short responses are often errors, but redirects are short too.
        if content.chars().count() < self.short_content_chars {
            let lowered = content.to_lowercase();
            if REDIRECT_WORDS.iter().any(|w| lowered.contains(w)) {
                return OutcomeResult::ok();
            }
            if FAILURE_WORDS.iter().any(|w| lowered.contains(w)) {
                return OutcomeResult::failed(ErrorKind::GenericError, Some(self.evidence(content)));
            }
        }

        OutcomeResult::ok()
    }

    /// Short description of a successful fetch result.
    pub fn summarize(&self, content: &str) -> String {
        let cap = |text: &str| char_prefix(text, self.summary_chars).to_string();
        let lines: Vec<&str> = content.trim().split('\n').collect();

        for line in lines.iter().take(5) {
            let line = line.trim();
            if line.starts_with('#') {
                let title = line.trim_start_matches('#').trim();
                if !title.is_empty() {
                    return cap(title);
                }
            }
        }

        for pattern in OVERVIEW_RES.iter() {
            if let Some(caps) = pattern.captures(content) {
                return cap(caps[1].trim());
            }
        }

        for line in &lines {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with('#') && !line.starts_with('-') {
                return cap(line);
            }
        }

        cap(content)
    }
}
