//! Shared typed models emitted by the scanner and consumed by report renderers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// 1. UrlSource
// ---------------------------------------------------------------------------

/// Which resolution strategy produced a fetch URL.
///
/// Variants are listed in cascade order; `Inferred` is shared by the
/// recency fallback and the domain-mention fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlSource {
    UserMessage,
    Thinking,
    TaskPrompt,
    Inferred,
    ResultContent,
    Unknown,
}

impl UrlSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlSource::UserMessage => "user_message",
            UrlSource::Thinking => "thinking",
            UrlSource::TaskPrompt => "task_prompt",
            UrlSource::Inferred => "inferred",
            UrlSource::ResultContent => "result_content",
            UrlSource::Unknown => "unknown",
        }
    }
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// 2. ErrorKind
// ---------------------------------------------------------------------------

/// Failure category of a fetch, serialized as its uppercase tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DnsNotFound,
    ConnectionTimedOut,
    ConnectionRefused,
    ConnectionReset,
    /// Status digits exactly as they appeared in the failure message.
    Http(String),
    SslExpired,
    SslMismatch,
    SslSelfSigned,
    SslChain,
    ContentTooLong,
    SocketHangup,
    Timeout,
    EmptyResponse,
    GenericError,
}

impl ErrorKind {
    /// Human-readable description used by report renderers.
    pub fn describe(&self) -> String {
        let text = match self {
            ErrorKind::DnsNotFound => "DNS lookup failed",
            ErrorKind::ConnectionTimedOut => "Connection timed out",
            ErrorKind::ConnectionRefused => "Connection refused",
            ErrorKind::ConnectionReset => "Connection reset",
            ErrorKind::Http(code) => {
                let reason = match code.as_str() {
                    "400" => "Bad Request",
                    "401" => "Unauthorized",
                    "403" => "Forbidden",
                    "404" => "Not Found",
                    "429" => "Rate Limited",
                    "500" => "Server Error",
                    "502" => "Bad Gateway",
                    "503" => "Service Unavailable",
                    _ => "Error",
                };
                return format!("HTTP {code} ({reason})");
            }
            ErrorKind::SslExpired => "SSL certificate expired",
            ErrorKind::SslMismatch => "SSL hostname mismatch",
            ErrorKind::SslSelfSigned => "Self-signed certificate",
            ErrorKind::SslChain => "SSL certificate chain error",
            ErrorKind::ContentTooLong => "Content exceeded size limit",
            ErrorKind::SocketHangup => "Connection dropped",
            ErrorKind::Timeout => "Request timed out",
            ErrorKind::EmptyResponse => "Empty response",
            ErrorKind::GenericError => "Request failed",
        };
        text.to_string()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ErrorKind::DnsNotFound => "ENOTFOUND",
            ErrorKind::ConnectionTimedOut => "ETIMEDOUT",
            ErrorKind::ConnectionRefused => "ECONNREFUSED",
            ErrorKind::ConnectionReset => "ECONNRESET",
            ErrorKind::Http(code) => return write!(f, "HTTP_{code}"),
            ErrorKind::SslExpired => "SSL_EXPIRED",
            ErrorKind::SslMismatch => "SSL_MISMATCH",
            ErrorKind::SslSelfSigned => "SSL_SELF_SIGNED",
            ErrorKind::SslChain => "SSL_CHAIN",
            ErrorKind::ContentTooLong => "CONTENT_TOO_LONG",
            ErrorKind::SocketHangup => "SOCKET_HANGUP",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::EmptyResponse => "EMPTY_RESPONSE",
            ErrorKind::GenericError => "GENERIC_ERROR",
        };
        f.write_str(tag)
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "ENOTFOUND" => ErrorKind::DnsNotFound,
            "ETIMEDOUT" => ErrorKind::ConnectionTimedOut,
            "ECONNREFUSED" => ErrorKind::ConnectionRefused,
            "ECONNRESET" => ErrorKind::ConnectionReset,
            "SSL_EXPIRED" => ErrorKind::SslExpired,
            "SSL_MISMATCH" => ErrorKind::SslMismatch,
            "SSL_SELF_SIGNED" => ErrorKind::SslSelfSigned,
            "SSL_CHAIN" => ErrorKind::SslChain,
            "CONTENT_TOO_LONG" => ErrorKind::ContentTooLong,
            "SOCKET_HANGUP" => ErrorKind::SocketHangup,
            "TIMEOUT" => ErrorKind::Timeout,
            "EMPTY_RESPONSE" => ErrorKind::EmptyResponse,
            "GENERIC_ERROR" => ErrorKind::GenericError,
            other => {
                let code = other
                    .strip_prefix("HTTP_")
                    .filter(|c| !c.is_empty() && c.bytes().all(|b| b.is_ascii_digit()))
                    .ok_or_else(|| format!("unknown error kind: {other}"))?;
                ErrorKind::Http(code.to_string())
            }
        };
        Ok(kind)
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ErrorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// 3. ProvenanceResult
// ---------------------------------------------------------------------------

/// Inferred origin of a fetch. `url` is `Some` exactly when `source` is not
/// `Unknown`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvenanceResult {
    pub url: Option<String>,
    pub source: UrlSource,
}

impl ProvenanceResult {
    pub fn found(url: String, source: UrlSource) -> Self {
        debug_assert!(source != UrlSource::Unknown);
        Self {
            url: Some(url),
            source,
        }
    }

    pub fn unknown() -> Self {
        Self {
            url: None,
            source: UrlSource::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// 4. OutcomeResult
// ---------------------------------------------------------------------------

/// Success/failure verdict for a fetch result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcomeResult {
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    pub error_evidence: Option<String>,
}

impl OutcomeResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error_kind: None,
            error_evidence: None,
        }
    }

    pub fn failed(kind: ErrorKind, evidence: Option<String>) -> Self {
        Self {
            success: false,
            error_kind: Some(kind),
            error_evidence: evidence,
        }
    }
}

// ---------------------------------------------------------------------------
// 5. FetchRecord
// ---------------------------------------------------------------------------

/// One fetch-tool invocation found in a transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRecord {
    pub url: Option<String>,
    pub url_source: UrlSource,
    pub success: bool,
    pub summary: Option<String>,
    pub error: Option<ErrorKind>,
    pub error_raw: Option<String>,
    pub line_number: usize,
    pub file: String,
}

impl FetchRecord {
    pub fn new(
        provenance: ProvenanceResult,
        outcome: OutcomeResult,
        summary: Option<String>,
        line_number: usize,
        file: &str,
    ) -> Self {
        let error_raw = if outcome.error_kind.is_some() {
            outcome.error_evidence
        } else {
            None
        };
        Self {
            url: provenance.url,
            url_source: provenance.source,
            success: outcome.success,
            summary: if outcome.success { summary } else { None },
            error: outcome.error_kind,
            error_raw,
            line_number,
            file: file.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// 6. FileScan
// ---------------------------------------------------------------------------

/// Records produced from a single transcript plus scan diagnostics.
#[derive(Clone, Debug, Default)]
pub struct FileScan {
    pub file: String,
    pub records: Vec<FetchRecord>,
    pub unterminated_blocks: usize,
}
