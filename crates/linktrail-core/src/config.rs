//! Scan configuration: window sizes, caps, tool names and noise denylists.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{LinkTrailError, LinkTrailResult};
use crate::scanner::noise::{
    NOISE_DOMAINS, NOISE_DOMAIN_SUFFIXES, NOISE_PROPERTY_MARKERS, NOISE_TECHNICAL_TOKENS,
    NOISE_URL_SUBSTRINGS, NOISE_URL_SUFFIXES,
};

// Defaults
pub const DEFAULT_FETCH_TOOL: &str = "WebFetch";
pub const DEFAULT_TASK_TOOL: &str = "Task";
pub const DEFAULT_LOOKBACK_LINES: usize = 50;
pub const DEFAULT_RECENT_URL_LINES: usize = 20;
pub const DEFAULT_DOMAIN_MENTION_LINES: usize = 30;
pub const DEFAULT_RESULT_URL_CHARS: usize = 1000;
pub const DEFAULT_RESULT_DOMAIN_CHARS: usize = 500;
pub const DEFAULT_SHORT_CONTENT_CHARS: usize = 50;
pub const DEFAULT_EVIDENCE_CHARS: usize = 200;
pub const DEFAULT_SUMMARY_CHARS: usize = 200;

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Denylists consulted by the noise filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Substrings that mark a whole URL as noise.
    pub url_substrings: Vec<String>,
    /// Path suffixes that mark a URL-shaped token as a file reference.
    pub url_suffixes: Vec<String>,
    /// Hosts rejected together with all of their subdomains.
    pub domains: Vec<String>,
    /// Source-file extensions that masquerade as TLDs.
    pub domain_suffixes: Vec<String>,
    /// Exact tokens that look like domains but are code or prose.
    pub technical_tokens: Vec<String>,
    /// Property-access fragments that mark a token as code.
    pub property_markers: Vec<String>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            url_substrings: owned(NOISE_URL_SUBSTRINGS),
            url_suffixes: owned(NOISE_URL_SUFFIXES),
            domains: owned(NOISE_DOMAINS),
            domain_suffixes: owned(NOISE_DOMAIN_SUFFIXES),
            technical_tokens: owned(NOISE_TECHNICAL_TOKENS),
            property_markers: owned(NOISE_PROPERTY_MARKERS),
        }
    }
}

impl NoiseConfig {
    /// Append every entry of `other` that is not already present.
    pub fn extend(&mut self, other: &NoiseConfig) {
        fn merge(into: &mut Vec<String>, from: &[String]) {
            for value in from {
                let lowered = value.to_lowercase();
                if !into.contains(&lowered) {
                    into.push(lowered);
                }
            }
        }
        merge(&mut self.url_substrings, &other.url_substrings);
        merge(&mut self.url_suffixes, &other.url_suffixes);
        merge(&mut self.domains, &other.domains);
        merge(&mut self.domain_suffixes, &other.domain_suffixes);
        merge(&mut self.technical_tokens, &other.technical_tokens);
        merge(&mut self.property_markers, &other.property_markers);
    }

    /// A config with every list empty; useful as a base for `extend`.
    pub fn empty() -> Self {
        Self {
            url_substrings: Vec::new(),
            url_suffixes: Vec::new(),
            domains: Vec::new(),
            domain_suffixes: Vec::new(),
            technical_tokens: Vec::new(),
            property_markers: Vec::new(),
        }
    }
}

/// Configuration for a transcript scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Tool name carried by fetch blocks.
    pub fetch_tool: String,
    /// Tool name carried by sub-agent spawn blocks.
    pub task_tool: String,
    /// Lines before a block searched for attribution clues.
    pub lookback_lines: usize,
    /// Trailing context lines searched by the recency fallback.
    pub recent_url_lines: usize,
    /// Trailing context lines searched by the domain-mention fallback.
    pub domain_mention_lines: usize,
    /// Result prefix (chars) searched for URL literals.
    pub result_url_chars: usize,
    /// Result prefix (chars) searched for bare domains.
    pub result_domain_chars: usize,
    /// Results shorter than this get the short-response checks.
    pub short_content_chars: usize,
    pub evidence_chars: usize,
    pub summary_chars: usize,
    pub noise: NoiseConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fetch_tool: DEFAULT_FETCH_TOOL.to_string(),
            task_tool: DEFAULT_TASK_TOOL.to_string(),
            lookback_lines: DEFAULT_LOOKBACK_LINES,
            recent_url_lines: DEFAULT_RECENT_URL_LINES,
            domain_mention_lines: DEFAULT_DOMAIN_MENTION_LINES,
            result_url_chars: DEFAULT_RESULT_URL_CHARS,
            result_domain_chars: DEFAULT_RESULT_DOMAIN_CHARS,
            short_content_chars: DEFAULT_SHORT_CONTENT_CHARS,
            evidence_chars: DEFAULT_EVIDENCE_CHARS,
            summary_chars: DEFAULT_SUMMARY_CHARS,
            noise: NoiseConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Validate the configuration
    pub fn validate(&self) -> LinkTrailResult<()> {
        if self.fetch_tool.trim().is_empty() {
            return Err(LinkTrailError::Config("fetch_tool must not be empty".to_string()));
        }
        if self.task_tool.trim().is_empty() {
            return Err(LinkTrailError::Config("task_tool must not be empty".to_string()));
        }
        let sizes = [
            ("lookback_lines", self.lookback_lines),
            ("recent_url_lines", self.recent_url_lines),
            ("domain_mention_lines", self.domain_mention_lines),
            ("result_url_chars", self.result_url_chars),
            ("result_domain_chars", self.result_domain_chars),
            ("short_content_chars", self.short_content_chars),
            ("evidence_chars", self.evidence_chars),
            ("summary_chars", self.summary_chars),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(LinkTrailError::Config(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> LinkTrailResult<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| LinkTrailError::Config(format!("Failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> LinkTrailResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| LinkTrailError::Config(format!("Failed to serialize to TOML: {e}")))
    }

    pub fn load(path: &Path) -> LinkTrailResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_lookback_rejected() {
        let config = ScanConfig {
            lookback_lines: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(config.validate(), Err(LinkTrailError::Config(_))));
    }

    #[test]
    fn test_empty_tool_rejected() {
        let config = ScanConfig {
            fetch_tool: "  ".to_string(),
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ScanConfig::from_toml("lookback_lines = 80\n").unwrap();
        assert_eq!(config.lookback_lines, 80);
        assert_eq!(config.fetch_tool, DEFAULT_FETCH_TOOL);
        assert_eq!(config.noise, NoiseConfig::default());
    }

    #[test]
    fn test_toml_noise_override() {
        let toml_str = "[noise]\ndomains = [\"internal.corp\"]\n";
        let config = ScanConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.noise.domains, vec!["internal.corp".to_string()]);
        // Unspecified lists keep their defaults.
        assert_eq!(config.noise.url_suffixes, NoiseConfig::default().url_suffixes);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ScanConfig::from_toml("lookback_lines = \"many\"").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ScanConfig::default();
        let parsed = ScanConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_noise_extend_dedups() {
        let mut base = NoiseConfig::default();
        let before = base.domains.len();
        let mut extra = NoiseConfig::empty();
        extra.domains = vec!["GitHub.com".to_string(), "docs.rs".to_string()];
        base.extend(&extra);
        assert_eq!(base.domains.len(), before + 1);
        assert!(base.domains.contains(&"docs.rs".to_string()));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("link-trail.toml");
        std::fs::write(&path, "fetch_tool = \"Fetch\"\n").unwrap();
        let config = ScanConfig::load(&path).unwrap();
        assert_eq!(config.fetch_tool, "Fetch");
    }
}
