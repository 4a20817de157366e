//! Noise predicates for URL and domain candidates.
//!
//! A candidate is noise when it is URL- or domain-shaped but is not a real
//! fetch target: documentation links, loopback hosts, placeholder domains,
//! and file paths or property accesses lifted from code samples. Every
//! resolution strategy filters through the same [`NoiseFilter`].

use std::sync::LazyLock;

use crate::config::NoiseConfig;

// ---------------------------------------------------------------------------
// Default denylists
// ---------------------------------------------------------------------------

pub const NOISE_URL_SUBSTRINGS: &[&str] = &[
    "github.com/anthropics",
    "claude.com/docs",
    "json-schema.org",
    "localhost",
    "127.0.0.1",
    "example.com",
];

pub const NOISE_URL_SUFFIXES: &[&str] = &[
    ".md", ".js", ".ts", ".py", ".json", ".yaml", ".yml", ".sh", ".css", ".html", ".txt", ".xml",
    ".toml",
];

pub const NOISE_DOMAINS: &[&str] = &[
    "github.com",
    "claude.com",
    "anthropic.com",
    "example.com",
    "localhost",
    "schema.org",
];

pub const NOISE_DOMAIN_SUFFIXES: &[&str] = &[
    ".md", ".js", ".ts", ".jsx", ".tsx", ".py", ".json", ".yaml", ".yml", ".sh", ".css", ".html",
    ".txt", ".xml", ".toml", ".rb", ".go", ".rs", ".vue", ".svelte", ".astro", ".php", ".java",
    ".c", ".cpp", ".h",
];

pub const NOISE_TECHNICAL_TOKENS: &[&str] = &[
    "next.js",
    "react.js",
    "vue.js",
    "node.js",
    "express.js",
    "skill.md",
    "readme.md",
    "settings.json",
    "package.json",
    "location.href",
    "window.location",
    "document.location",
    "tweet.fields",
    "user.fields",
    "media.fields",
    "e.g.",
    "i.e.",
    "etc.",
];

pub const NOISE_PROPERTY_MARKERS: &[&str] = &[".href", ".fields"];

static DEFAULT_FILTER: LazyLock<NoiseFilter> =
    LazyLock::new(|| NoiseFilter::new(&NoiseConfig::default()));

/// `true` if `url` is noise under the default denylists.
pub fn is_noise_url(url: &str) -> bool {
    DEFAULT_FILTER.is_noise_url(url)
}

/// `true` if `domain` is noise under the default denylists.
pub fn is_noise_domain(domain: &str) -> bool {
    DEFAULT_FILTER.is_noise_domain(domain)
}

// ---------------------------------------------------------------------------
// NoiseFilter
// ---------------------------------------------------------------------------

/// Lowercased denylists with the two noise predicates over them.
#[derive(Clone, Debug)]
pub struct NoiseFilter {
    url_substrings: Vec<String>,
    url_suffixes: Vec<String>,
    domains: Vec<String>,
    domain_suffixes: Vec<String>,
    technical_tokens: Vec<String>,
    property_markers: Vec<String>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        DEFAULT_FILTER.clone()
    }
}

impl NoiseFilter {
    pub fn new(config: &NoiseConfig) -> Self {
        fn lowered(values: &[String]) -> Vec<String> {
            values.iter().map(|v| v.to_lowercase()).collect()
        }
        Self {
            url_substrings: lowered(&config.url_substrings),
            url_suffixes: lowered(&config.url_suffixes),
            domains: lowered(&config.domains),
            domain_suffixes: lowered(&config.domain_suffixes),
            technical_tokens: lowered(&config.technical_tokens),
            property_markers: lowered(&config.property_markers),
        }
    }

    pub fn is_noise_url(&self, url: &str) -> bool {
        let url_lower = url.to_lowercase();
        if self
            .url_substrings
            .iter()
            .any(|p| url_lower.contains(p.as_str()))
        {
            return true;
        }
        self.url_suffixes
            .iter()
            .any(|s| url_lower.ends_with(s.as_str()))
    }

    pub fn is_noise_domain(&self, domain: &str) -> bool {
        let domain_lower = domain.to_lowercase();

        // Exact and subdomain matches
        if self.domains.iter().any(|nd| {
            domain_lower == *nd
                || domain_lower
                    .strip_suffix(nd.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        }) {
            return true;
        }

        if self
            .domain_suffixes
            .iter()
            .any(|ext| domain_lower.ends_with(ext.as_str()))
        {
            return true;
        }

        if self.technical_tokens.contains(&domain_lower) {
            return true;
        }

        self.property_markers
            .iter()
            .any(|m| domain_lower.contains(m.as_str()))
    }

    /// `url` itself if it is not noise.
    pub fn accept_url(&self, url: &str) -> Option<String> {
        if url.is_empty() || self.is_noise_url(url) {
            None
        } else {
            Some(url.to_string())
        }
    }

    /// `https://<domain>` if neither the domain nor the synthesized URL is noise.
    pub fn accept_domain(&self, domain: &str) -> Option<String> {
        if domain.is_empty() || self.is_noise_domain(domain) {
            return None;
        }
        self.accept_url(&format!("https://{domain}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_url_denylist() {
        assert!(is_noise_url("https://github.com/anthropics/skills"));
        assert!(is_noise_url("http://localhost:3000/api"));
        assert!(is_noise_url("http://127.0.0.1:8080"));
        assert!(is_noise_url("https://WWW.EXAMPLE.COM/page"));
        assert!(is_noise_url("https://json-schema.org/draft/2020-12/schema"));
    }

    #[test]
    fn test_noise_url_file_suffix() {
        assert!(is_noise_url("https://cdn.site.dev/app.js"));
        assert!(is_noise_url("https://raw.site.dev/README.md"));
        assert!(is_noise_url("https://site.dev/config.TOML"));
    }

    #[test]
    fn test_real_urls_are_not_noise() {
        assert!(!is_noise_url("https://specstory.com"));
        assert!(!is_noise_url("https://github.com/rust-lang/rust"));
        assert!(!is_noise_url("https://example-target.dev"));
    }

    #[test]
    fn test_noise_domain_exact_and_subdomain() {
        assert!(is_noise_domain("github.com"));
        assert!(is_noise_domain("docs.anthropic.com"));
        assert!(!is_noise_domain("notgithub.com"));
        assert!(!is_noise_domain("acme.io"));
    }

    #[test]
    fn test_noise_domain_source_extensions() {
        assert!(is_noise_domain("main.rs"));
        assert!(is_noise_domain("server.go"));
        assert!(is_noise_domain("App.vue"));
        assert!(is_noise_domain("node.js"));
    }

    #[test]
    fn test_noise_domain_technical_tokens() {
        assert!(is_noise_domain("window.location"));
        assert!(is_noise_domain("e.g."));
        assert!(is_noise_domain("tweet.fields"));
    }

    #[test]
    fn test_noise_domain_property_access() {
        assert!(is_noise_domain("document.location.href"));
        assert!(is_noise_domain("place.fields.name"));
    }

    #[test]
    fn test_accept_domain_checks_both_predicates() {
        let filter = NoiseFilter::default();
        assert_eq!(
            filter.accept_domain("missing-host.test"),
            Some("https://missing-host.test".to_string())
        );
        assert_eq!(filter.accept_domain("sub.example.com"), None);
        assert_eq!(filter.accept_domain("docs.github.com"), None);
    }

    #[test]
    fn test_custom_denylist() {
        let mut config = NoiseConfig::default();
        config.domains.push("Internal.Corp".to_string());
        config.url_substrings.push("intranet".to_string());
        let filter = NoiseFilter::new(&config);
        assert!(filter.is_noise_domain("wiki.internal.corp"));
        assert!(filter.is_noise_url("https://intranet.acme.io/page"));
        assert!(!is_noise_domain("wiki.internal.corp"));
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = NoiseFilter::new(&NoiseConfig::empty());
        assert!(!filter.is_noise_url("http://localhost"));
        assert!(!filter.is_noise_domain("github.com"));
    }
}
