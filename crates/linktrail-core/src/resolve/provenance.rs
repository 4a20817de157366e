//! URL provenance for fetch blocks.
//!
//! The transcript rarely states which URL a fetch used, so the resolver
//! walks a fixed cascade of strategies over the block's context window and
//! result content, and returns the first hit tagged with its [`UrlSource`]:
//!
//! 1. the most recent user message (`user_message`)
//! 2. `<think>` regions, most recent first (`thinking`)
//! 3. sub-agent `Task` tool spans, most recent first (`task_prompt`)
//! 4. the last URL in the trailing lines of context (`inferred`)
//! 5. URLs, failing hosts or domains in the result itself (`result_content`)
//! 6. the most recent bare domain mentioned in context (`inferred`)
//!
//! Within a region the *last* literal wins where several URLs are usually
//! discussed before the fetched one is chosen. Every candidate goes through
//! the noise filter before it can be returned.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ScanConfig;
use crate::errors::LinkTrailResult;
use crate::models::{ProvenanceResult, UrlSource};
use crate::scanner::blocks::{is_tool_tag_line, tool_span_regex};
use crate::scanner::noise::NoiseFilter;
use crate::scanner::patterns::{char_prefix, domain_tokens, error_hosts, fetch_verb_urls, url_literals};

/// Marker carried by user message header lines, e.g. `_**User (2026-01-22T19:27:48Z)**_`.
pub const USER_HEADER: &str = "_**User";

static THINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

type Strategy = fn(&ProvenanceResolver, &[&str], &str) -> Option<String>;

/// Resolution cascade, highest priority first.
const STRATEGIES: [(UrlSource, Strategy); 6] = [
    (UrlSource::UserMessage, ProvenanceResolver::from_user_message),
    (UrlSource::Thinking, ProvenanceResolver::from_thinking),
    (UrlSource::TaskPrompt, ProvenanceResolver::from_task_prompt),
    (UrlSource::Inferred, ProvenanceResolver::from_recent_urls),
    (UrlSource::ResultContent, ProvenanceResolver::from_result_content),
    (UrlSource::Inferred, ProvenanceResolver::from_domain_mention),
];

/// Lines that end a message block: another header or a horizontal rule.
fn is_message_boundary(line: &str) -> bool {
    line.starts_with("_**") || line.starts_with("---")
}

pub struct ProvenanceResolver {
    noise: NoiseFilter,
    task_span_re: Regex,
    recent_url_lines: usize,
    domain_mention_lines: usize,
    result_url_chars: usize,
    result_domain_chars: usize,
}

impl ProvenanceResolver {
    pub fn new(config: &ScanConfig) -> LinkTrailResult<Self> {
        Ok(Self {
            noise: NoiseFilter::new(&config.noise),
            task_span_re: tool_span_regex(&config.task_tool)?,
            recent_url_lines: config.recent_url_lines,
            domain_mention_lines: config.domain_mention_lines,
            result_url_chars: config.result_url_chars,
            result_domain_chars: config.result_domain_chars,
        })
    }

    /// Run the cascade and return the first strategy's answer.
    pub fn resolve(&self, context: &[&str], result_content: &str) -> ProvenanceResult {
        for (source, strategy) in STRATEGIES {
            if let Some(url) = strategy(self, context, result_content) {
                return ProvenanceResult::found(url, source);
            }
        }
        ProvenanceResult::unknown()
    }

    fn tail<'c>(context: &'c [&'c str], n: usize) -> &'c [&'c str] {
        &context[context.len().saturating_sub(n)..]
    }

    /// First non-noise URL introduced by a fetch verb.
    fn first_fetch_target(&self, text: &str) -> Option<String> {
        fetch_verb_urls(text).find_map(|u| self.noise.accept_url(u))
    }

    fn last_url(&self, text: &str) -> Option<String> {
        url_literals(text)
            .filter_map(|u| self.noise.accept_url(u))
            .last()
    }

    // -- 1. user message -------------------------------------------------

    fn from_user_message(&self, context: &[&str], _result: &str) -> Option<String> {
        let header = context.iter().rposition(|l| l.contains(USER_HEADER))?;
        let body = context[header + 1..]
            .iter()
            .take_while(|l| !is_message_boundary(l))
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        self.first_fetch_target(&body)
            .or_else(|| url_literals(&body).find_map(|u| self.noise.accept_url(u)))
    }

    // -- 2. thinking -----------------------------------------------------

    fn from_thinking(&self, context: &[&str], _result: &str) -> Option<String> {
        let joined = context.join("\n");
        let regions: Vec<&str> = THINK_RE.find_iter(&joined).map(|m| m.as_str()).collect();
        regions
            .iter()
            .rev()
            .find_map(|region| self.first_fetch_target(region).or_else(|| self.last_url(region)))
    }

    // -- 3. task prompt --------------------------------------------------

    fn from_task_prompt(&self, context: &[&str], _result: &str) -> Option<String> {
        let joined = context.join("\n");
        let spans: Vec<&str> = self
            .task_span_re
            .find_iter(&joined)
            .map(|m| m.as_str())
            .collect();
        spans.iter().rev().find_map(|span| {
            self.last_url(span)
                .or_else(|| domain_tokens(span).find_map(|d| self.noise.accept_domain(d)))
        })
    }

    // -- 4. recency fallback ---------------------------------------------

    fn from_recent_urls(&self, context: &[&str], _result: &str) -> Option<String> {
        let recent = Self::tail(context, self.recent_url_lines).join("\n");
        self.last_url(&recent)
    }

    // -- 5. result content -----------------------------------------------

    fn from_result_content(&self, _context: &[&str], result: &str) -> Option<String> {
        if result.is_empty() {
            return None;
        }

        url_literals(char_prefix(result, self.result_url_chars))
            .find_map(|u| self.noise.accept_url(u))
            .or_else(|| error_hosts(result).find_map(|host| self.noise.accept_domain(host)))
            .or_else(|| {
                domain_tokens(char_prefix(result, self.result_domain_chars))
                    .find_map(|d| self.noise.accept_domain(d))
            })
    }

    // -- 6. domain mention -----------------------------------------------

    fn from_domain_mention(&self, context: &[&str], _result: &str) -> Option<String> {
        Self::tail(context, self.domain_mention_lines)
            .iter()
            .rev()
            .filter(|line| !is_tool_tag_line(line))
            .find_map(|line| domain_tokens(line).find_map(|d| self.noise.accept_domain(d)))
    }
}
