//! Compiled token patterns shared by the scanner and the resolvers.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Compiled regex patterns (LazyLock for one-time init)
// ---------------------------------------------------------------------------

/// `http://` or `https://` followed by anything up to whitespace, angle
/// brackets, quotes or a closing bracket/paren.
pub static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s<>"'\]\)]+"#).unwrap());

/// Explicit "fetch verb followed by URL" phrasing.
pub static FETCH_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:read|fetch|go to|visit|check|analyze|look at)\s+(https?://[^\s<>"'\]\)]+)"#,
    )
    .unwrap()
});

/// Bare hostname-looking token with an alphabetic TLD.
pub static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-zA-Z0-9][-a-zA-Z0-9]*(?:\.[a-zA-Z0-9][-a-zA-Z0-9]*)*\.[a-zA-Z]{2,})\b")
        .unwrap()
});

/// Hostname captured after a network-failure phrase.
const HOST: &str = r"([a-zA-Z0-9][-a-zA-Z0-9]*(?:\.[a-zA-Z0-9][-a-zA-Z0-9]*)+)";

/// Network-failure phrasings that name the host, in match priority order.
pub static ERROR_HOST_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"(?i)ENOTFOUND\s+{HOST}"),
        format!(r"(?i)Host:\s*{HOST}"),
        r"(?i)certificate.*?([a-zA-Z0-9][-a-zA-Z0-9]*\.[a-zA-Z]{2,})".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Strip sentence punctuation that trails a URL in prose.
pub fn trim_url(url: &str) -> &str {
    url.trim_end_matches(['.', ',', ';', ':', '!', '?'])
}

/// All URL literals in `text`, in order of appearance.
pub fn url_literals(text: &str) -> impl Iterator<Item = &str> {
    URL_RE
        .find_iter(text)
        .map(|m| trim_url(m.as_str()))
        .filter(|u| !u.is_empty())
}

/// URLs introduced by a fetch verb ("read https://...", "visit https://...").
pub fn fetch_verb_urls(text: &str) -> impl Iterator<Item = &str> {
    FETCH_VERB_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| trim_url(m.as_str()))
}

/// All domain-looking tokens in `text`, in order of appearance.
pub fn domain_tokens(text: &str) -> impl Iterator<Item = &str> {
    DOMAIN_RE.find_iter(text).map(|m| m.as_str())
}

/// The first `max_chars` characters of `text`, cut on a char boundary.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Host named by a DNS, `Host:` or certificate failure message.
pub fn error_hosts(text: &str) -> impl Iterator<Item = &str> {
    ERROR_HOST_RES.iter().filter_map(move |re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().trim_end_matches('.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_literals_stop_at_delimiters() {
        let text = r#"see (https://a.dev/x) and "https://b.io/y" or <https://c.org>"#;
        let urls: Vec<&str> = url_literals(text).collect();
        assert_eq!(urls, vec!["https://a.dev/x", "https://b.io/y", "https://c.org"]);
    }

    #[test]
    fn test_url_literals_trim_punctuation() {
        let urls: Vec<&str> = url_literals("Go read https://target.dev/page.").collect();
        assert_eq!(urls, vec!["https://target.dev/page"]);
    }

    #[test]
    fn test_fetch_verb_urls() {
        let text = "I mentioned https://other.dev but please Look at https://wanted.dev now";
        let urls: Vec<&str> = fetch_verb_urls(text).collect();
        assert_eq!(urls, vec!["https://wanted.dev"]);
    }

    #[test]
    fn test_domain_tokens() {
        let domains: Vec<&str> = domain_tokens("compare acme.io with sub.beta-site.co.uk today").collect();
        assert_eq!(domains, vec!["acme.io", "sub.beta-site.co.uk"]);
    }

    #[test]
    fn test_domain_tokens_ignore_versions() {
        assert_eq!(domain_tokens("model v4.5 and 3.14").count(), 0);
    }

    #[test]
    fn test_char_prefix_respects_boundaries() {
        assert_eq!(char_prefix("héllo", 2), "hé");
        assert_eq!(char_prefix("abc", 10), "abc");
        assert_eq!(char_prefix("", 3), "");
    }

    #[test]
    fn test_error_hosts() {
        let hosts: Vec<&str> = error_hosts("getaddrinfo ENOTFOUND missing-host.test").collect();
        assert_eq!(hosts.first(), Some(&"missing-host.test"));
        let hosts: Vec<&str> =
            error_hosts("Hostname/IP does not match certificate's altnames: Host: mailbox.in.ua.")
                .collect();
        assert_eq!(hosts.first(), Some(&"mailbox.in.ua"));
    }
}
