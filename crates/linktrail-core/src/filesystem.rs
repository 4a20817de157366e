//! Input path expansion for transcript files.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Literal(char),
    /// `?`: one character other than `/`.
    AnyChar,
    /// `*`: any run of characters other than `/`.
    Star,
    /// `**/`: zero or more whole directories.
    AnyDirs,
    /// `**` not followed by `/`: anything, separators included.
    AnyPath,
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    tokens.push(Token::AnyDirs);
                    i += 3;
                } else {
                    tokens.push(Token::AnyPath);
                    i += 2;
                }
                continue;
            }
            '*' => tokens.push(Token::Star),
            '?' => tokens.push(Token::AnyChar),
            c => tokens.push(Token::Literal(c)),
        }
        i += 1;
    }
    tokens
}

/// `true` if an argument should be expanded rather than taken literally.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Match a `/`-separated relative path against a glob supporting `*`, `?`
/// and `**`.
pub fn glob_match(text: &str, pattern: &str) -> bool {
    let t_chars: Vec<char> = text.replace('\\', "/").chars().collect();
    let tokens = tokenize(pattern);
    let (tl, pl) = (t_chars.len(), tokens.len());

    // dp[i][j]: text[..i] matches tokens[..j]
    let mut dp = vec![vec![false; pl + 1]; tl + 1];
    dp[0][0] = true;
    for j in 0..pl {
        // Whether any prefix text[..k] (k < i) matched tokens[..j].
        let mut reached = false;
        for i in 0..=tl {
            let prev = if i > 0 { Some(t_chars[i - 1]) } else { None };
            dp[i][j + 1] = match tokens[j] {
                Token::Literal(c) => prev == Some(c) && dp[i - 1][j],
                Token::AnyChar => prev.is_some_and(|c| c != '/') && dp[i - 1][j],
                Token::Star => dp[i][j] || (prev.is_some_and(|c| c != '/') && dp[i - 1][j + 1]),
                Token::AnyPath => dp[i][j] || (i > 0 && dp[i - 1][j + 1]),
                Token::AnyDirs => dp[i][j] || (prev == Some('/') && reached),
            };
            reached |= dp[i][j];
        }
    }
    dp[tl][pl]
}

/// Split a glob into its literal leading directory and the remaining pattern.
fn split_base(pattern: &str) -> (PathBuf, String) {
    let normalized = pattern.replace('\\', "/");
    let parts: Vec<&str> = normalized.split('/').collect();
    let literal = parts.iter().take_while(|p| !is_glob(p)).count();

    let base = match parts[..literal].join("/") {
        b if b.is_empty() && normalized.starts_with('/') => "/".to_string(),
        b if b.is_empty() => ".".to_string(),
        b => b,
    };
    (PathBuf::from(base), parts[literal..].join("/"))
}

fn expand_glob(pattern: &str) -> Vec<PathBuf> {
    let (base, rest) = split_base(pattern);
    let mut walker = WalkDir::new(&base).min_depth(1).sort_by_file_name();
    if !rest.contains("**") {
        walker = walker.max_depth(rest.split('/').count());
    }

    let mut matches = Vec::new();
    for entry in walker.into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(&base) else {
            continue;
        };
        if glob_match(&rel.to_string_lossy(), &rest) {
            matches.push(entry.into_path());
        }
    }
    debug!("{pattern}: {} match(es)", matches.len());
    matches
}

/// Expand file arguments into a deduplicated list of transcript files ordered
/// by file name. Missing literal paths are reported and skipped.
pub fn expand_paths<S: AsRef<str>>(patterns: &[S]) -> Vec<PathBuf> {
    let mut seen: IndexSet<PathBuf> = IndexSet::new();
    let mut files = Vec::new();

    let candidates = patterns.iter().flat_map(|pattern| {
        let pattern = pattern.as_ref();
        if is_glob(pattern) {
            return expand_glob(pattern);
        }
        let path = Path::new(pattern);
        if path.is_file() {
            vec![path.to_path_buf()]
        } else if path.exists() {
            warn!("Not a file, skipping: {pattern}");
            vec![]
        } else {
            warn!("File not found: {pattern}");
            vec![]
        }
    });

    for path in candidates {
        let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "x").unwrap();
        path
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_glob_match_star_and_question() {
        assert!(glob_match("session-1.md", "*.md"));
        assert!(glob_match("session-1.md", "session-?.md"));
        assert!(!glob_match("session-10.md", "session-?.md"));
        assert!(!glob_match("notes/session.md", "*.md"));
    }

    #[test]
    fn test_glob_match_double_star() {
        assert!(glob_match("a.md", "**/*.md"));
        assert!(glob_match("2026/01/a.md", "**/*.md"));
        assert!(glob_match("2026/01/a.md", "2026/**/a.md"));
        assert!(glob_match("2026/a.md", "2026/**"));
        assert!(!glob_match("2026/a.txt", "**/*.md"));
    }

    #[test]
    fn test_split_base() {
        assert_eq!(
            split_base(".specstory/history/*.md"),
            (PathBuf::from(".specstory/history"), "*.md".to_string())
        );
        assert_eq!(split_base("*.md"), (PathBuf::from("."), "*.md".to_string()));
        assert_eq!(split_base("/logs/**/*.md"), (PathBuf::from("/logs"), "**/*.md".to_string()));
    }

    #[test]
    fn test_expand_glob_single_level() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.md");
        touch(dir.path(), "a.md");
        touch(dir.path(), "c.txt");
        touch(dir.path(), "nested/d.md");

        let pattern = format!("{}/*.md", dir.path().display());
        assert_eq!(names(&expand_paths(&[pattern])), vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_expand_glob_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "top.md");
        touch(dir.path(), "2026/01/deep.md");
        touch(dir.path(), "2026/skip.txt");

        let pattern = format!("{}/**/*.md", dir.path().display());
        assert_eq!(names(&expand_paths(&[pattern])), vec!["deep.md", "top.md"]);
    }

    #[test]
    fn test_literal_paths_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(dir.path(), "z.md");
        let missing = dir.path().join("missing.md");

        let files = expand_paths(&[
            file.display().to_string(),
            missing.display().to_string(),
            dir.path().display().to_string(),
        ]);
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_duplicates_removed_first_wins() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(dir.path(), "one.md");
        let dotted = dir.path().join(".").join("one.md");

        let files = expand_paths(&[
            file.display().to_string(),
            dotted.display().to_string(),
            format!("{}/*.md", dir.path().display()),
        ]);
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(expand_paths(&[format!("{}/*.md", dir.path().display())]).is_empty());
    }
}
