//! Tech-stack keyword detection.
//!
//! Scans free-form requirements text (a README, a ticket, a pipeline brief)
//! for known build-tool keywords so a prompt can say `{{tech_stack}}`
//! without the job spelling it out.

use super::context::BuildContext;
use regex::Regex;
use std::sync::LazyLock;

/// Build-context variable the detected stack is exposed as.
pub const TECH_STACK_VAR: &str = "tech_stack";

/// Recognized keywords, in reporting order.
pub const TECH_KEYWORDS: &[&str] = &["docker", "artifactory", "cmake", "make", "ghs", "bat", "sh"];

static KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = TECH_KEYWORDS.join("|");
    Regex::new(&format!(r"(?i)\b({})\b", alternation)).expect("keyword pattern is valid")
});

/// Keywords mentioned in `text`, case-insensitive, whole words only.
///
/// ```
/// use promptstep::prompt::detect_tech_stack;
///
/// assert_eq!(detect_tech_stack("Uses Docker and CMake"), vec!["docker", "cmake"]);
/// assert!(detect_tech_stack("ships a shell script").is_empty());
/// ```
pub fn detect_tech_stack(text: &str) -> Vec<&'static str> {
    let mut found = [false; TECH_KEYWORDS.len()];
    for m in KEYWORD.find_iter(text) {
        let word = m.as_str().to_lowercase();
        if let Some(index) = TECH_KEYWORDS.iter().position(|k| *k == word) {
            found[index] = true;
        }
    }

    TECH_KEYWORDS
        .iter()
        .zip(found)
        .filter_map(|(keyword, hit)| hit.then_some(*keyword))
        .collect()
}

/// Combine explicitly named technologies with those detected in
/// `requirements`. Explicit names come first, keeping their order; detected
/// keywords follow in [`TECH_KEYWORDS`] order. Duplicates are dropped
/// case-insensitively.
pub fn merge_tech_stack<S: AsRef<str>>(explicit: &[S], requirements: Option<&str>) -> Vec<String> {
    let mut stack: Vec<String> = Vec::new();
    let detected = requirements.map(detect_tech_stack).unwrap_or_default();

    let candidates = explicit
        .iter()
        .map(|s| s.as_ref().trim().to_string())
        .chain(detected.into_iter().map(str::to_string));
    for name in candidates {
        if !name.is_empty() && !stack.iter().any(|s| s.eq_ignore_ascii_case(&name)) {
            stack.push(name);
        }
    }
    stack
}

/// A context holding only `tech_stack`, joined with `", "`.
///
/// Empty when nothing was named or detected, so a template that uses
/// `{{tech_stack}}` fails with a missing variable instead of rendering blank.
pub fn tech_stack_context(stack: &[String]) -> BuildContext {
    if stack.is_empty() {
        BuildContext::new()
    } else {
        BuildContext::from_pairs([(TECH_STACK_VAR, stack.join(", "))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_case_insensitively() {
        assert_eq!(detect_tech_stack("Uses Docker"), vec!["docker"]);
        assert_eq!(detect_tech_stack("ARTIFACTORY upload"), vec!["artifactory"]);
    }

    #[test]
    fn test_reports_in_keyword_order_once() {
        let found = detect_tech_stack("sh steps, then make, then docker, docker again");
        assert_eq!(found, vec!["docker", "make", "sh"]);
    }

    #[test]
    fn test_cmake_does_not_imply_make() {
        assert_eq!(detect_tech_stack("configure with cmake"), vec!["cmake"]);
        assert_eq!(detect_tech_stack("cmake, then make install"), vec!["cmake", "make"]);
    }

    #[test]
    fn test_ignores_keywords_inside_words() {
        assert!(detect_tech_stack("push the shell batch to the makefile").is_empty());
    }

    #[test]
    fn test_ghs_and_bat() {
        assert_eq!(detect_tech_stack("GHS compiler on Windows via bat"), vec!["ghs", "bat"]);
    }

    #[test]
    fn test_merge_puts_explicit_first_and_dedups() {
        let stack = merge_tech_stack(&["Gradle", "docker"], Some("Uses Docker and sh"));
        assert_eq!(stack, vec!["Gradle", "docker", "sh"]);
    }

    #[test]
    fn test_merge_without_requirements() {
        let stack = merge_tech_stack(&[" maven ", ""], None);
        assert_eq!(stack, vec!["maven"]);
    }

    #[test]
    fn test_tech_stack_context() {
        let ctx = tech_stack_context(&["docker".to_string(), "make".to_string()]);
        assert_eq!(ctx.get(TECH_STACK_VAR), Some("docker, make"));
        assert!(tech_stack_context(&[]).is_empty());
    }
}
