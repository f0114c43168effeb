//! Build context: the variables a prompt template resolves against.
//!
//! A context is assembled by the caller before the step runs, from explicit
//! `KEY=VALUE` pairs and, optionally, the process environment (which is how
//! build servers such as Jenkins expose `BUILD_NUMBER`, `JOB_NAME`, and
//! friends). The step only ever reads it.

use crate::error::{Result, StepError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static VAR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("variable name pattern is valid")
});

/// Mapping from variable name to value. Keys are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildContext {
    vars: HashMap<String, String>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from a list of key-value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Build a context from `KEY=VALUE` arguments.
    ///
    /// Later duplicates win over earlier ones.
    pub fn from_var_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut vars = HashMap::with_capacity(args.len());
        for arg in args {
            let (key, value) = parse_var_arg(arg.as_ref())?;
            vars.insert(key, value);
        }
        Ok(Self { vars })
    }

    /// Import environment variables whose names match any of `patterns`.
    ///
    /// An empty pattern list imports everything. The environment is passed
    /// in as an iterator so callers decide where it comes from
    /// (normally `std::env::vars()`).
    pub fn from_env<I>(env: I, patterns: &[String]) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let filter = if patterns.is_empty() {
            None
        } else {
            Some(build_globset(patterns)?)
        };

        let vars = env
            .into_iter()
            .filter(|(key, _)| filter.as_ref().is_none_or(|set| set.is_match(key)))
            .collect();

        Ok(Self { vars })
    }

    /// Overlay `other` on top of this context; keys in `other` win.
    pub fn merged_with(mut self, other: BuildContext) -> Self {
        self.vars.extend(other.vars);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variable names, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Parse a single `KEY=VALUE` argument.
///
/// The value may itself contain `=`; only the first one splits.
pub fn parse_var_arg(arg: &str) -> Result<(String, String)> {
    let (key, value) = arg.split_once('=').ok_or_else(|| {
        StepError::UserError(format!(
            "invalid variable '{}': expected KEY=VALUE\n\
             Fix: pass variables as --var NAME=value",
            arg
        ))
    })?;

    if !VAR_NAME.is_match(key) {
        return Err(StepError::UserError(format!(
            "invalid variable name '{}': names start with a letter or '_' and contain only \
             letters, digits, '_', '.', or '-'",
            key
        )));
    }

    Ok((key.to_string(), value.to_string()))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            StepError::UserError(format!("invalid --env-include pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }

    builder
        .build()
        .map_err(|e| StepError::UserError(format!("failed to compile --env-include globs: {}", e)))
}
