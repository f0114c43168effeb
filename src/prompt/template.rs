//! Prompt template parsing and resolution.
//!
//! Templates use `{{name}}` placeholders:
//!
//! - `{{name}}` or `{{ name }}` - Substitutes the value of context variable `name`
//! - A lone `{` or `}` is literal text
//!
//! # Error Handling
//!
//! Templates are parsed once, when a [`PromptTemplate`] is constructed, so
//! syntax errors surface before any context is consulted. Resolution is
//! all-or-nothing: a placeholder without a matching context key aborts with
//! [`TemplateError::MissingVariable`] and no partially substituted text is
//! returned.

use super::context::BuildContext;
use std::fmt;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Error type for template parsing and resolution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template text was empty.
    EmptyTemplate,
    /// A `{{` was found without a matching `}}`.
    UnclosedPlaceholder {
        /// Byte offset of the unmatched `{{`.
        position: usize,
    },
    /// A placeholder with no name was found (e.g., `{{}}`).
    EmptyPlaceholder {
        /// Byte offset of the empty placeholder.
        position: usize,
    },
    /// A placeholder referenced a variable missing from the build context.
    MissingVariable {
        /// The name of the missing variable.
        name: String,
        /// Byte offset of the placeholder in the template.
        position: usize,
    },
}

impl TemplateError {
    /// Stable snake_case identifier used in log records.
    pub fn code(&self) -> &'static str {
        match self {
            TemplateError::EmptyTemplate => "empty_template",
            TemplateError::UnclosedPlaceholder { .. } => "unclosed_placeholder",
            TemplateError::EmptyPlaceholder { .. } => "empty_placeholder",
            TemplateError::MissingVariable { .. } => "missing_variable",
        }
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::EmptyTemplate => write!(f, "prompt template is empty"),
            TemplateError::UnclosedPlaceholder { position } => {
                write!(f, "unclosed '{{{{' at position {} in template", position)
            }
            TemplateError::EmptyPlaceholder { position } => {
                write!(
                    f,
                    "empty placeholder '{{{{}}}}' at position {} in template",
                    position
                )
            }
            TemplateError::MissingVariable { name, position } => {
                write!(
                    f,
                    "missing variable '{}' at position {} in template",
                    name, position
                )
            }
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { name: String, position: usize },
}

/// A parsed, immutable prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse a template.
    ///
    /// Fails on an empty template, an unclosed `{{`, or an empty placeholder.
    ///
    /// ```
    /// use promptstep::prompt::PromptTemplate;
    ///
    /// let template = PromptTemplate::new("Summarize build {{ BUILD_NUMBER }}").unwrap();
    /// assert_eq!(template.placeholders(), vec!["BUILD_NUMBER"]);
    /// ```
    pub fn new(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        if source.is_empty() {
            return Err(TemplateError::EmptyTemplate);
        }
        let segments = parse(&source)?;
        Ok(Self { source, segments })
    }

    /// The raw template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Distinct placeholder names, in order of first occurrence.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder { name, .. } = segment
                && !names.contains(&name.as_str())
            {
                names.push(name);
            }
        }
        names
    }

    /// Resolve this template against a build context.
    ///
    /// ```
    /// use promptstep::prompt::{BuildContext, PromptTemplate};
    ///
    /// let template = PromptTemplate::new("Say hi to {{who}}").unwrap();
    /// let context = BuildContext::from_pairs([("who", "Sam")]);
    /// assert_eq!(template.resolve(&context).unwrap().as_str(), "Say hi to Sam");
    /// ```
    pub fn resolve(&self, context: &BuildContext) -> Result<ResolvedPrompt, TemplateError> {
        let mut text = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                Segment::Placeholder { name, position } => match context.get(name) {
                    Some(value) => text.push_str(value),
                    None => {
                        return Err(TemplateError::MissingVariable {
                            name: name.clone(),
                            position: *position,
                        });
                    }
                },
            }
        }

        Ok(ResolvedPrompt(text))
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Prompt text after every placeholder has been substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrompt(String);

impl ResolvedPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResolvedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve a template string against a context in one step.
pub fn resolve(template: &str, context: &BuildContext) -> Result<ResolvedPrompt, TemplateError> {
    PromptTemplate::new(template)?.resolve(context)
}

fn parse(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = source[cursor..].find(OPEN) {
        let open = cursor + offset;
        if open > cursor {
            segments.push(Segment::Literal(source[cursor..open].to_string()));
        }

        let name_start = open + OPEN.len();
        let close = source[name_start..]
            .find(CLOSE)
            .map(|offset| name_start + offset)
            .ok_or(TemplateError::UnclosedPlaceholder { position: open })?;

        let raw = &source[name_start..close];
        // A second opener before the closer means the first one was never closed.
        if raw.contains(OPEN) {
            return Err(TemplateError::UnclosedPlaceholder { position: open });
        }

        let name = raw.trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyPlaceholder { position: open });
        }

        segments.push(Segment::Placeholder {
            name: name.to_string(),
            position: open,
        });
        cursor = close + CLOSE.len();
    }

    if cursor < source.len() {
        segments.push(Segment::Literal(source[cursor..].to_string()));
    }

    Ok(segments)
}
