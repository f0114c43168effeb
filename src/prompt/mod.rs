//! Prompt template resolution.
//!
//! This module provides:
//!
//! - **Template**: `{{name}}` placeholder parsing and all-or-nothing resolution
//! - **Context**: the build variables a template resolves against
//! - **Stack**: build-tool keywords detected in requirements text
//!
//! Resolution is pure: no I/O, no clock, no environment access. The same
//! template and context always produce the same text.

mod context;
mod stack;
mod template;

pub use context::{BuildContext, parse_var_arg};
pub use stack::{
    TECH_KEYWORDS, TECH_STACK_VAR, detect_tech_stack, merge_tech_stack, tech_stack_context,
};
pub use template::{PromptTemplate, ResolvedPrompt, TemplateError, resolve};
