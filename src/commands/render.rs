//! Implementation of the `promptstep render` command.
//!
//! Resolves the template against the build context and prints the result,
//! or with `--check` reports which placeholders are resolvable. Never
//! touches the network.

use super::{build_context, load_template};
use crate::cli::RenderArgs;
use crate::error::Result;
use crate::exit_codes;
use crate::prompt::{BuildContext, PromptTemplate};

/// Execute the `promptstep render` command.
pub fn cmd_render(args: RenderArgs) -> Result<i32> {
    let template = load_template(&args.prompt)?;
    let context = build_context(&args.context)?;

    let (output, code) = if args.check {
        check_template(&template, &context)
    } else {
        render_template(&template, &context)
    };

    if code == exit_codes::SUCCESS {
        println!("{}", output);
    } else {
        eprintln!("{}", output);
    }
    Ok(code)
}

fn render_template(template: &str, context: &BuildContext) -> (String, i32) {
    match PromptTemplate::new(template).and_then(|t| t.resolve(context)) {
        Ok(prompt) => (prompt.into_string(), exit_codes::SUCCESS),
        Err(e) => (format!("Error: {}", e), exit_codes::STEP_FAILURE),
    }
}

/// One line per distinct placeholder, marked `ok` or `missing`.
fn check_template(template: &str, context: &BuildContext) -> (String, i32) {
    let parsed = match PromptTemplate::new(template) {
        Ok(parsed) => parsed,
        Err(e) => return (format!("Error: {}", e), exit_codes::STEP_FAILURE),
    };

    let placeholders = parsed.placeholders();
    if placeholders.is_empty() {
        return ("No placeholders.".to_string(), exit_codes::SUCCESS);
    }

    let width = placeholders.iter().map(|p| p.len()).max().unwrap_or(0);
    let mut missing = 0;
    let mut lines = Vec::with_capacity(placeholders.len() + 1);
    for name in &placeholders {
        let status = if context.contains(name) {
            "ok"
        } else {
            missing += 1;
            "missing"
        };
        lines.push(format!("  {:width$}  {}", name, status, width = width));
    }

    if missing == 0 {
        lines.insert(0, format!("All {} placeholder(s) resolved:", placeholders.len()));
        (lines.join("\n"), exit_codes::SUCCESS)
    } else {
        lines.insert(
            0,
            format!("{} of {} placeholder(s) unresolved:", missing, placeholders.len()),
        );
        (lines.join("\n"), exit_codes::STEP_FAILURE)
    }
}
