//! Rendering schemas into promptable questions
//!
//! The interactive prompter itself lives outside this crate; it consumes
//! the [`Prompt`] list. `info` prints the same list, and `get-input` uses
//! [`skeleton`] for modules that have no answers yet.

use std::fmt;

use serde_json::{Map, Value};

use crate::input::codec::AnswerDocument;
use crate::input::schema::{QuestionKind, QuestionSpec};

#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    Text,
    Confirm,
    Choice(Vec<String>),
    /// Ask `fields` once per repetition, then `while_prompt` (yes/no) to continue
    Repeat {
        while_prompt: String,
        fields: Vec<Prompt>,
    },
}

/// One question as presented to a user
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// Dotted path of the answer, e.g. `files.path`
    pub path: String,
    pub label: String,
    pub text: String,
    pub default: Option<String>,
    pub required: bool,
    pub kind: PromptKind,
}

/// Turn a schema into prompts, depth first
pub fn render(schema: &[QuestionSpec]) -> Vec<Prompt> {
    render_level(schema, None)
}

fn render_level(schema: &[QuestionSpec], parent: Option<&str>) -> Vec<Prompt> {
    schema
        .iter()
        .map(|question| {
            let path = match parent {
                Some(parent) => format!("{parent}.{}", question.key),
                None => question.key.clone(),
            };
            let kind = match &question.kind {
                QuestionKind::String => PromptKind::Text,
                QuestionKind::Boolean => PromptKind::Confirm,
                QuestionKind::Select { options } => PromptKind::Choice(options.clone()),
                QuestionKind::List {
                    subtype,
                    while_prompt,
                } => PromptKind::Repeat {
                    while_prompt: while_prompt
                        .clone()
                        .unwrap_or_else(|| format!("Add another {}?", question.label)),
                    fields: render_level(subtype, Some(&path)),
                },
            };

            Prompt {
                text: question
                    .question
                    .clone()
                    .unwrap_or_else(|| question.label.clone()),
                label: question.label.clone(),
                default: question.default.as_ref().map(default_text),
                required: question.is_required(),
                path,
                kind,
            }
        })
        .collect()
}

fn default_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Document shown for a module that has not been configured yet
///
/// Scalars carry their default (or `null`), lists an empty `response`.
pub fn skeleton(schema: &[QuestionSpec]) -> AnswerDocument {
    let records = schema
        .iter()
        .map(|question| {
            let mut record = Map::new();
            record.insert("variable".to_string(), Value::String(question.key.clone()));
            if question.is_list() {
                record.insert("response".to_string(), Value::Array(Vec::new()));
            } else {
                record.insert(
                    "value".to_string(),
                    question.default.clone().unwrap_or(Value::Null),
                );
            }
            Value::Object(record)
        })
        .collect();

    AnswerDocument::from_value(Value::Array(records))
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_prompt(f, self, 0)
    }
}

fn write_prompt(f: &mut fmt::Formatter<'_>, prompt: &Prompt, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let marker = if prompt.required { " (required)" } else { "" };
    write!(f, "{indent}{}: {}{marker}", prompt.path, prompt.text)?;

    match &prompt.kind {
        PromptKind::Text => {}
        PromptKind::Confirm => write!(f, " [yes/no]")?,
        PromptKind::Choice(options) => write!(f, " [{}]", options.join("/"))?,
        PromptKind::Repeat { while_prompt, .. } => write!(f, " (repeats: {while_prompt})")?,
    }
    if let Some(default) = &prompt.default {
        write!(f, " default: {default}")?;
    }

    if let PromptKind::Repeat { fields, .. } = &prompt.kind {
        for field in fields {
            writeln!(f)?;
            write_prompt(f, field, depth + 1)?;
        }
    }
    Ok(())
}
