//! Input schema model
//!
//! The on-disk question format is flat (a `type` tag plus optional fields);
//! it is parsed into the recursive [`QuestionSpec`] so validation and
//! rendering can match exhaustively on [`QuestionKind`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CfError, Result};

/// A question as written in an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(rename = "type")]
    pub kind: String,

    /// Identifier of a top-level question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,

    /// Identifier of a question inside a list subtype
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<Vec<RawQuestion>>,

    #[serde(rename = "while", default, skip_serializing_if = "Option::is_none")]
    pub while_prompt: Option<String>,
}

/// The kind of a question, each with its own validation rules
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    String,
    Boolean,
    Select {
        options: Vec<String>,
    },
    /// A repeatable group of sub-questions
    List {
        subtype: Vec<QuestionSpec>,
        while_prompt: Option<String>,
    },
}

impl QuestionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::String => "string",
            QuestionKind::Boolean => "boolean",
            QuestionKind::Select { .. } => "select",
            QuestionKind::List { .. } => "list",
        }
    }
}

/// A validated question
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSpec {
    /// `variable` at top level, `key` inside a list subtype
    pub key: String,
    pub label: String,
    pub question: Option<String>,
    pub namespace: Option<String>,
    pub bundle: Option<String>,
    pub default: Option<Value>,
    pub kind: QuestionKind,
}

impl QuestionSpec {
    #[cfg(test)]
    pub fn new(key: impl Into<String>, kind: QuestionKind) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            question: None,
            namespace: None,
            bundle: None,
            default: None,
            kind,
        }
    }

    #[cfg(test)]
    pub fn string(key: impl Into<String>) -> Self {
        Self::new(key, QuestionKind::String)
    }

    #[cfg(test)]
    pub fn boolean(key: impl Into<String>) -> Self {
        Self::new(key, QuestionKind::Boolean)
    }

    #[cfg(test)]
    pub fn select(key: impl Into<String>, options: &[&str]) -> Self {
        Self::new(
            key,
            QuestionKind::Select {
                options: options.iter().map(|o| (*o).to_string()).collect(),
            },
        )
    }

    #[cfg(test)]
    pub fn list(key: impl Into<String>, subtype: Vec<QuestionSpec>) -> Self {
        Self::new(
            key,
            QuestionKind::List {
                subtype,
                while_prompt: None,
            },
        )
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, QuestionKind::List { .. })
    }

    /// Questions that must be answered explicitly
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.is_list()
    }

    /// Convert back to the index format
    pub fn to_raw(&self, top_level: bool) -> RawQuestion {
        let (options, subtype, while_prompt) = match &self.kind {
            QuestionKind::Select { options } => (Some(options.clone()), None, None),
            QuestionKind::List {
                subtype,
                while_prompt,
            } => (
                None,
                Some(subtype.iter().map(|q| q.to_raw(false)).collect()),
                while_prompt.clone(),
            ),
            QuestionKind::String | QuestionKind::Boolean => (None, None, None),
        };

        RawQuestion {
            kind: self.kind.type_name().to_string(),
            variable: top_level.then(|| self.key.clone()),
            key: (!top_level).then(|| self.key.clone()),
            namespace: self.namespace.clone(),
            bundle: self.bundle.clone(),
            label: Some(self.label.clone()),
            question: self.question.clone(),
            default: self.default.clone(),
            options,
            subtype,
            while_prompt,
        }
    }
}

/// Parse and check a module's input schema
///
/// `module` is only used to give errors context.
pub fn parse_schema(module: &str, raw: &[RawQuestion]) -> Result<Vec<QuestionSpec>> {
    parse_level(module, raw, true)
}

fn parse_level(module: &str, raw: &[RawQuestion], top_level: bool) -> Result<Vec<QuestionSpec>> {
    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(raw.len());

    for question in raw {
        let spec = parse_question(module, question, top_level)?;
        if !seen.insert(spec.key.clone()) {
            return Err(invalid(module, format!("duplicate question '{}'", spec.key)));
        }
        questions.push(spec);
    }

    Ok(questions)
}

fn parse_question(module: &str, raw: &RawQuestion, top_level: bool) -> Result<QuestionSpec> {
    let (id_field, id) = if top_level {
        ("variable", raw.variable.as_deref())
    } else {
        ("key", raw.key.as_deref())
    };
    let key = match id {
        Some(key) if !key.trim().is_empty() => key.to_string(),
        _ => {
            return Err(invalid(
                module,
                format!("every {} question needs a non-empty \"{id_field}\"", raw.kind),
            ));
        }
    };

    let kind = match raw.kind.as_str() {
        "string" => QuestionKind::String,
        "boolean" => QuestionKind::Boolean,
        "select" => match &raw.options {
            Some(options) if !options.is_empty() => QuestionKind::Select {
                options: options.clone(),
            },
            _ => {
                return Err(invalid(
                    module,
                    format!("select question '{key}' needs a non-empty \"options\" list"),
                ));
            }
        },
        "list" => match &raw.subtype {
            Some(subtype) if !subtype.is_empty() => QuestionKind::List {
                subtype: parse_level(module, subtype, false)?,
                while_prompt: raw.while_prompt.clone(),
            },
            _ => {
                return Err(invalid(
                    module,
                    format!("list question '{key}' needs a non-empty \"subtype\""),
                ));
            }
        },
        other => {
            return Err(invalid(
                module,
                format!("question '{key}' has unsupported type '{other}'"),
            ));
        }
    };

    if let Some(default) = &raw.default {
        check_default(module, &key, &kind, default)?;
    }

    Ok(QuestionSpec {
        label: raw.label.clone().unwrap_or_else(|| key.clone()),
        key,
        question: raw.question.clone(),
        namespace: raw.namespace.clone(),
        bundle: raw.bundle.clone(),
        default: raw.default.clone(),
        kind,
    })
}

fn check_default(module: &str, key: &str, kind: &QuestionKind, default: &Value) -> Result<()> {
    let ok = match kind {
        QuestionKind::String => default.is_string(),
        QuestionKind::Boolean => default.is_boolean(),
        QuestionKind::Select { options } => default
            .as_str()
            .is_some_and(|d| options.iter().any(|o| o == d)),
        QuestionKind::List { .. } => false,
    };

    if ok {
        Ok(())
    } else {
        Err(invalid(
            module,
            format!(
                "default of {} question '{key}' is not a valid {} value",
                kind.type_name(),
                kind.type_name()
            ),
        ))
    }
}

fn invalid(module: &str, message: String) -> CfError {
    CfError::ConfigInvalid {
        message: format!("input schema of module '{module}': {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Vec<RawQuestion> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_list_schema() {
        let schema = parse_schema(
            "delete-files",
            &raw(json!([{
                "type": "list",
                "variable": "files",
                "namespace": "delete_files",
                "bundle": "delete_files",
                "label": "Files",
                "subtype": [
                    {"key": "path", "type": "string", "label": "Path", "question": "Path to file"},
                    {"key": "why", "type": "string", "label": "Why", "default": "Unknown"}
                ],
                "while": "Specify another file you want deleted on your hosts?"
            }])),
        )
        .unwrap();

        assert_eq!(schema.len(), 1);
        let QuestionKind::List {
            subtype,
            while_prompt,
        } = &schema[0].kind
        else {
            panic!("expected list question");
        };
        assert_eq!(subtype.len(), 2);
        assert_eq!(subtype[0].key, "path");
        assert!(subtype[0].is_required());
        assert!(!subtype[1].is_required());
        assert!(while_prompt.is_some());
        assert!(!schema[0].is_required());
    }

    #[test]
    fn test_parse_rejects_missing_identifier() {
        let result = parse_schema("m", &raw(json!([{"type": "string", "label": "x"}])));
        assert!(matches!(result, Err(CfError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let result = parse_schema("m", &raw(json!([{"type": "number", "variable": "n"}])));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_duplicate_variables() {
        let result = parse_schema(
            "m",
            &raw(json!([
                {"type": "string", "variable": "a"},
                {"type": "boolean", "variable": "a"}
            ])),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_mistyped_default() {
        let result = parse_schema(
            "m",
            &raw(json!([{"type": "boolean", "variable": "b", "default": "maybe"}])),
        );
        assert!(result.is_err());

        let result = parse_schema(
            "m",
            &raw(json!([{"type": "select", "variable": "s", "options": ["a"], "default": "b"}])),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_to_raw_round_trips() {
        let schema = vec![
            QuestionSpec::list(
                "files",
                vec![QuestionSpec::string("path"), QuestionSpec::boolean("force")],
            ),
            QuestionSpec::select("mode", &["fast", "safe"]).with_default(json!("safe")),
        ];
        let raw: Vec<RawQuestion> = schema.iter().map(|q| q.to_raw(true)).collect();
        assert_eq!(parse_schema("m", &raw).unwrap(), schema);
    }
}
