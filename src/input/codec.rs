//! Answer document codec
//!
//! Wire format (the same text `get-input` prints and `set-input` reads):
//!
//! ```json
//! [
//!   { "variable": "motd", "value": "Welcome" },
//!   { "variable": "files", "response": [ { "path": "/tmp/a", "why": "Unknown" } ] }
//! ]
//! ```
//!
//! Decoding validates against the schema and yields answers in schema
//! order; encoding is canonical (sorted keys, pretty printed, trailing
//! newline), so a get/set cycle reproduces the stored bytes exactly.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{CfError, Result};
use crate::input::answers::{Answer, AnswerValue, Answers, ResponseGroup};
use crate::input::schema::{QuestionKind, QuestionSpec};

const VARIABLE: &str = "variable";
const VALUE: &str = "value";
const RESPONSE: &str = "response";

/// A JSON answer document
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerDocument(Value);

impl AnswerDocument {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parse document text; structure is checked later by [`deserialize`]
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map(Self)
            .map_err(|e| CfError::validation("document", format!("not valid JSON: {e}")))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Canonical text form
    pub fn to_canonical_string(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(&self.0)?;
        text.push('\n');
        Ok(text)
    }
}

/// Encode answers as a document
pub fn serialize(answers: &Answers) -> AnswerDocument {
    let records = answers
        .answers
        .iter()
        .map(|answer| {
            let mut record = Map::new();
            record.insert(VARIABLE.to_string(), Value::String(answer.key.clone()));
            let field = match answer.value {
                AnswerValue::Scalar(_) => VALUE,
                AnswerValue::List(_) => RESPONSE,
            };
            record.insert(field.to_string(), answer.value.to_json());
            Value::Object(record)
        })
        .collect();

    AnswerDocument(Value::Array(records))
}

/// Decode and validate a document against a schema
///
/// Fails on the first missing required answer, unknown or duplicate key,
/// or type mismatch. Defaults fill in unanswered defaulted questions and
/// unanswered list questions become empty lists.
pub fn deserialize(document: &AnswerDocument, schema: &[QuestionSpec]) -> Result<Answers> {
    let records = document.as_value().as_array().ok_or_else(|| {
        CfError::validation("document", "expected a JSON array of answer records")
    })?;

    let mut by_variable: HashMap<&str, &Map<String, Value>> = HashMap::new();
    for (position, record) in records.iter().enumerate() {
        let record_name = format!("record {position}");
        let object = record
            .as_object()
            .ok_or_else(|| CfError::validation(&record_name, "expected an object"))?;

        let variable = object
            .get(VARIABLE)
            .and_then(Value::as_str)
            .ok_or_else(|| CfError::validation(&record_name, "missing \"variable\" string"))?;

        if !schema.iter().any(|q| q.key == variable) {
            return Err(CfError::validation(variable, "unknown key"));
        }
        if let Some(extra) = object
            .keys()
            .find(|k| ![VARIABLE, VALUE, RESPONSE].contains(&k.as_str()))
        {
            return Err(CfError::validation(
                variable,
                format!("unknown record field \"{extra}\""),
            ));
        }
        if by_variable.insert(variable, object).is_some() {
            return Err(CfError::validation(variable, "answered more than once"));
        }
    }

    let mut answers = Vec::with_capacity(schema.len());
    for question in schema {
        let supplied = match by_variable.get(question.key.as_str()) {
            Some(record) => record_value(question, record)?,
            None => None,
        };
        let value = decode_value(question, supplied, &question.key)?;
        answers.push(Answer::new(question.key.clone(), value));
    }

    Ok(Answers::new(answers))
}

/// Pick the field that carries the answer for this kind of question
fn record_value<'a>(
    question: &QuestionSpec,
    record: &'a Map<String, Value>,
) -> Result<Option<&'a Value>> {
    let (expected, other) = if question.is_list() {
        (RESPONSE, VALUE)
    } else {
        (VALUE, RESPONSE)
    };

    if record.contains_key(other) {
        return Err(CfError::validation(
            &question.key,
            format!(
                "{} questions are answered with \"{expected}\", not \"{other}\"",
                question.kind.type_name()
            ),
        ));
    }
    Ok(record.get(expected))
}

fn decode_value(question: &QuestionSpec, supplied: Option<&Value>, field: &str) -> Result<AnswerValue> {
    let value = match supplied {
        Some(Value::Null) | None => match (&question.default, &question.kind) {
            (_, QuestionKind::List { .. }) => return Ok(AnswerValue::List(Vec::new())),
            (Some(default), _) => default,
            (None, _) => return Err(CfError::validation(field, "a value is required")),
        },
        Some(value) => value,
    };

    match &question.kind {
        QuestionKind::String => value
            .as_str()
            .map(AnswerValue::string)
            .ok_or_else(|| CfError::validation(field, "expected a string")),
        QuestionKind::Boolean => decode_bool(value)
            .map(AnswerValue::boolean)
            .ok_or_else(|| CfError::validation(field, "expected true or false")),
        QuestionKind::Select { options } => match value.as_str() {
            Some(choice) if options.iter().any(|o| o == choice) => Ok(AnswerValue::string(choice)),
            _ => Err(CfError::validation(
                field,
                format!("must be one of: {}", options.join(", ")),
            )),
        },
        QuestionKind::List { subtype, .. } => {
            let items = value
                .as_array()
                .ok_or_else(|| CfError::validation(field, "expected an array of responses"))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| decode_group(subtype, item, &format!("{field}[{i}]")))
                .collect::<Result<Vec<_>>>()
                .map(AnswerValue::List)
        }
    }
}

fn decode_group(subtype: &[QuestionSpec], item: &Value, field: &str) -> Result<ResponseGroup> {
    let object = item
        .as_object()
        .ok_or_else(|| CfError::validation(field, "expected an object"))?;

    if let Some(unknown) = object.keys().find(|k| !subtype.iter().any(|q| &q.key == *k)) {
        return Err(CfError::validation(format!("{field}.{unknown}"), "unknown key"));
    }

    subtype
        .iter()
        .map(|question| {
            let path = format!("{field}.{}", question.key);
            decode_value(question, object.get(&question.key), &path)
                .map(|value| Answer::new(question.key.clone(), value))
        })
        .collect::<Result<Vec<_>>>()
        .map(ResponseGroup::new)
}

fn decode_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
