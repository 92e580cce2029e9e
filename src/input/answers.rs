//! Answers to a module's questions
//!
//! Answers are kept in schema order so serialization is deterministic.

use serde_json::Value;

/// A single answered value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    String(String),
    Bool(bool),
}

impl Scalar {
    pub fn to_json(&self) -> Value {
        match self {
            Scalar::String(s) => Value::String(s.clone()),
            Scalar::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Answer to one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Scalar(Scalar),
    /// One group per repetition of a list question
    List(Vec<ResponseGroup>),
}

impl AnswerValue {
    pub fn string(value: impl Into<String>) -> Self {
        AnswerValue::Scalar(Scalar::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        AnswerValue::Scalar(Scalar::Bool(value))
    }

    pub fn to_json(&self) -> Value {
        match self {
            AnswerValue::Scalar(scalar) => scalar.to_json(),
            AnswerValue::List(groups) => {
                Value::Array(groups.iter().map(ResponseGroup::to_json).collect())
            }
        }
    }

    /// Text substituted for `{{ key }}` in templated files
    pub fn to_template_text(&self) -> String {
        match self {
            AnswerValue::Scalar(Scalar::String(s)) => s.clone(),
            AnswerValue::Scalar(Scalar::Bool(b)) => b.to_string(),
            AnswerValue::List(_) => self.to_json().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub key: String,
    pub value: AnswerValue,
}

impl Answer {
    pub fn new(key: impl Into<String>, value: AnswerValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Answers to the sub-questions of one list repetition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseGroup {
    pub answers: Vec<Answer>,
}

impl ResponseGroup {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self { answers }
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.iter().find(|a| a.key == key).map(|a| &a.value)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.answers
                .iter()
                .map(|a| (a.key.clone(), a.value.to_json()))
                .collect(),
        )
    }
}

/// All answers for one module, in schema order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Answers {
    pub answers: Vec<Answer>,
}

impl Answers {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self { answers }
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.iter().find(|a| a.key == key).map(|a| &a.value)
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
