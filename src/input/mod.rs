//! Module input: question schemas and the answers users give to them
//!
//! A module may declare an input schema, an ordered list of questions.
//! Users answer the questions with an answer document (JSON), which is
//! validated against the schema and stored next to the manifest.
//!
//! ## Flow
//!
//! ```text
//! index schema ──► QuestionSpec ──► render() ──► prompts (info, external prompter)
//!                       │
//! set-input JSON ──► deserialize() ──► Answers ──► serialize() ──► inputs/<module>.json
//! ```
//!
//! `deserialize(serialize(x), schema) == x` for every valid `x`, and the
//! canonical text of a document never changes across a get/set cycle.

pub mod answers;
pub mod codec;
pub mod render;
pub mod schema;

pub use answers::{Answer, AnswerValue, Answers, ResponseGroup, Scalar};
pub use codec::{AnswerDocument, deserialize, serialize};
pub use render::{Prompt, PromptKind, render, skeleton};
pub use schema::{QuestionKind, QuestionSpec, RawQuestion, parse_schema};
