//! `{{ variable }}` expansion for templated files
//!
//! Placeholders are replaced with the module's own answers. Text without a
//! closing `}}` is copied as is.

use crate::error::{CfError, Result};
use crate::input::Answers;

/// Expand every placeholder in `text`
///
/// # Errors
///
/// `UnresolvedVariable` for a placeholder the module has no answer for.
pub fn expand(module: &str, text: &str, answers: &Answers) -> Result<String> {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            break;
        };

        output.push_str(&rest[..start]);
        let variable = after_open[..end].trim();
        let value = answers
            .get(variable)
            .ok_or_else(|| CfError::UnresolvedVariable {
                module: module.to_string(),
                variable: variable.to_string(),
            })?;
        output.push_str(&value.to_template_text());

        rest = &after_open[end + 2..];
    }

    output.push_str(rest);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Answer, AnswerValue, ResponseGroup};

    fn answers() -> Answers {
        Answers::new(vec![
            Answer::new("motd", AnswerValue::string("Welcome")),
            Answer::new("enabled", AnswerValue::boolean(true)),
            Answer::new(
                "files",
                AnswerValue::List(vec![ResponseGroup::new(vec![Answer::new(
                    "path",
                    AnswerValue::string("/tmp/a"),
                )])]),
            ),
        ])
    }

    #[test]
    fn test_expand_scalars_and_lists() {
        let text = "msg={{ motd }} on={{enabled}} files={{ files }}\n";
        assert_eq!(
            expand("m", text, &answers()).unwrap(),
            "msg=Welcome on=true files=[{\"path\":\"/tmp/a\"}]\n"
        );
    }

    #[test]
    fn test_undefined_variable() {
        let result = expand("m", "{{ missing }}", &answers());
        let Err(CfError::UnresolvedVariable { module, variable }) = result else {
            panic!("expected unresolved variable");
        };
        assert_eq!((module.as_str(), variable.as_str()), ("m", "missing"));
    }

    #[test]
    fn test_unclosed_placeholder_is_literal() {
        assert_eq!(expand("m", "a {{ motd", &answers()).unwrap(), "a {{ motd");
        assert_eq!(expand("m", "no placeholders", &Answers::default()).unwrap(), "no placeholders");
    }
}
