//! Minimal `{{ name }}` placeholder substitution.
//!
//! The console supplies the environment script as free-form shell text in
//! which `{{ name }}` refers to one of the bundle's template values. Only
//! plain substitution is supported; anything else between the braces is an
//! error rather than being passed through silently.

use std::collections::BTreeMap;

use thiserror::Error;

/// Named values available to placeholders.
pub type TemplateContext = BTreeMap<String, String>;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Replaces every `{{ name }}` in `template` with its value in `context`.
pub fn render_template(template: &str, context: &TemplateContext) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    let mut consumed = 0usize;
    while let Some(start) = rest.find(OPEN) {
        let (literal, tail) = rest.split_at(start);
        output.push_str(literal);
        let body_start = tail.get(OPEN.len()..).unwrap_or_default();
        let Some(end) = body_start.find(CLOSE) else {
            return Err(TemplateError::Unterminated {
                offset: consumed + start,
            });
        };
        let (body, after) = body_start.split_at(end);
        let name = body.trim();
        let value = context
            .get(name)
            .ok_or_else(|| TemplateError::UnknownPlaceholder {
                name: name.to_owned(),
            })?;
        output.push_str(value);
        let advanced = start + OPEN.len() + end + CLOSE.len();
        consumed += advanced;
        rest = after.get(CLOSE.len()..).unwrap_or_default();
    }
    output.push_str(rest);
    Ok(output)
}

/// Errors raised while rendering a template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder named a value the bundle does not provide.
    #[error("unknown template placeholder '{name}'")]
    UnknownPlaceholder {
        /// Placeholder name without braces.
        name: String,
    },
    /// An opening `{{` had no matching `}}`.
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated {
        /// Byte offset of the opening braces.
        offset: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TemplateContext {
        [("java64_home", "/opt/jdk"), ("log_dir", "/var/log/sidewinder")]
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect()
    }

    #[test]
    fn substitutes_placeholders_with_optional_spacing() {
        let rendered = render_template(
            "export JAVA_HOME={{java64_home}}\nexport LOG_DIR={{ log_dir }}\n",
            &context(),
        )
        .expect("template renders");
        assert_eq!(
            rendered,
            "export JAVA_HOME=/opt/jdk\nexport LOG_DIR=/var/log/sidewinder\n"
        );
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let text = "#!/bin/bash\nexport HEAP=\"-Xmx1g\"\n${VAR:-default}\n";
        assert_eq!(render_template(text, &context()).expect("renders"), text);
    }

    #[test]
    fn unknown_placeholder_fails() {
        let error = render_template("{{ missing }}", &context()).expect_err("must fail");
        assert_eq!(
            error,
            TemplateError::UnknownPlaceholder {
                name: String::from("missing"),
            }
        );
    }

    #[test]
    fn unterminated_placeholder_reports_offset() {
        let error =
            render_template("A={{log_dir}} B={{ java64_home", &context()).expect_err("must fail");
        assert_eq!(error, TemplateError::Unterminated { offset: 16 });
    }
}
