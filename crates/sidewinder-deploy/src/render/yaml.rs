use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::template::{TemplateContext, TemplateError, render_template};

/// First line of the rendered YAML document.
pub(crate) const YAML_HEADER: &str = "# Generated by sidewinder-agent; local edits are overwritten.";

/// Renders the opaque YAML block, substituting placeholders in string
/// scalars, as a YAML document.
///
/// The console delivers every value as a string, so scalars that read as an
/// integer, a float or `true`/`false` after substitution are emitted bare.
/// Text that would not survive the conversion unchanged, such as `08080`,
/// stays a string.
pub(crate) fn render_yaml_document(
    block: &Map<String, Value>,
    context: &TemplateContext,
) -> Result<String, YamlRenderError> {
    let mut tree = Value::Object(block.clone());
    substitute_scalars(&mut tree, context)?;
    let body = serde_saphyr::to_string(&tree).map_err(|error| YamlRenderError::Serialize {
        message: error.to_string(),
    })?;
    let mut document = String::with_capacity(YAML_HEADER.len() + body.len() + 1);
    document.push_str(YAML_HEADER);
    document.push('\n');
    document.push_str(&body);
    if !document.ends_with('\n') {
        document.push('\n');
    }
    Ok(document)
}

fn substitute_scalars(value: &mut Value, context: &TemplateContext) -> Result<(), TemplateError> {
    match value {
        Value::String(text) => {
            if text.contains("{{") {
                *text = render_template(text, context)?;
            }
            if let Some(typed) = typed_scalar(text) {
                *value = typed;
            }
            Ok(())
        }
        Value::Array(items) => items
            .iter_mut()
            .try_for_each(|item| substitute_scalars(item, context)),
        Value::Object(entries) => entries
            .values_mut()
            .try_for_each(|item| substitute_scalars(item, context)),
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
    }
}

fn typed_scalar(text: &str) -> Option<Value> {
    match text {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        _ => {}
    }
    let number = if let Ok(integer) = text.parse::<i64>() {
        Number::from(integer)
    } else if let Ok(unsigned) = text.parse::<u64>() {
        Number::from(unsigned)
    } else {
        text.parse::<f64>().ok().and_then(Number::from_f64)?
    };
    (number.to_string() == text).then_some(Value::Number(number))
}

/// Errors raised while rendering the YAML document.
#[derive(Debug, Error)]
pub enum YamlRenderError {
    /// A string scalar contained an invalid placeholder.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// The tree could not be serialised.
    #[error("failed to serialise YAML: {message}")]
    Serialize {
        /// Serialiser diagnostic.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn context() -> TemplateContext {
        [("hostname", "tsdb-1")]
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect()
    }

    fn block(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn substitutes_nested_placeholders() {
        let mut tree = json!({"server": {"hosts": ["{{hostname}}", "other"]}, "port": 8080});
        substitute_scalars(&mut tree, &context()).expect("substitution succeeds");
        assert_eq!(
            tree,
            json!({"server": {"hosts": ["tsdb-1", "other"]}, "port": 8080})
        );
    }

    #[test]
    fn renders_header_and_keys() {
        let document = render_yaml_document(
            &block(json!({"http_port": "8080", "server": {"bind": "{{ hostname }}"}})),
            &context(),
        )
        .expect("document renders");
        assert!(document.starts_with(YAML_HEADER));
        assert!(document.contains("http_port"));
        assert!(document.contains("tsdb-1"));
        assert!(!document.contains("{{"));
        assert!(document.ends_with('\n'));
    }

    #[test]
    fn numeric_strings_are_emitted_bare() {
        let document = render_yaml_document(
            &block(json!({"http_port": "8080", "ratio": "0.5", "auth": "false"})),
            &context(),
        )
        .expect("document renders");
        assert!(document.contains("http_port: 8080\n"), "{document}");
        assert!(document.contains("ratio: 0.5\n"), "{document}");
        assert!(document.contains("auth: false\n"), "{document}");
        assert!(!document.contains("\"8080\""), "{document}");
    }

    #[rstest]
    #[case("8080", Some(json!(8080)))]
    #[case("-3", Some(json!(-3)))]
    #[case("18446744073709551615", Some(json!(18_446_744_073_709_551_615_u64)))]
    #[case("2.5", Some(json!(2.5)))]
    #[case("true", Some(json!(true)))]
    #[case("08080", None)]
    #[case("1e3", None)]
    #[case("NaN", None)]
    #[case("True", None)]
    #[case("tsdb-1", None)]
    fn typed_scalars_round_trip_their_text(#[case] text: &str, #[case] expected: Option<Value>) {
        assert_eq!(typed_scalar(text), expected);
    }

    #[test]
    fn substituted_port_becomes_a_number() {
        let context: TemplateContext = [("http_port", "9090")]
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();
        let document = render_yaml_document(&block(json!({"port": "{{ http_port }}"})), &context)
            .expect("document renders");
        assert!(document.contains("port: 9090\n"), "{document}");
    }

    #[test]
    fn unknown_placeholder_fails() {
        let error = render_yaml_document(&block(json!({"a": "{{ nope }}"})), &context())
            .expect_err("unknown placeholder must fail");
        assert!(matches!(error, YamlRenderError::Template(_)));
    }
}
