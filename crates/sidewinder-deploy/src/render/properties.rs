use crate::merge::MergedProperties;

/// First line of every rendered properties file.
pub(crate) const PROPERTIES_HEADER: &str = "# Generated by sidewinder-agent; local edits are overwritten.";

/// Serialises properties as `key=value` lines in sorted key order.
///
/// Keys and values are escaped the way `java.util.Properties` reads them
/// back, so a value can never start a new entry.
pub(crate) fn render_properties(properties: &MergedProperties) -> String {
    let mut output = String::with_capacity(PROPERTIES_HEADER.len() + properties.len() * 32);
    output.push_str(PROPERTIES_HEADER);
    output.push('\n');
    for (key, value) in properties.iter() {
        push_escaped(&mut output, key, Position::Key);
        output.push('=');
        push_escaped(&mut output, value, Position::Value);
        output.push('\n');
    }
    output
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Position {
    Key,
    Value,
}

fn push_escaped(output: &mut String, text: &str, position: Position) {
    for (index, character) in text.chars().enumerate() {
        match character {
            '\\' => output.push_str(r"\\"),
            '\n' => output.push_str(r"\n"),
            '\r' => output.push_str(r"\r"),
            '\t' => output.push_str(r"\t"),
            '\u{c}' => output.push_str(r"\f"),
            ' ' if index == 0 || position == Position::Key => output.push_str(r"\ "),
            '=' | ':' | '#' | '!' if position == Position::Key => {
                output.push('\\');
                output.push(character);
            }
            other => output.push(other),
        }
    }
}
