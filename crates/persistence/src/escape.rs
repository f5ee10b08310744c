use std::borrow::Cow;

use crate::errors::PersistenceError;

/// Whether XML 1.0 can carry `c` at all, escaped or not.
pub fn is_xml_char(c: char) -> bool {
    !matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

/// Refuse text that cannot be written as XML and read back unchanged.
pub fn check_text(text: &str) -> Result<(), PersistenceError> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(character) => Err(PersistenceError::UnencodableText {
            text: text.to_string(),
            character,
        }),
        None => Ok(()),
    }
}

/// Escape free-form text for use inside a double-quoted XML attribute.
///
/// Line breaks and tabs are written as character references so that
/// attribute-value normalization on read does not turn them into spaces.
pub fn encode_attribute(value: &str) -> Cow<'_, str> {
    if !value
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>' | '"' | '\'' | '\n' | '\r' | '\t'))
    {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(encode_attribute("Face1"), Cow::Borrowed("Face1")));
    }

    #[test]
    fn control_characters_are_refused() {
        assert_eq!(
            check_text("a\u{1}b"),
            Err(PersistenceError::UnencodableText {
                text: "a\u{1}b".into(),
                character: '\u{1}'
            })
        );
        assert!(check_text("tab\tline\nreturn\r").is_ok());
        assert!(check_text("\u{ffff}").is_err());
        assert!(check_text("\u{10000}").is_ok());
    }

    #[test]
    fn markup_is_escaped() {
        assert_eq!(
            encode_attribute("a<b & \"c\"\n"),
            "a&lt;b &amp; &quot;c&quot;&#10;"
        );
    }
}
