//! The quote-aware comma tokenizer shared by the contact ingestor and
//! the universal row parser, plus the matching field serializer.
//!
//! Contract: commas delimit fields outside a quoted span, `"` toggles
//! the quoted span, `""` inside a span is a literal quote, and every
//! field is trimmed after unquoting.

/// Split one line into trimmed fields.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                // Escaped literal quote.
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Quote a field for CSV output, doubling embedded quotes.
///
/// Every field is quoted unconditionally so the output survives commas,
/// quotes, and leading/trailing spaces without per-field sniffing.
pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        assert_eq!(split_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_fields_are_trimmed() {
        assert_eq!(split_line("  a , b  ,c "), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_fields_preserved() {
        assert_eq!(split_line(",x,"), vec!["", "x", ""]);
        assert_eq!(split_line(","), vec!["", ""]);
    }

    #[test]
    fn test_quoted_comma() {
        assert_eq!(split_line("\"a,b\",c"), vec!["a,b", "c"]);
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(split_line("\"say \"\"hi\"\"\",x"), vec!["say \"hi\"", "x"]);
    }

    #[test]
    fn test_single_field() {
        assert_eq!(split_line("alone"), vec!["alone"]);
    }

    #[test]
    fn test_quote_field_wraps_and_escapes() {
        assert_eq!(quote_field("plain"), "\"plain\"");
        assert_eq!(quote_field("a,b"), "\"a,b\"");
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field(""), "\"\"");
    }

    #[test]
    fn test_quote_then_split_round_trips() {
        for value in ["plain", "a,b", "say \"hi\"", "x\"\"y"] {
            let fields = split_line(&quote_field(value));
            assert_eq!(fields, vec![value.to_string()], "value: {value}");
        }
    }
}
