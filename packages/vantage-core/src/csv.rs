//! CSV row tokenizer for the published sheet export.
//!
//! Small on purpose: the sheet export is a single known shape and the
//! parser has to match its quoting rules exactly, including graceful
//! handling of unbalanced quotes.

/// Split one comma-separated line into trimmed fields.
///
/// A double quote toggles quoted mode; `""` inside a quoted field
/// decodes to one literal quote; commas split only outside quotes.
/// Never fails: an unbalanced quote swallows the rest of the line into
/// the open field.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn splits_plain_fields() {
        assert_eq!(parse_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_line(" a , b "), vec!["a", "b"]);
    }

    #[test]
    fn quoted_commas_survive_the_split() {
        let line = r#""HB 1234","An act relating to ""dental"" care",Penner,Finance,2025,In Committee"#;
        assert_eq!(
            parse_line(line),
            vec![
                "HB 1234",
                r#"An act relating to "dental" care"#,
                "Penner",
                "Finance",
                "2025",
                "In Committee",
            ]
        );
    }

    #[test]
    fn empty_fields_are_preserved() {
        assert_eq!(parse_line("a,,c"), vec!["a", "", "c"]);
        assert_eq!(parse_line(""), vec![""]);
        assert_eq!(parse_line(","), vec!["", ""]);
    }

    #[test]
    fn unbalanced_quote_degrades_to_one_field() {
        assert_eq!(parse_line(r#"a,"bc,def"#), vec!["a", "bc,def"]);
    }

    fn serialize(fields: &[String]) -> String {
        fields
            .iter()
            .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(",")
    }

    proptest! {
        #[test]
        fn round_trips_standard_escaping(fields in proptest::collection::vec("[ -~]{0,20}", 1..8)) {
            let parsed = parse_line(&serialize(&fields));
            let expected: Vec<String> = fields.iter().map(|f| f.trim().to_string()).collect();
            prop_assert_eq!(parsed, expected);
        }
    }
}
