//! Minimal comma-separated text codec.
//!
//! Writes with minimal quoting (fields containing a comma, quote, CR or LF
//! are quoted, quotes doubled). Reads both LF and CRLF line endings, quoted
//! fields spanning lines, and a leading UTF-8 byte-order mark. Blank lines
//! are skipped.

/// A parsed row together with the one-based line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// Line number of the first character of the row.
    pub line: usize,
    /// Unquoted field values.
    pub fields: Vec<String>,
}

/// A syntax error in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// One-based line number.
    pub line: usize,
    /// Description of the problem.
    pub message: String,
}

/// Quote a single field if needed.
#[must_use]
pub fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Encode one row, including the trailing newline.
#[must_use]
pub fn encode_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| quote(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Parse a whole document into rows.
///
/// # Errors
///
/// Returns a [`SyntaxError`] for a quote in the middle of an unquoted field,
/// stray text after a closing quote, or an unterminated quoted field.
pub fn parse(text: &str) -> Result<Vec<ParsedRow>, SyntaxError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut line = 1usize;
    let mut row_start = 1usize;
    let mut in_quotes = false;
    // Set after a closing quote until the next separator.
    let mut after_quote = false;
    // Whether the current row has any content at all.
    let mut row_dirty = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    in_quotes = false;
                    after_quote = true;
                }
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            ',' => {
                fields.push(std::mem::take(&mut field));
                after_quote = false;
                row_dirty = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                if row_dirty || !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                    rows.push(ParsedRow {
                        line: row_start,
                        fields: std::mem::take(&mut fields),
                    });
                }
                after_quote = false;
                row_dirty = false;
                line += 1;
                row_start = line;
            }
            '"' if field.is_empty() && !after_quote => {
                in_quotes = true;
                row_dirty = true;
            }
            '"' => {
                return Err(SyntaxError {
                    line,
                    message: "unexpected quote inside unquoted field".to_string(),
                });
            }
            _ if after_quote => {
                return Err(SyntaxError {
                    line,
                    message: "unexpected text after closing quote".to_string(),
                });
            }
            _ => {
                field.push(ch);
                row_dirty = true;
            }
        }
    }

    if in_quotes {
        return Err(SyntaxError {
            line: row_start,
            message: "unterminated quoted field".to_string(),
        });
    }
    if row_dirty || !field.is_empty() {
        fields.push(field);
        rows.push(ParsedRow {
            line: row_start,
            fields,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(rows: &[ParsedRow]) -> Vec<Vec<&str>> {
        rows.iter()
            .map(|r| r.fields.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("Ana Cruz"), "Ana Cruz");
        assert_eq!(quote(""), "");
    }

    #[test]
    fn test_quote_special() {
        assert_eq!(quote("Cruz, Ana"), "\"Cruz, Ana\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_encode_row() {
        assert_eq!(encode_row(&["1", "a,b", ""]), "1,\"a,b\",\n");
    }

    #[test]
    fn test_parse_simple() {
        let rows = parse("id,name\n1,Ana\n2,Ben\n").unwrap();
        assert_eq!(
            fields(&rows),
            vec![vec!["id", "name"], vec!["1", "Ana"], vec!["2", "Ben"]]
        );
        assert_eq!(rows[2].line, 3);
    }

    #[test]
    fn test_parse_crlf_and_missing_trailing_newline() {
        let rows = parse("id,name\r\n1,Ana\r\n2,Ben").unwrap();
        assert_eq!(fields(&rows).len(), 3);
        assert_eq!(rows[2].fields, vec!["2", "Ben"]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let rows = parse("1,\"Cruz, Ana\",\"said \"\"ok\"\"\"\n").unwrap();
        assert_eq!(
            fields(&rows),
            vec![vec!["1", "Cruz, Ana", "said \"ok\""]]
        );
    }

    #[test]
    fn test_parse_multiline_field_tracks_lines() {
        let rows = parse("h\n1,\"a\nb\"\n2,c\n").unwrap();
        assert_eq!(rows[1].fields, vec!["1", "a\nb"]);
        assert_eq!(rows[1].line, 2);
        assert_eq!(rows[2].line, 4);
    }

    #[test]
    fn test_parse_trailing_empty_field() {
        let rows = parse("1,Present,\n").unwrap();
        assert_eq!(rows[0].fields, vec!["1", "Present", ""]);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let rows = parse("a\n\n\nb\n").unwrap();
        assert_eq!(fields(&rows), vec![vec!["a"], vec!["b"]]);
        assert_eq!(rows[1].line, 4);
    }

    #[test]
    fn test_parse_strips_bom() {
        let rows = parse("\u{feff}id,name\n").unwrap();
        assert_eq!(rows[0].fields[0], "id");
    }

    #[test]
    fn test_parse_unterminated_quote() {
        let err = parse("id\n\"open\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_parse_stray_quote() {
        let err = parse("ab\"c\n").unwrap_err();
        assert!(err.message.contains("unexpected quote"));
    }

    #[test]
    fn test_parse_text_after_closing_quote() {
        let err = parse("\"ab\"c\n").unwrap_err();
        assert!(err.message.contains("after closing quote"));
    }

    #[test]
    fn test_encode_then_parse_preserves_awkward_values() {
        let values = ["3", "O'Neil, \"Jo\"", "line one\r\nline two", ""];
        let rows = parse(&encode_row(&values)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields, values);
    }
}
