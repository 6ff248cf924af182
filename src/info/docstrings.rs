// Docstring literal decoding and summary lines

/// Decode a Python string literal as written in source into its text
///
/// Handles `r`/`u`/`b`/`f` prefixes (in any combination), triple and single quotes, and the
/// usual escape sequences. Raw literals keep backslashes as written. Unknown escapes are kept.
pub fn decode_string_literal(literal: &str) -> String {
    let quote_at = literal.find(['\'', '"']).unwrap_or(0);
    let (prefix, quoted) = literal.split_at(quote_at);
    let body = strip_quotes(quoted);

    if prefix.contains(['r', 'R']) {
        body.to_string()
    } else {
        unescape(body)
    }
}

fn strip_quotes(quoted: &str) -> &str {
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if quoted.len() >= 2 * quote.len() && quoted.starts_with(quote) && quoted.ends_with(quote)
        {
            return &quoted[quote.len()..quoted.len() - quote.len()];
        }
    }
    quoted
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        match escape {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0B}'),
            '0'..='7' => {
                let mut digits = escape.to_string();
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' | 'u' | 'U' => {
                let width = match escape {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars
                    .clone()
                    .take(width)
                    .take_while(char::is_ascii_hexdigit)
                    .collect();
                let decoded = if digits.len() == width {
                    u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
                } else {
                    None
                };
                match decoded {
                    Some(decoded) => {
                        out.push(decoded);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(escape);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

/// First line of `text`, after trimming whitespace and surrounding quote characters
pub fn summary_line(text: &str) -> String {
    let trimmed = text.trim().trim_matches(['"', '\'']).trim();
    trimmed.lines().next().unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_styles() {
        assert_eq!(decode_string_literal("\"\"\"Triple.\"\"\""), "Triple.");
        assert_eq!(decode_string_literal("'''Single triple.'''"), "Single triple.");
        assert_eq!(decode_string_literal("\"plain\""), "plain");
        assert_eq!(decode_string_literal("'plain'"), "plain");
        assert_eq!(decode_string_literal("''"), "");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(decode_string_literal(r#""tab\there""#), "tab\there");
        assert_eq!(decode_string_literal(r#""quote \" and \\""#), "quote \" and \\");
        assert_eq!(decode_string_literal(r#""\x41\101é""#), "AAé");
        assert_eq!(decode_string_literal("\"joined \\\nline\""), "joined line");
        assert_eq!(
            decode_string_literal(r#""keep \d unknown""#),
            "keep \\d unknown"
        );
        assert_eq!(decode_string_literal(r#""short \x4""#), "short \\x4");
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(decode_string_literal(r#"r"raw \n text""#), "raw \\n text");
        assert_eq!(decode_string_literal(r#"Rb'raw bytes \t'"#), "raw bytes \\t");
        assert_eq!(decode_string_literal(r#"u"unicode \n""#), "unicode \n");
        assert_eq!(decode_string_literal(r#"f"{value}""#), "{value}");
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(summary_line("First line.\n\nMore detail."), "First line.");
        assert_eq!(summary_line("  \"Quoted summary\"  "), "Quoted summary");
        assert_eq!(summary_line("single"), "single");
        assert_eq!(summary_line(""), "");
    }
}
