//! Tokenizer for the text interchange format.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, one_of},
    combinator::{opt, recognize},
    sequence::{pair, preceded, tuple},
    IResult,
};
use trellis_core::ParseError;

/// Parse an identifier (starts with letter/underscore, followed by alphanumeric/underscore/hyphen).
pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    ))(input)
}

/// Whether all of `text` lexes as one identifier.
pub fn is_identifier(text: &str) -> bool {
    matches!(identifier(text), Ok(("", _)))
}

/// Recognize a decimal number, optionally negative, with optional fraction
/// and exponent. Positive `inf` and `NaN` lex as identifiers.
pub fn number(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(tuple((
            opt(char('-')),
            take_while1(|c: char| c.is_ascii_digit()),
            opt(pair(char('.'), take_while1(|c: char| c.is_ascii_digit()))),
            opt(tuple((one_of("eE"), opt(one_of("+-")), take_while1(|c: char| c.is_ascii_digit())))),
        ))),
        tag("-inf"),
    ))(input)
}

/// `#` followed by hex digits or a decimal id.
pub fn hash(input: &str) -> IResult<&str, &str> {
    preceded(char('#'), take_while1(|c: char| c.is_ascii_alphanumeric()))(input)
}

/// `@` followed by an identifier.
pub fn at_keyword(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), identifier)(input)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tok<'a> {
    Ident(&'a str),
    Number(&'a str),
    Hash(&'a str),
    At(&'a str),
    Str(String),
    Symbol(char),
}

impl Tok<'_> {
    pub fn describe(&self) -> String {
        match self {
            Tok::Ident(s) => s.to_string(),
            Tok::Number(s) => s.to_string(),
            Tok::Hash(s) => format!("#{s}"),
            Tok::At(s) => format!("@{s}"),
            Tok::Str(s) => format!("{s:?}"),
            Tok::Symbol(c) => c.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub tok: Tok<'a>,
    pub line: u32,
    pub column: u32,
}

/// Splits the whole input into tokens, skipping whitespace and `//` comments.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = input;
    let mut line = 1u32;
    let mut column = 1u32;

    // Moves past `consumed`, which must be a prefix of `rest`.
    fn advance<'a>(rest: &mut &'a str, consumed: usize, line: &mut u32, column: &mut u32) {
        for c in rest[..consumed].chars() {
            if c == '\n' {
                *line += 1;
                *column = 1;
            } else {
                *column += 1;
            }
        }
        *rest = &rest[consumed..];
    }

    loop {
        let trimmed = rest.trim_start();
        let skipped = rest.len() - trimmed.len();
        advance(&mut rest, skipped, &mut line, &mut column);

        if rest.starts_with("//") {
            let end = rest.find('\n').unwrap_or(rest.len());
            advance(&mut rest, end, &mut line, &mut column);
            continue;
        }

        let Some(first) = rest.chars().next() else {
            break;
        };
        let (start_line, start_column) = (line, column);

        let (tok, consumed) = if first == '"' {
            let (value, consumed) = string_literal(rest).ok_or(ParseError::UnterminatedString {
                line: start_line,
                column: start_column,
            })?;
            (Tok::Str(value), consumed)
        } else if let Some((after, text)) = (first == '-' || first.is_ascii_digit())
            .then(|| number(rest).ok())
            .flatten()
        {
            (Tok::Number(text), rest.len() - after.len())
        } else if let Ok((after, text)) = identifier(rest) {
            (Tok::Ident(text), rest.len() - after.len())
        } else if let Ok((after, text)) = hash(rest) {
            (Tok::Hash(text), rest.len() - after.len())
        } else if let Ok((after, text)) = at_keyword(rest) {
            (Tok::At(text), rest.len() - after.len())
        } else if "{}:;=(),%".contains(first) {
            (Tok::Symbol(first), first.len_utf8())
        } else {
            return Err(ParseError::UnexpectedToken {
                found: first.to_string(),
                expected: "a token".to_string(),
                line: start_line,
                column: start_column,
            });
        };

        tokens.push(Token { tok, line: start_line, column: start_column });
        advance(&mut rest, consumed, &mut line, &mut column);
    }

    Ok(tokens)
}

/// Decode a quoted string starting at `input[0] == '"'`.
///
/// Returns the value and the number of bytes consumed, or `None` when the
/// closing quote is missing or an escape is malformed.
fn string_literal(input: &str) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = input.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, i + 1)),
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    '"' => value.push('"'),
                    '\\' => value.push('\\'),
                    'u' => {
                        // \u{XXXX}
                        if chars.next()?.1 != '{' {
                            return None;
                        }
                        let mut code = String::new();
                        loop {
                            let (_, d) = chars.next()?;
                            if d == '}' {
                                break;
                            }
                            code.push(d);
                        }
                        value.push(char::from_u32(u32::from_str_radix(&code, 16).ok()?)?);
                    }
                    _ => return None,
                }
            }
            c => value.push(c),
        }
    }
    None
}

/// Quote a string so [`tokenize`] reads it back unchanged.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Tok<'_>> {
        tokenize(input).unwrap().into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(number("12.5;"), Ok((";", "12.5")));
        assert_eq!(number("-0 "), Ok((" ", "-0")));
        assert_eq!(number("1e-7"), Ok(("", "1e-7")));
        assert_eq!(number("-inf"), Ok(("", "-inf")));
        assert!(number("abc").is_err());
    }

    #[test]
    fn test_tokenize_node_line() {
        assert_eq!(
            kinds("Row #1 { width: 50%; }"),
            vec![
                Tok::Ident("Row"),
                Tok::Hash("1"),
                Tok::Symbol('{'),
                Tok::Ident("width"),
                Tok::Symbol(':'),
                Tok::Number("50"),
                Tok::Symbol('%'),
                Tok::Symbol(';'),
                Tok::Symbol('}'),
            ]
        );
    }

    #[test]
    fn test_positions_and_comments() {
        let tokens = tokenize("// header\n  Text #2 = \"hi\";").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (2, 3));
        assert_eq!(tokens[3].tok, Tok::Str("hi".to_string()));
        assert_eq!((tokens[3].line, tokens[3].column), (2, 13));
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            tokenize("Text #1 = \"oops"),
            Err(ParseError::UnterminatedString { line: 1, column: 11 })
        );
    }

    #[test]
    fn test_quote_round_trips() {
        let original = "say \"hi\"\n\ttab \\ bell\u{7}";
        let quoted = quote(original);
        assert_eq!(kinds(&quoted), vec![Tok::Str(original.to_string())]);
    }

    #[test]
    fn test_kebab_identifiers() {
        assert_eq!(kinds("space-between"), vec![Tok::Ident("space-between")]);
    }
}
