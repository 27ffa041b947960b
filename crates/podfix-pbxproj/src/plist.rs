//! OpenStep property list values and parser.
//!
//! `project.pbxproj` uses the old-style (NeXTSTEP) property list syntax:
//!
//! - String:     `Runner`, `"$(inherited)"`
//! - Array:      `( element, ... )`
//! - Dictionary: `{ key = value; ... }`
//!
//! `//` line comments and `/* */` block comments may appear between any two
//! tokens. Xcode never writes the `<hex>` data type into project files, so it
//! is not accepted here.

use std::collections::BTreeMap;

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_until, take_while1};
use nom::character::complete::{char, multispace1};
use nom::combinator::{all_consuming, cut, map, opt, recognize, value};
use nom::error::{Error, ErrorKind};
use nom::multi::{fold_many0, many0};
use nom::sequence::{delimited, pair, preceded, separated_pair, terminated};
use nom::{IResult, Parser};

/// Dictionary keyed by string. Iteration is sorted, matching the key order
/// Xcode uses when it writes dictionaries.
pub type Dictionary = BTreeMap<String, Value>;

/// A property list value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Array(Vec<Value>),
    Dictionary(Dictionary),
}

impl Value {
    /// Returns the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Location and description of a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line number where parsing stopped.
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Parses a complete property list document.
///
/// Leading and trailing comments (including the `// !$*UTF8*$!` header Xcode
/// writes) are skipped. Anything other than trivia after the top-level value
/// is an error.
///
/// ```
/// use podfix_pbxproj::plist::{parse, Value};
///
/// let value = parse("// !$*UTF8*$!\n{ name = Runner; list = (a, \"b c\",); }").unwrap();
/// let dict = value.as_dictionary().unwrap();
/// assert_eq!(dict["name"], Value::from("Runner"));
/// assert_eq!(dict["list"].as_array().unwrap().len(), 2);
/// ```
pub fn parse(input: &str) -> Result<Value, SyntaxError> {
    match all_consuming(terminated(value_parser, trivia)).parse(input) {
        Ok((_, value)) => Ok(value),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(syntax_error(input, e)),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError {
            line: input.lines().count().max(1),
            message: "unexpected end of input".to_string(),
        }),
    }
}

fn syntax_error(source: &str, error: Error<&str>) -> SyntaxError {
    let offset = source.len() - error.input.len();
    let line = source[..offset].matches('\n').count() + 1;
    let near: String = error
        .input
        .chars()
        .take_while(|c| *c != '\n')
        .take(24)
        .collect();
    let message = match (error.code, near.is_empty()) {
        (ErrorKind::Escaped, _) => "invalid \\U escape in quoted string".to_string(),
        (_, true) => "unexpected end of input".to_string(),
        (_, false) => format!("unexpected input near `{near}`"),
    };
    SyntaxError { line, message }
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), opt(is_not("\r\n")))).parse(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize((tag("/*"), take_until("*/"), tag("*/"))).parse(input)
}

/// Whitespace and comments.
fn trivia(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, line_comment, block_comment)))).parse(input)
}

fn value_parser(input: &str) -> IResult<&str, Value> {
    preceded(
        trivia,
        alt((
            map(dictionary, Value::Dictionary),
            map(array, Value::Array),
            map(string, Value::String),
        )),
    )
    .parse(input)
}

fn dictionary(input: &str) -> IResult<&str, Dictionary> {
    delimited(
        char('{'),
        fold_many0(
            entry,
            Dictionary::new,
            |mut dict: Dictionary, (key, value): (String, Value)| {
                dict.insert(key, value);
                dict
            },
        ),
        preceded(trivia, char('}')),
    )
    .parse(input)
}

/// `key = value;`. Once the `=` is seen the entry must complete, so errors
/// point at the bad value instead of the enclosing dictionary.
fn entry(input: &str) -> IResult<&str, (String, Value)> {
    terminated(
        separated_pair(
            preceded(trivia, string),
            preceded(trivia, char('=')),
            cut(value_parser),
        ),
        cut(preceded(trivia, char(';'))),
    )
    .parse(input)
}

fn array(input: &str) -> IResult<&str, Vec<Value>> {
    delimited(
        char('('),
        many0(terminated(value_parser, opt(preceded(trivia, char(','))))),
        preceded(trivia, char(')')),
    )
    .parse(input)
}

fn string(input: &str) -> IResult<&str, String> {
    alt((quoted_string, bare_string)).parse(input)
}

/// Characters allowed in an unquoted string.
pub(crate) fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.' | '-' | '+')
}

fn bare_string(input: &str) -> IResult<&str, String> {
    map(take_while1(is_bare_char), |s: &str| s.to_string()).parse(input)
}

fn quoted_string(input: &str) -> IResult<&str, String> {
    let Some(body) = input.strip_prefix('"') else {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Char)));
    };

    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => return Ok((&body[offset + 1..], out)),
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    break;
                };
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'U' => {
                        let hex: String = chars.by_ref().take(4).map(|(_, h)| h).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(decoded) => out.push(decoded),
                            None => {
                                return Err(nom::Err::Failure(Error::new(
                                    &body[offset..],
                                    ErrorKind::Escaped,
                                )));
                            }
                        }
                    }
                    other => out.push(other),
                }
            }
            other => out.push(other),
        }
    }

    // Unterminated string: report from the opening quote.
    Err(nom::Err::Failure(Error::new(input, ErrorKind::Char)))
}
