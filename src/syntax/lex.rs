//! Lexical analysis of record and tuple literals

use super::Span;
use crate::error::SyntaxError;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag, take_while},
    character::complete::{char as match_char, digit1, one_of, satisfy},
    combinator::{cut, map, opt, recognize, value},
    error::{VerboseError, VerboseErrorKind, context},
    multi::fold_many0,
    sequence::{pair, preceded, terminated, tuple},
};
use nom_locate::LocatedSpan;
use std::fmt;
use unicode_categories::UnicodeCategories;

pub type Input<'a> = LocatedSpan<&'a str>;

type LexResult<'a, T> = IResult<Input<'a>, T, VerboseError<Input<'a>>>;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub lexeme: Lexeme,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    Identifier(String),
    /// Decimal digits. Kept as text until the parser knows whether they name
    /// a tuple position or an integer literal.
    Integer(String),
    Float(f64),
    String(String),
    Character(char),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    DoubleColon,
    Equals,
    Minus,
    Eof,
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(ident) => write!(f, "identifier `{ident}`"),
            Self::Integer(digits) => write!(f, "integer `{digits}`"),
            Self::Float(x) => write!(f, "number `{x:?}`"),
            Self::String(s) => write!(f, "string {s:?}"),
            Self::Character(c) => write!(f, "character {c:?}"),
            Self::LBrace => write!(f, "`{{`"),
            Self::RBrace => write!(f, "`}}`"),
            Self::LParen => write!(f, "`(`"),
            Self::RParen => write!(f, "`)`"),
            Self::Comma => write!(f, "`,`"),
            Self::DoubleColon => write!(f, "`::`"),
            Self::Equals => write!(f, "`=`"),
            Self::Minus => write!(f, "`-`"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// What a [`SyntaxError`] from [`lex`] expects when no token can start at
/// its span.
pub const ANY_TOKEN: &str = "a token";

/// Split `source` into tokens. The returned list always ends with
/// [`Lexeme::Eof`].
pub fn lex(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut input = Input::new(source);
    let mut tokens = Vec::new();
    loop {
        input = skip_whitespace(input);
        if input.fragment().is_empty() {
            tokens.push(Token {
                lexeme: Lexeme::Eof,
                span: span_between(input, input),
            });
            return Ok(tokens);
        }
        match lexeme(input) {
            Ok((rest, lexeme)) => {
                tokens.push(Token {
                    lexeme,
                    span: span_between(input, rest),
                });
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Err(unexpected(input, ANY_TOKEN)),
            Err(nom::Err::Failure(err)) => return Err(failure(input, err)),
            Err(nom::Err::Incomplete(_)) => return Err(unexpected(input, "a complete token")),
        }
    }
}

pub(crate) fn span_between(start: Input<'_>, end: Input<'_>) -> Span {
    Span::new(
        start.location_line(),
        start.get_utf8_column(),
        start.location_offset(),
        end.location_offset() - start.location_offset(),
    )
}

pub(crate) fn unexpected(at: Input<'_>, expected: &str) -> SyntaxError {
    let next = at.fragment().chars().next();
    let mut span = span_between(at, at);
    span.len = next.map_or(0, char::len_utf8);
    let found = next.map_or_else(|| "end of input".to_string(), |c| format!("`{c}`"));
    SyntaxError::new(span, expected, found)
}

fn failure<'a>(at: Input<'a>, err: VerboseError<Input<'a>>) -> SyntaxError {
    let location = err.errors.first().map_or(at, |(input, _)| *input);
    let expected = err
        .errors
        .iter()
        .find_map(|(_, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some(*ctx),
            _ => None,
        })
        .unwrap_or(ANY_TOKEN);
    unexpected(location, expected)
}

pub(crate) fn skip_whitespace(i: Input<'_>) -> Input<'_> {
    take_while::<_, _, VerboseError<Input<'_>>>(char::is_whitespace)(i).map_or(i, |(rest, _)| rest)
}

fn lexeme(i: Input<'_>) -> LexResult<'_, Lexeme> {
    alt((
        map(identifier, Lexeme::Identifier),
        number,
        map(string, Lexeme::String),
        map(character, Lexeme::Character),
        punctuation,
    ))(i)
}

fn punctuation(i: Input<'_>) -> LexResult<'_, Lexeme> {
    alt((
        value(Lexeme::DoubleColon, tag("::")),
        value(Lexeme::LBrace, match_char('{')),
        value(Lexeme::RBrace, match_char('}')),
        value(Lexeme::LParen, match_char('(')),
        value(Lexeme::RParen, match_char(')')),
        value(Lexeme::Comma, match_char(',')),
        value(Lexeme::Equals, match_char('=')),
        value(Lexeme::Minus, match_char('-')),
    ))(i)
}

pub(crate) fn identifier(i: Input<'_>) -> LexResult<'_, String> {
    map(
        recognize(pair(satisfy(is_initial), take_while(is_subsequent))),
        |ident: Input<'_>| ident.fragment().to_string(),
    )(i)
}

fn number(i: Input<'_>) -> LexResult<'_, Lexeme> {
    let (rest, text) = recognize(tuple((
        digit1,
        opt(pair(match_char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(i)?;
    let text = *text.fragment();
    if !text.contains(['.', 'e', 'E']) {
        return Ok((rest, Lexeme::Integer(text.to_string())));
    }
    match text.parse::<f64>() {
        Ok(x) => Ok((rest, Lexeme::Float(x))),
        Err(_) => Err(nom::Err::Failure(VerboseError {
            errors: vec![(i, VerboseErrorKind::Context("a floating point literal"))],
        })),
    }
}

enum Fragment<'a> {
    Unescaped(Input<'a>),
    Escaped(char),
}

fn string(i: Input<'_>) -> LexResult<'_, String> {
    preceded(
        match_char('"'),
        cut(terminated(
            fold_many0(
                alt((
                    map(
                        preceded(match_char('\\'), cut(context("an escape sequence", escape))),
                        Fragment::Escaped,
                    ),
                    map(is_not("\"\\"), Fragment::Unescaped),
                )),
                String::new,
                |mut output, fragment| {
                    match fragment {
                        Fragment::Unescaped(s) => output.push_str(s.fragment()),
                        Fragment::Escaped(c) => output.push(c),
                    }
                    output
                },
            ),
            context("closing `\"`", match_char('"')),
        )),
    )(i)
}

fn character(i: Input<'_>) -> LexResult<'_, char> {
    preceded(
        match_char('\''),
        cut(terminated(
            alt((
                preceded(match_char('\\'), cut(context("an escape sequence", escape))),
                context("a character", satisfy(|c| c != '\'' && c != '\\')),
            )),
            context("closing `'`", match_char('\'')),
        )),
    )(i)
}

fn escape(i: Input<'_>) -> LexResult<'_, char> {
    alt((
        value('\n', match_char('n')),
        value('\t', match_char('t')),
        value('\r', match_char('r')),
        value('\0', match_char('0')),
        value('\\', match_char('\\')),
        value('"', match_char('"')),
        value('\'', match_char('\'')),
    ))(i)
}

fn is_initial(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || (c as u32 > 127 && c.is_letter())
}

fn is_subsequent(c: char) -> bool {
    is_initial(c)
        || c.is_ascii_digit()
        || c == '\''
        || c.is_number_decimal_digit()
        || c.is_mark_nonspacing()
        || c.is_mark_spacing_combining()
}
