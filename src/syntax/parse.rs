use super::{
    Span,
    lex::{self, Input, Lexeme, Token},
};
use crate::{
    ast::{ExprAst, FieldAst, Literal, PathAst, RecordTypeAst, RecordValueAst, Segment, TypeAst},
    error::SyntaxError,
    types::FieldName,
};
use nom::{
    character::complete::{char as match_char, digit1},
    error::VerboseError,
};
use ordered_float::OrderedFloat;
use std::collections::HashSet;

/// Limits applied while parsing a single literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Deepest nesting of braces and parentheses accepted.
    pub max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

pub fn parse_record_type(text: &str) -> Result<RecordTypeAst, SyntaxError> {
    parse_record_type_with(text, &ParseConfig::default())
}

pub fn parse_record_type_with(
    text: &str,
    config: &ParseConfig,
) -> Result<RecordTypeAst, SyntaxError> {
    let mut parser = Parser::new(text, config)?;
    let ty = parser.record_type()?;
    parser.finish(ty)
}

pub fn parse_record_value(text: &str) -> Result<RecordValueAst, SyntaxError> {
    parse_record_value_with(text, &ParseConfig::default())
}

pub fn parse_record_value_with(
    text: &str,
    config: &ParseConfig,
) -> Result<RecordValueAst, SyntaxError> {
    let mut parser = Parser::new(text, config)?;
    let value = parser.record_value()?;
    parser.finish(value)
}

/// Parse any type expression: a named type, a record type or a tuple type.
pub fn parse_type(text: &str) -> Result<TypeAst, SyntaxError> {
    parse_type_with(text, &ParseConfig::default())
}

pub fn parse_type_with(text: &str, config: &ParseConfig) -> Result<TypeAst, SyntaxError> {
    let mut parser = Parser::new(text, config)?;
    let ty = parser.ty()?;
    parser.finish(ty)
}

/// Parse any value expression: a primitive literal, a record or a tuple.
pub fn parse_expr(text: &str) -> Result<ExprAst, SyntaxError> {
    parse_expr_with(text, &ParseConfig::default())
}

pub fn parse_expr_with(text: &str, config: &ParseConfig) -> Result<ExprAst, SyntaxError> {
    let mut parser = Parser::new(text, config)?;
    let expr = parser.expr()?;
    parser.finish(expr)
}

/// Parse a dot separated lens path such as `birthday.year` or `2.1`.
///
/// Whitespace is allowed around the path but not inside it.
pub fn parse_lens_path(text: &str) -> Result<PathAst, SyntaxError> {
    let mut input = lex::skip_whitespace(Input::new(text));
    let mut segments = Vec::new();
    loop {
        let (rest, segment) = path_segment(input)?;
        segments.push(segment);
        input = rest;
        match match_char::<_, VerboseError<Input<'_>>>('.')(input) {
            Ok((rest, _)) => input = rest,
            Err(_) => break,
        }
    }
    if !lex::skip_whitespace(input).fragment().is_empty() {
        return Err(lex::unexpected(input, "`.` or end of path"));
    }
    Ok(PathAst { segments })
}

fn path_segment(input: Input<'_>) -> Result<(Input<'_>, Segment), SyntaxError> {
    if let Ok((rest, label)) = lex::identifier(input) {
        let segment = Segment {
            name: FieldName::label(label),
            span: lex::span_between(input, rest),
        };
        return Ok((rest, segment));
    }
    if let Ok((rest, digits)) = digit1::<_, VerboseError<Input<'_>>>(input) {
        let span = lex::span_between(input, rest);
        let segment = Segment {
            name: FieldName::Position(position(digits.fragment(), span)?),
            span,
        };
        return Ok((rest, segment));
    }
    Err(lex::unexpected(input, "a field name or tuple position"))
}

fn position(digits: &str, span: Span) -> Result<u32, SyntaxError> {
    if digits.starts_with('0') {
        return Err(SyntaxError::new(
            span,
            "a tuple position counted from 1 without leading zeros",
            format!("`{digits}`"),
        ));
    }
    digits.parse().map_err(|_| {
        SyntaxError::new(
            span,
            "a tuple position that fits in 32 bits",
            format!("`{digits}`"),
        )
    })
}

/// Recursive descent over the tokens of one literal.
pub struct Parser {
    /// We only ever push back a single token, but a stack keeps this simple.
    lookahead: Vec<Token>,
    tokens: std::vec::IntoIter<Token>,
    eof: Span,
    depth: usize,
    max_depth: usize,
}

macro_rules! token {
    ( $pattern:pat ) => {
        Token {
            lexeme: $pattern,
            ..
        }
    };
    ( $pattern:pat, $span:pat ) => {
        Token {
            lexeme: $pattern,
            span: $span,
        }
    };
}

impl Parser {
    pub fn new(source: &str, config: &ParseConfig) -> Result<Self, SyntaxError> {
        let tokens = lex::lex(source)?;
        let eof = tokens.last().map_or_else(Span::default, |token| token.span);
        Ok(Self {
            lookahead: Vec::new(),
            tokens: tokens.into_iter(),
            eof,
            depth: 0,
            max_depth: config.max_depth,
        })
    }

    fn next_token(&mut self) -> Token {
        self.lookahead
            .pop()
            .or_else(|| self.tokens.next())
            .unwrap_or(Token {
                lexeme: Lexeme::Eof,
                span: self.eof,
            })
    }

    fn return_token(&mut self, token: Token) {
        self.lookahead.push(token)
    }

    fn expect(&mut self, lexeme: Lexeme, expected: &str) -> Result<Span, SyntaxError> {
        let token = self.next_token();
        if token.lexeme == lexeme {
            Ok(token.span)
        } else {
            Err(unexpected(token, expected))
        }
    }

    /// Require that nothing follows the parsed literal.
    pub fn finish<T>(&mut self, parsed: T) -> Result<T, SyntaxError> {
        match self.next_token() {
            token!(Lexeme::Eof) => Ok(parsed),
            token => Err(unexpected(token, "end of input")),
        }
    }

    fn enter(&mut self, open: Span) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(SyntaxError::new(
                open,
                format!("at most {} levels of nesting", self.max_depth),
                "a deeper literal",
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    pub fn record_type(&mut self) -> Result<RecordTypeAst, SyntaxError> {
        match self.ty()? {
            TypeAst::Record(record) => Ok(record),
            TypeAst::Named { name, span, .. } => Err(SyntaxError::new(
                span,
                "a record or tuple type",
                format!("type `{name}`"),
            )),
        }
    }

    pub fn record_value(&mut self) -> Result<RecordValueAst, SyntaxError> {
        match self.expr()? {
            ExprAst::Record(record) => Ok(record),
            ExprAst::Literal { span, .. } => Err(SyntaxError::new(
                span,
                "a record or tuple literal",
                "a single value",
            )),
        }
    }

    /// `Name arg*`, `{...}`, `(T, ...)` or `(T)`.
    pub fn ty(&mut self) -> Result<TypeAst, SyntaxError> {
        match self.next_token() {
            token!(Lexeme::Identifier(name), span) => {
                let mut args = Vec::new();
                while let Some(arg) = self.type_argument()? {
                    args.push(arg);
                }
                let span = args.last().map_or(span, |last| span.to(last.span()));
                Ok(TypeAst::Named { name, args, span })
            }
            token => {
                self.return_token(token);
                match self.type_argument()? {
                    Some(ty) => Ok(ty),
                    None => Err(unexpected(self.next_token(), "a type")),
                }
            }
        }
    }

    /// A type that can be applied as an argument without parentheses.
    fn type_argument(&mut self) -> Result<Option<TypeAst>, SyntaxError> {
        match self.next_token() {
            token!(Lexeme::Identifier(name), span) => Ok(Some(TypeAst::Named {
                name,
                args: Vec::new(),
                span,
            })),
            token!(Lexeme::LBrace, open) => {
                let (fields, span) = self.braced(open, Lexeme::DoubleColon, "`::`", Self::ty)?;
                Ok(Some(TypeAst::Record(RecordTypeAst { fields, span })))
            }
            token!(Lexeme::LParen, open) => {
                let (elems, span) = self.parenthesized(open, Self::ty)?;
                Ok(Some(match elems {
                    Parenthesized::Single(ty) => ty,
                    Parenthesized::Tuple(elems) => TypeAst::Record(RecordTypeAst {
                        fields: positional(elems, TypeAst::span),
                        span,
                    }),
                }))
            }
            token => {
                self.return_token(token);
                Ok(None)
            }
        }
    }

    pub fn expr(&mut self) -> Result<ExprAst, SyntaxError> {
        match self.next_token() {
            token!(Lexeme::Integer(digits), span) => integer(&digits, false, span),
            token!(Lexeme::Minus, minus) => match self.next_token() {
                token!(Lexeme::Integer(digits), span) => integer(&digits, true, minus.to(span)),
                token!(Lexeme::Float(x), span) => {
                    Ok(literal(Literal::Float(OrderedFloat(-x)), minus.to(span)))
                }
                token => Err(unexpected(token, "a number after `-`")),
            },
            token!(Lexeme::Float(x), span) => Ok(literal(Literal::Float(OrderedFloat(x)), span)),
            token!(Lexeme::String(s), span) => Ok(literal(Literal::String(s), span)),
            token!(Lexeme::Character(c), span) => Ok(literal(Literal::Char(c), span)),
            token!(Lexeme::Identifier(ident), span) => match ident.as_str() {
                "True" => Ok(literal(Literal::Bool(true), span)),
                "False" => Ok(literal(Literal::Bool(false), span)),
                _ => Err(SyntaxError::new(
                    span,
                    "a value",
                    format!("identifier `{ident}`"),
                )),
            },
            token!(Lexeme::LBrace, open) => {
                let (fields, span) = self.braced(open, Lexeme::Equals, "`=`", Self::expr)?;
                Ok(ExprAst::Record(RecordValueAst { fields, span }))
            }
            token!(Lexeme::LParen, open) => {
                let (elems, span) = self.parenthesized(open, Self::expr)?;
                Ok(match elems {
                    Parenthesized::Single(expr) => expr,
                    Parenthesized::Tuple(elems) => ExprAst::Record(RecordValueAst {
                        fields: positional(elems, ExprAst::span),
                        span,
                    }),
                })
            }
            token => Err(unexpected(token, "a value")),
        }
    }

    fn field_name(&mut self) -> Result<(FieldName, Span), SyntaxError> {
        match self.next_token() {
            token!(Lexeme::Identifier(label), span) => Ok((FieldName::label(label), span)),
            token!(Lexeme::Integer(digits), span) => {
                Ok((FieldName::Position(position(&digits, span)?), span))
            }
            token => Err(unexpected(token, "a field name")),
        }
    }

    /// The fields of `{name <sep> item, ...}` after the opening brace.
    fn braced<T>(
        &mut self,
        open: Span,
        separator: Lexeme,
        separator_text: &str,
        mut item: impl FnMut(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<(Vec<FieldAst<T>>, Span), SyntaxError> {
        self.enter(open)?;
        let mut fields = Vec::new();
        let close = match self.next_token() {
            token!(Lexeme::RBrace, close) => close,
            token => {
                self.return_token(token);
                loop {
                    let (name, name_span) = self.field_name()?;
                    self.expect(separator.clone(), separator_text)?;
                    let node = item(self)?;
                    fields.push(FieldAst {
                        name,
                        name_span,
                        node,
                    });
                    match self.next_token() {
                        token!(Lexeme::Comma) => continue,
                        token!(Lexeme::RBrace, close) => break close,
                        token => return Err(unexpected(token, "`,` or `}`")),
                    }
                }
            }
        };
        self.leave();
        let span = open.to(close);
        check_field_names(&fields, span)?;
        Ok((fields, span))
    }

    /// `(item)` or `(item, item, ...)` after the opening parenthesis.
    fn parenthesized<T>(
        &mut self,
        open: Span,
        mut item: impl FnMut(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<(Parenthesized<T>, Span), SyntaxError> {
        self.enter(open)?;
        let mut elems = vec![item(self)?];
        let close = loop {
            match self.next_token() {
                token!(Lexeme::Comma) => elems.push(item(self)?),
                token!(Lexeme::RParen, close) => break close,
                token => return Err(unexpected(token, "`,` or `)`")),
            }
        };
        self.leave();
        let span = open.to(close);
        if elems.len() == 1 {
            if let Some(single) = elems.pop() {
                return Ok((Parenthesized::Single(single), span));
            }
        }
        Ok((Parenthesized::Tuple(elems), span))
    }
}

enum Parenthesized<T> {
    Single(T),
    Tuple(Vec<T>),
}

fn unexpected(token: Token, expected: &str) -> SyntaxError {
    SyntaxError::new(token.span, expected, token.lexeme.to_string())
}

fn literal(literal: Literal, span: Span) -> ExprAst {
    ExprAst::Literal { literal, span }
}

fn integer(digits: &str, negative: bool, span: Span) -> Result<ExprAst, SyntaxError> {
    let text = if negative {
        format!("-{digits}")
    } else {
        digits.to_string()
    };
    match text.parse() {
        Ok(i) => Ok(literal(Literal::Int(i), span)),
        Err(_) => Err(SyntaxError::new(
            span,
            "an integer that fits in 64 bits",
            format!("`{text}`"),
        )),
    }
}

/// Name tuple elements `1..=N`.
fn positional<T>(elems: Vec<T>, span_of: impl Fn(&T) -> Span) -> Vec<FieldAst<T>> {
    (1..)
        .zip(elems)
        .map(|(pos, node)| FieldAst {
            name: FieldName::Position(pos),
            name_span: span_of(&node),
            node,
        })
        .collect()
}

/// Labels and positions may not share a literal, and positions must run
/// from 1 without gaps. Repeated names are left to the canonicalizer.
fn check_field_names<T>(fields: &[FieldAst<T>], span: Span) -> Result<(), SyntaxError> {
    let Some(first) = fields.first() else {
        return Ok(());
    };
    let positional = first.name.is_position();
    if let Some(field) = fields
        .iter()
        .find(|field| field.name.is_position() != positional)
    {
        let (expected, found) = if positional {
            ("a tuple position", format!("label `{}`", field.name))
        } else {
            ("a label", format!("position `{}`", field.name))
        };
        return Err(SyntaxError::new(field.name_span, expected, found));
    }
    if !positional {
        return Ok(());
    }
    let positions: HashSet<u32> = fields
        .iter()
        .filter_map(|field| match field.name {
            FieldName::Position(pos) => Some(pos),
            FieldName::Label(_) => None,
        })
        .collect();
    if positions.len() < fields.len() {
        return Ok(());
    }
    let arity = fields.len() as u32;
    match (1..=arity).find(|pos| !positions.contains(pos)) {
        Some(missing) => Err(SyntaxError::new(
            span,
            format!("positions 1 through {arity}"),
            format!("no field `{missing}`"),
        )),
        None => Ok(()),
    }
}
