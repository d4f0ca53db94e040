use rustyline::{
    Completer, Config, Editor, Helper, Highlighter, Hinter, Validator,
    error::ReadlineError,
    highlight::MatchingBracketHighlighter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
};
use std::{collections::HashMap, process::ExitCode};
use structrec::{
    Error, Lens, RecordType, RecordValue, TypeRegistry, Value, derive_lens, diag,
    elaborate::{elaborate_expr, elaborate_type, elaborate_value},
    parse_expr, parse_lens_path, parse_record_type, parse_record_value,
    syntax::lex::{ANY_TOKEN, Lexeme, Token, lex},
};
use tracing_subscriber::{EnvFilter, fmt};

const HELP: &str = "\
commands:
  type NAME = {field :: Type, ...}     declare a record type
  let NAME [: TYPE] = {field = ...}    bind a record value, optionally checked against TYPE
  get NAME PATH                        read a field, e.g. `get yuri birthday.year`
  set NAME PATH = VALUE                replace a field of a bound value
  show NAME                            print a bound value and its type
  types                                list every interned record type";

/// Asks for more lines while braces or parentheses are left open.
#[derive(Default)]
struct InputValidator;

impl Validator for InputValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if needs_more_input(ctx.input()) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Lex `input` the way literals are lexed: open if a delimiter is left
/// unclosed or a string or char literal runs into the end. Characters no
/// token starts with, such as the `:` of `let` and the `.` of paths, are
/// skipped. Any other lex error is left for the parser to report.
fn needs_more_input(input: &str) -> bool {
    let mut depth = 0;
    let mut rest = input;
    loop {
        match lex(rest) {
            Ok(tokens) => return depth + open_delimiters(&tokens) > 0,
            Err(err) if err.span.offset >= rest.len() => return true,
            Err(err) if err.expected == ANY_TOKEN => {
                let (before, after) = rest.split_at(err.span.offset);
                match lex(before) {
                    Ok(tokens) => depth += open_delimiters(&tokens),
                    Err(_) => return false,
                }
                rest = after.get(err.span.len.max(1)..).unwrap_or_default();
            }
            Err(_) => return false,
        }
    }
}

fn open_delimiters(tokens: &[Token]) -> isize {
    tokens
        .iter()
        .map(|token| match token.lexeme {
            Lexeme::LBrace | Lexeme::LParen => 1,
            Lexeme::RBrace | Lexeme::RParen => -1,
            _ => 0,
        })
        .sum()
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputHelper {
    #[rustyline(Validator)]
    validator: InputValidator,
    #[rustyline(Highlighter)]
    highlighter: MatchingBracketHighlighter,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("STRUCTREC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::builder().auto_add_history(true).build();
    let mut editor = match Editor::with_history(config, DefaultHistory::new()) {
        Ok(e) => e,
        Err(err) => {
            eprintln!("Error creating line editor: {err}");
            return ExitCode::FAILURE;
        }
    };

    let helper = InputHelper {
        validator: InputValidator,
        highlighter: MatchingBracketHighlighter::new(),
    };

    editor.set_helper(Some(helper));

    let mut session = Session::default();
    loop {
        let input = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(err) => {
                eprintln!("Error while reading input: {err}");
                return ExitCode::FAILURE;
            }
        };

        match session.run(input.trim()) {
            Ok(output) if output.is_empty() => (),
            Ok(output) => println!("{output}"),
            Err(CommandError::Record {
                error,
                source_name,
                source,
            }) => eprintln!("{}", diag::render(&error, source_name, &source)),
            Err(CommandError::Usage(msg)) => eprintln!("error: {msg}"),
        }
    }

    ExitCode::SUCCESS
}

enum CommandError {
    /// An error in a literal or path, rendered against that text.
    Record {
        error: Error,
        source_name: &'static str,
        source: String,
    },
    Usage(String),
}

fn in_literal(source: &str, error: impl Into<Error>) -> CommandError {
    CommandError::Record {
        error: error.into(),
        source_name: "<literal>",
        source: source.to_string(),
    }
}

fn in_path(source: &str, error: impl Into<Error>) -> CommandError {
    CommandError::Record {
        error: error.into(),
        source_name: "<path>",
        source: source.to_string(),
    }
}

#[derive(Default)]
struct Session {
    registry: TypeRegistry,
    types: HashMap<String, RecordType>,
    values: HashMap<String, RecordValue>,
}

impl Session {
    fn run(&mut self, input: &str) -> Result<String, CommandError> {
        let (command, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
        let rest = rest.trim();
        match command {
            "" => Ok(String::new()),
            "help" => Ok(HELP.to_string()),
            "types" => Ok(self
                .registry
                .types()
                .iter()
                .map(|ty| format!("#{} {ty}", ty.id()))
                .collect::<Vec<_>>()
                .join("\n")),
            "type" => self.declare_type(rest),
            "let" => self.bind(rest),
            "get" => self.get(rest),
            "set" => self.set(rest),
            "show" => {
                let value = self.value(rest)?;
                Ok(format!("{rest} = {value} :: {}", value.record_type()))
            }
            _ => Err(CommandError::Usage(format!(
                "unknown command `{command}`, try `help`"
            ))),
        }
    }

    fn declare_type(&mut self, rest: &str) -> Result<String, CommandError> {
        let (name, literal) = split_binding(rest, '=')?;
        let ty = self.record_type(literal)?;
        let output = format!("{name} :: {ty}");
        self.types.insert(name.to_string(), ty);
        Ok(output)
    }

    fn bind(&mut self, rest: &str) -> Result<String, CommandError> {
        let (head, literal) = split_binding(rest, '=')?;
        let (name, expected) = match head.split_once(':') {
            Some((name, ty)) => (name.trim(), Some(self.record_type(ty.trim())?)),
            None => (head, None),
        };
        let ast = parse_record_value(literal).map_err(|e| in_literal(literal, e))?;
        let value = elaborate_value(&ast, &self.registry, expected.as_ref())
            .map_err(|e| in_literal(literal, e))?;
        let output = format!("{name} = {value}");
        self.values.insert(name.to_string(), value);
        Ok(output)
    }

    fn get(&self, rest: &str) -> Result<String, CommandError> {
        let (name, path) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let value = Value::Record(self.value(name)?.clone());
        let lens = self.lens(&value, path.trim())?;
        let field = lens.get(&value).map_err(|e| in_path(path, e))?;
        Ok(format!("{field} :: {}", lens.target()))
    }

    fn set(&mut self, rest: &str) -> Result<String, CommandError> {
        let (head, literal) = split_binding(rest, '=')?;
        let (name, path) = head.split_once(char::is_whitespace).unwrap_or((head, ""));
        let value = Value::Record(self.value(name)?.clone());
        let lens = self.lens(&value, path.trim())?;
        let ast = parse_expr(literal).map_err(|e| in_literal(literal, e))?;
        let leaf = elaborate_expr(&ast, &self.registry, Some(lens.target()))
            .map_err(|e| in_literal(literal, e))?;
        let updated = lens
            .set(&value, leaf)
            .map_err(|e| in_literal(literal, e))?;
        let Value::Record(updated) = updated else {
            return Err(CommandError::Usage(format!("`{name}` is no longer a record")));
        };
        let output = format!("{name} = {updated}");
        self.values.insert(name.to_string(), updated);
        Ok(output)
    }

    /// A declared type name or a record type literal.
    fn record_type(&self, text: &str) -> Result<RecordType, CommandError> {
        if let Some(ty) = self.types.get(text) {
            return Ok(ty.clone());
        }
        let ast = parse_record_type(text).map_err(|e| in_literal(text, e))?;
        elaborate_type(&ast, &self.registry).map_err(|e| in_literal(text, e))
    }

    fn value(&self, name: &str) -> Result<&RecordValue, CommandError> {
        self.values
            .get(name)
            .ok_or_else(|| CommandError::Usage(format!("no value named `{name}`")))
    }

    fn lens(&self, value: &Value, path: &str) -> Result<Lens, CommandError> {
        let ast = parse_lens_path(path).map_err(|e| in_path(path, e))?;
        derive_lens(&value.type_of(), &ast).map_err(|e| in_path(path, e))
    }
}

/// Split `NAME = rest` (or `NAME PATH = rest`) at the first `separator`.
fn split_binding(text: &str, separator: char) -> Result<(&str, &str), CommandError> {
    match text.split_once(separator) {
        Some((head, rest)) if !head.trim().is_empty() => Ok((head.trim(), rest.trim())),
        _ => Err(CommandError::Usage(format!(
            "expected `NAME {separator} ...`, see `help`"
        ))),
    }
}
