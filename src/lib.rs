//! Anonymous structural records, tuples and verified lenses.
//!
//! Record literals are parsed from text, canonicalized by field name and
//! interned in a [`TypeRegistry`], so `{x :: Int, y :: Int}` and
//! `{y :: Int, x :: Int}` are the same type. A [`Lens`] derived from a type
//! and a path such as `birthday.year` reads and rebuilds nested fields.

extern crate self as structrec;

pub mod ast;
pub mod canon;
pub mod diag;
pub mod elaborate;
pub mod error;
pub mod host;
pub mod lens;
pub mod registry;
pub mod syntax;
pub mod types;
pub mod value;

pub use error::{
    DuplicateFieldError, ElaborateError, Error, SyntaxError, TypeMismatchError, UnknownFieldError,
};
pub use host::{FromValue, HostType, IntoValue};
pub use lens::{Lens, derive_lens, derive_lens_path, derive_lens_str};
pub use registry::TypeRegistry;
pub use structrec_macros::Record;
pub use syntax::parse::{
    ParseConfig, parse_expr, parse_lens_path, parse_record_type, parse_record_value, parse_type,
};
pub use types::{Field, FieldName, Path, RecordType, Type};
pub use value::{RecordValue, Value};
