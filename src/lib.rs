//! Parallel GRIB2 decoder: given any `Read + Seek` byte source, finds every
//! message it contains, decodes each field's grid of values, and attaches
//! the latitude/longitude each value is valid at.

mod codetables;
mod decode;
mod error;
mod field;
mod grid;
mod message;
mod options;
mod parse;
mod product;
mod scan;
mod sections;
mod utils;

pub use crate::{
    codetables::parameter_short_name,
    error::{GribError, FILE_LEVEL},
    field::{Field, ReferenceTime},
    message::Message,
    options::{CancellationToken, FieldInfo, ParseOptions},
    parse::{parse, parse_with_options},
};

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
