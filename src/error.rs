//! Error taxonomy. Hand-rolled `std::error::Error` + `Display`, no
//! `thiserror`/`anyhow` in the core library.

use std::fmt;

/// Section number for a file-level error (not attributable to one section).
pub const FILE_LEVEL: i32 = -1;

#[derive(Debug)]
pub enum GribError {
    /// Magic number wrong, end-sentinel wrong, section-number byte mismatch,
    /// or a length field that does not match the byte range.
    InvalidFormat {
        section: i32,
        offset: usize,
        cause: String,
    },
    /// A bit/byte cursor ran off the end of its span.
    ShortRead {
        offset: usize,
        requested: usize,
        available: usize,
    },
    /// A template number outside the supported set for Section 3, 4, or 5.
    UnsupportedTemplate {
        section: i32,
        template_number: u16,
    },
    /// A 5.3 consistency failure: insufficient bits, bitmap count mismatch,
    /// or a bad spatial-differencing order.
    DataDecode {
        section: i32,
        offset: usize,
        cause: String,
        source: Option<Box<GribError>>,
    },
    /// An unsupported grid type was requested for coordinate projection
    /// (reported once per unique grid key, not per message).
    CoordinateProjection { cause: String },
    /// Cooperative cancellation was triggered.
    Cancelled,
}

impl GribError {
    pub(crate) fn invalid_format(section: i32, offset: usize, cause: impl Into<String>) -> Self {
        Self::InvalidFormat {
            section,
            offset,
            cause: cause.into(),
        }
    }

    pub(crate) fn unsupported_template(section: i32, template_number: u16) -> Self {
        Self::UnsupportedTemplate {
            section,
            template_number,
        }
    }

    /// Scanning-mode flags this crate does not interpret (notably the
    /// "alternating row direction" bit) surface here rather than as a
    /// dedicated variant.
    pub(crate) fn unsupported_scan_mode(mode: u8) -> Self {
        Self::CoordinateProjection {
            cause: format!("unsupported scanning mode flags: {mode:#010b}"),
        }
    }

    pub(crate) fn coordinate_projection(cause: impl Into<String>) -> Self {
        Self::CoordinateProjection {
            cause: cause.into(),
        }
    }

    pub(crate) fn data_decode(section: i32, offset: usize, cause: impl Into<String>) -> Self {
        Self::DataDecode {
            section,
            offset,
            cause: cause.into(),
            source: None,
        }
    }

    pub(crate) fn data_decode_from(
        section: i32,
        offset: usize,
        cause: impl Into<String>,
        source: GribError,
    ) -> Self {
        Self::DataDecode {
            section,
            offset,
            cause: cause.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Section number this error is attributable to, or `FILE_LEVEL`.
    pub fn section(&self) -> i32 {
        match self {
            Self::InvalidFormat { section, .. } => *section,
            Self::ShortRead { .. } => FILE_LEVEL,
            Self::UnsupportedTemplate { section, .. } => *section,
            Self::DataDecode { section, .. } => *section,
            Self::CoordinateProjection { .. } => FILE_LEVEL,
            Self::Cancelled => FILE_LEVEL,
        }
    }
}

impl fmt::Display for GribError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat {
                section,
                offset,
                cause,
            } => write!(
                f,
                "invalid GRIB2 format in section {section} at offset {offset}: {cause}"
            ),
            Self::ShortRead {
                offset,
                requested,
                available,
            } => write!(
                f,
                "short read at offset {offset}: requested {requested} bytes, {available} available"
            ),
            Self::UnsupportedTemplate {
                section,
                template_number,
            } => write!(f, "unsupported template {template_number} in section {section}"),
            Self::DataDecode {
                section,
                offset,
                cause,
                ..
            } => write!(f, "data decode failed in section {section} at offset {offset}: {cause}"),
            Self::CoordinateProjection { cause } => {
                write!(f, "coordinate projection failed: {cause}")
            }
            Self::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl std::error::Error for GribError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DataDecode { source, .. } => source.as_deref().map(|e| e as _),
            _ => None,
        }
    }
}
