//! Error types for the Fog core.
//!
//! # Overview
//!
//! The [`Error`] enum covers the four failure kinds the framework's
//! C++ ancestor reported through its `ERR_RT_*` / `ERR_IMAGE_*` range:
//! resource exhaustion, invalid pixel formats, invalid arguments, and
//! unsupported conversions. Span functions themselves never fail; every
//! failure is resolved at `Converter::setup` or at a `Region` mutator's
//! allocation point.
//!
//! # Usage
//!
//! ```rust
//! use fog_core::Error;
//!
//! fn check_depth(depth: u8) -> Result<(), Error> {
//!     match depth {
//!         1 | 4 | 8 | 16 | 24 | 32 | 48 | 64 => Ok(()),
//!         other => Err(Error::invalid_format(format!("unsupported depth {other}"))),
//!     }
//! }
//! ```

use thiserror::Error as ThisError;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the Fog core, raster, and region crates.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Allocation failed; the operation has no side effect.
    ///
    /// Corresponds to the original engine's `ERR_RT_OUT_OF_MEMORY`.
    #[error("failed to allocate {requested} bytes: {reason}")]
    ResourceExhaustion {
        /// Bytes requested.
        requested: usize,
        /// Human-readable reason, if known.
        reason: String,
    },

    /// A [`crate::descriptor::PixelDescriptor`] is malformed: overlapping
    /// masks, zero depth, or a depth outside `{1,4,8,16,24,32,48,64}`.
    ///
    /// Corresponds to `ERR_IMAGE_INVALID_FORMAT`.
    #[error("invalid pixel format: {0}")]
    InvalidFormat(String),

    /// An argument is out of range or a requested conversion direction is
    /// unreachable.
    ///
    /// Corresponds to `ERR_RT_INVALID_ARGUMENT`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not supported between the given formats/operators.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Creates a [`Error::ResourceExhaustion`] error.
    #[inline]
    pub fn resource_exhaustion(requested: usize, reason: impl Into<String>) -> Self {
        Self::ResourceExhaustion {
            requested,
            reason: reason.into(),
        }
    }

    /// Creates a [`Error::InvalidFormat`] error.
    #[inline]
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat(reason.into())
    }

    /// Creates a [`Error::InvalidArgument`] error.
    #[inline]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// Creates a [`Error::Unsupported`] error.
    #[inline]
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported(reason.into())
    }

    /// Returns `true` if this is an allocation-related error.
    #[inline]
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, Self::ResourceExhaustion { .. })
    }

    /// Returns `true` if this is a format-related error.
    #[inline]
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidFormat(_))
    }
}
