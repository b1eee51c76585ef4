//! Core library for converting ambisonic harmonic frames between channel
//! conventions.
//!
//! Frames are produced upstream by a harmonic encoder and consumed
//! downstream by decoders; this crate only rewrites them. Each module owns
//! one concern: the channel layout of a frame, the numbering tables, the
//! normalization weights, and the converter that applies both.

pub mod config;
pub mod converter;
pub mod error;
pub mod layout;
pub mod normalization;
pub mod numbering;

pub use config::{ConverterConfig, Preset};
pub use converter::{
    ChannelConverter, Converter, Dimension, HarmonicConverter, Planar, PlanarConverter, Spherical,
    SphericalConverter,
};
pub use error::{ExchangeError, Result};
pub use layout::{
    channel_count, checked_channel_count, degree_channel_range, Dimensionality, HarmonicLayout,
};
pub use normalization::Normalization;
pub use numbering::{Numbering, MAX_LEGACY_ORDER};
