//! Scan-line counter repair for recorded GOES GVAR downlink frames.
//!
//! Recorded GVAR files carry an occasional corrupted relative scan counter in an otherwise intact
//! frame. This crate resolves each frame's outer header by majority vote across its redundant
//! copies, groups frames into ten-wide scanline series, and rewrites any counter that disagrees
//! with the rest of its series using either sequential extrapolation from the prior series or an
//! intra-series majority vote.
//!
//! The [`driver::repair`] function is the entry point for processing a full recording.

pub mod codec;
pub mod corrector;
pub mod driver;
mod error;
pub mod frame;
pub mod header;
pub mod series;

pub use corrector::Corrector;
pub use driver::{repair, Summary};
pub use error::{Error, Result};
pub use series::{Accumulator, FinalizedSeries, PushOutcome, Series, SeriesEntry};
