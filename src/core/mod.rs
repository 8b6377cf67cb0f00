//! Core breakend model and record access
//!
//! This module contains the canonical breakend record, variant
//! classification, error types, the interval index and record sources.

pub mod breakend;
pub mod classify;
pub mod error;
pub mod index;
pub mod io;
pub mod source;
#[cfg(feature = "tabix")]
pub mod tabix;

pub use breakend::{AnnoInfo, CanonicalBreakend, InfoValue, MetaInfo, SourceTool, Strand};
pub use classify::{classify, ClassifyPolicy, VariantKind};
pub use error::{RecordLocus, SvError, SvResult};
pub use index::RecordIndex;
pub use io::{detect_compression, open_text, CompressionFormat, IoStrategy, LineIterator, SmartReader};
pub use source::{RecordFilter, RecordScan, RegionSource, VcfSource};
#[cfg(feature = "tabix")]
pub use tabix::TabixSource;
