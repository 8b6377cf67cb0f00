//! sv-concord - structural-variant call canonicalization and comparison
//!
//! Converts the VCF output of different SV callers into one canonical
//! breakend representation and compares two call sets position by
//! position.
//!
//! # Features
//!
//! - Per-caller adapters (LUMPY, Longranger) with shared per-kind rules
//! - Inversions decomposed into their two breakend junctions
//! - Tolerance-windowed matching against an interval index
//! - Plain, gzip/BGZF and bzip2 input
//!
//! # Example
//!
//! ```no_run
//! use sv_concord::{compare, CallerAdapter, RegionSource, Tag, VcfSource};
//!
//! let a = VcfSource::open("lumpy.vcf.gz", CallerAdapter::Lumpy)?;
//! let b = VcfSource::open("longranger.vcf.gz", CallerAdapter::Longranger)?.indexed()?;
//!
//! for tagged in compare(&a, &b, 10)? {
//!     let tagged = tagged?;
//!     if tagged.tag == Tag::Intersection {
//!         println!("{}", tagged.breakend.id);
//!     }
//! }
//! # Ok::<(), sv_concord::SvError>(())
//! ```

pub mod adapter;
pub mod core;
pub mod formats;
pub mod matcher;

// Re-export commonly used types
pub use adapter::CallerAdapter;
pub use core::{
    CanonicalBreakend, InfoValue, MetaInfo, RecordFilter, RegionSource, SourceTool, Strand, SvError,
    SvResult, VariantKind, VcfSource,
};
pub use formats::{sv, vcf};
pub use matcher::{compare, difference, intersection, CompareStats, OutputFormat, Tag, Tagged};
