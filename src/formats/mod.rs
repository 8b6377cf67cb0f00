//! File format adapters
//!
//! VCF input and re-serialization, and the flat breakend text form.

pub mod sv;
pub mod vcf;

pub use sv::{
    convert_calls, format_sv_line, parse_sv_line, ConversionStats, SvParseError, SvReader, SvWriter,
};
pub use vcf::{Allele, Breakend, VcfHeader, VcfParseError, VcfRecord, VcfRecordView, VcfWriter};
