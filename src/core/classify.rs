//! Variant-type classification
//!
//! Derives one [`VariantKind`] per raw record from its SNP/indel predicates
//! and its `SVTYPE` / `SVTYPE2` tags.

use crate::core::error::SvError;
use crate::formats::vcf::VcfRecord;
use std::fmt;
use std::str::FromStr;

/// Closed set of variant kinds the adapters know how to canonicalize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Del,
    Dup,
    DupTandem,
    Inv,
    Bnd,
    Unknown,
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Del => "DEL",
            VariantKind::Dup => "DUP",
            VariantKind::DupTandem => "DUP:TANDEM",
            VariantKind::Inv => "INV",
            VariantKind::Bnd => "BND",
            VariantKind::Unknown => "UNKNOWN",
        }
    }

    /// Kinds whose canonical form needs the `END` tag
    pub fn requires_end(&self) -> bool {
        matches!(
            self,
            VariantKind::Del | VariantKind::Dup | VariantKind::DupTandem | VariantKind::Inv
        )
    }

    /// DUP and tandem DUP share the swapped breakend order
    pub fn is_duplication(&self) -> bool {
        matches!(self, VariantKind::Dup | VariantKind::DupTandem)
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantKind {
    type Err = SvError;

    /// Parse an `SVTYPE` value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEL" => Ok(VariantKind::Del),
            "DUP" => Ok(VariantKind::Dup),
            "DUP:TANDEM" => Ok(VariantKind::DupTandem),
            "INV" => Ok(VariantKind::Inv),
            "BND" => Ok(VariantKind::Bnd),
            "UNK" | "UNKNOWN" => Ok(VariantKind::Unknown),
            other => Err(SvError::UnsupportedVariantKind(other.to_string())),
        }
    }
}

/// Per-caller classification switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifyPolicy {
    /// Treat a `BND` without `SVTYPE2` as unknown
    pub require_secondary_for_bnd: bool,
}

/// Classify a raw record
///
/// SNPs never reach the adapters (sources filter them out); if one does
/// it is `Unknown`, as are indels and unrecognized `SVTYPE` values.
pub fn classify(record: &VcfRecord, policy: ClassifyPolicy) -> VariantKind {
    if record.is_snp() || record.is_indel() {
        return VariantKind::Unknown;
    }
    let Some(sv_type) = record.sv_type() else {
        return VariantKind::Unknown;
    };

    if policy.require_secondary_for_bnd
        && sv_type == "BND"
        && record.info_text("SVTYPE2").is_none()
    {
        return VariantKind::Unknown;
    }

    match sv_type.parse::<VariantKind>() {
        Ok(kind) => kind,
        Err(err) => {
            log::debug!("{}: {}, treating as {}", record.locus(), err, VariantKind::Unknown);
            VariantKind::Unknown
        }
    }
}
