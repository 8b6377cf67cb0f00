//! Caller adapters
//!
//! One adapter per supported calling tool. Each maps a raw VCF record to
//! one canonical breakend (two for inversions), using the tool's
//! [`TagScheme`] for everything tag-related.

pub mod longranger;
pub mod lumpy;
mod rules;

pub use rules::orientation_strands;

use crate::core::breakend::{CanonicalBreakend, GeneralFields, Junction, MetaInfo, SourceTool};
use crate::core::classify::{classify, ClassifyPolicy, VariantKind};
use crate::core::error::{SvError, SvResult};
use crate::formats::vcf::VcfRecord;

/// Tag names and classification switches of one calling tool
#[derive(Debug)]
pub struct TagScheme {
    pub tool: SourceTool,
    /// Paired-end (spanning) read support
    pub span_reads_tag: &'static str,
    /// Split (junction) read support
    pub junc_reads_tag: &'static str,
    /// Tags dropped from `meta_info` because the canonical form holds them
    pub structural_tags: &'static [&'static str],
    /// Confidence-interval tags describing the two sides of a call
    pub paired_tags: &'static [(&'static str, &'static str)],
    pub policy: ClassifyPolicy,
}

/// Adapter selected by source tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallerAdapter {
    Lumpy,
    Longranger,
}

impl CallerAdapter {
    pub fn for_tool(tool: SourceTool) -> Self {
        match tool {
            SourceTool::Lumpy => CallerAdapter::Lumpy,
            SourceTool::Longranger => CallerAdapter::Longranger,
        }
    }

    pub fn tool(&self) -> SourceTool {
        self.scheme().tool
    }

    pub fn scheme(&self) -> &'static TagScheme {
        match self {
            CallerAdapter::Lumpy => &lumpy::SCHEME,
            CallerAdapter::Longranger => &longranger::SCHEME,
        }
    }

    /// Variant kind of a record under this tool's policy
    pub fn classify(&self, record: &VcfRecord) -> VariantKind {
        classify(record, self.scheme().policy)
    }

    /// Canonicalize a record: one breakend, or two for an inversion
    pub fn to_breakends(&self, record: &VcfRecord) -> SvResult<Vec<CanonicalBreakend>> {
        let scheme = self.scheme();
        let kind = self.classify(record);
        let general = rules::general_fields(record, scheme)?;

        let breakends = match kind {
            VariantKind::Bnd => {
                let (junction, local_orientation) = rules::breakend_junction(record)?;
                let meta = rules::remap_meta(record, scheme, kind, !local_orientation);
                vec![self.assemble(junction, general, meta)]
            }
            VariantKind::Inv => {
                let end = rules::span_end(record, kind)?;
                let meta = rules::remap_meta(record, scheme, kind, false);
                let [first, second] = rules::inversion_junctions(record, end);
                vec![
                    self.assemble(first, suffixed(&general, ".1_1"), meta.clone()),
                    self.assemble(second, suffixed(&general, ".2_1"), meta),
                ]
            }
            VariantKind::Del | VariantKind::Dup | VariantKind::DupTandem | VariantKind::Unknown => {
                let end = rules::span_end(record, kind)?;
                let junction = if kind.is_duplication() {
                    rules::duplication_junction(record, end)
                } else {
                    rules::deletion_junction(record, end)
                };
                let meta = rules::remap_meta(record, scheme, kind, kind.is_duplication());
                vec![self.assemble(junction, general, meta)]
            }
        };

        for breakend in &breakends {
            breakend
                .validate()
                .map_err(|message| SvError::parse(record.locus(), message))?;
        }
        Ok(breakends)
    }

    /// Single record spanning an inversion's outer coordinates, used to
    /// compare two inversions from the same tool as a whole. `None` for
    /// other kinds.
    pub fn inversion_signature(&self, record: &VcfRecord) -> SvResult<Option<CanonicalBreakend>> {
        let kind = self.classify(record);
        if kind != VariantKind::Inv {
            return Ok(None);
        }
        let scheme = self.scheme();
        let end = rules::span_end(record, kind)?;
        let general = rules::general_fields(record, scheme)?;
        let meta = rules::remap_meta(record, scheme, kind, false);
        Ok(Some(self.assemble(rules::inversion_outline(record, end), general, meta)))
    }

    fn assemble(
        &self,
        junction: Junction,
        general: GeneralFields,
        meta: MetaInfo,
    ) -> CanonicalBreakend {
        CanonicalBreakend::from_parts(junction, general, meta, None, self.tool())
    }
}

fn suffixed(general: &GeneralFields, suffix: &str) -> GeneralFields {
    GeneralFields {
        id: format!("{}{}", general.id, suffix),
        ..general.clone()
    }
}
