//! Longranger tag scheme
//!
//! Longranger counts discordant pairs in `PAIRS` and split reads in
//! `SPLIT`. A `BND` call is only a real mate join when `SVTYPE2` says
//! what it is part of; without it the record is treated as unknown.

use super::TagScheme;
use crate::core::breakend::SourceTool;
use crate::core::classify::ClassifyPolicy;

pub static SCHEME: TagScheme = TagScheme {
    tool: SourceTool::Longranger,
    span_reads_tag: "PAIRS",
    junc_reads_tag: "SPLIT",
    structural_tags: &["END", "PAIRS", "SPLIT"],
    paired_tags: &[("CIPOS", "CIEND")],
    policy: ClassifyPolicy {
        require_secondary_for_bnd: true,
    },
};
