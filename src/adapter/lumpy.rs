//! Lumpy tag scheme
//!
//! Lumpy reports paired-end support in `PE`, split-read support in `SR`
//! and carries both 95% and full confidence intervals plus breakpoint
//! probability curves (`PRPOS` / `PREND`).

use super::TagScheme;
use crate::core::breakend::SourceTool;
use crate::core::classify::ClassifyPolicy;

pub static SCHEME: TagScheme = TagScheme {
    tool: SourceTool::Lumpy,
    span_reads_tag: "PE",
    junc_reads_tag: "SR",
    structural_tags: &["END", "STRANDS", "PE", "SR"],
    paired_tags: &[("CIPOS", "CIEND"), ("CIPOS95", "CIEND95"), ("PRPOS", "PREND")],
    policy: ClassifyPolicy {
        require_secondary_for_bnd: false,
    },
};
