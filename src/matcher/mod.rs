//! Positional matching between two call sets
//!
//! Every canonical record of set A is probed against set B in a window of
//! `tolerance` bases around its 5' breakend. Candidates are canonicalized
//! with B's own adapter and compared field by field.

mod partition;

pub use partition::{write_partitions, CompareStats, OutputFormat, PartitionWriter};

use crate::adapter::CallerAdapter;
use crate::core::breakend::CanonicalBreakend;
use crate::core::classify::VariantKind;
use crate::core::error::{SvError, SvResult};
use crate::core::source::{RecordScan, RegionSource};
use crate::formats::vcf::VcfRecord;
use std::collections::VecDeque;
use std::sync::Arc;

/// Default probe half-width in bases
pub const DEFAULT_TOLERANCE: u64 = 10;

/// Partition a canonical record lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Intersection,
    Difference,
}

/// A canonical record of set A with its partition
#[derive(Debug, Clone)]
pub struct Tagged {
    pub tag: Tag,
    pub breakend: CanonicalBreakend,
    /// Source record the breakend was derived from
    pub record: Arc<VcfRecord>,
}

/// Lazy, order-preserving stream of tagged records
///
/// Yields A's canonical records in scan order (sub-records of an
/// inversion in decomposition order). The first error ends the stream.
pub struct Comparison<'b, B: RegionSource + ?Sized> {
    scan: RecordScan,
    adapter_a: CallerAdapter,
    b: &'b B,
    tolerance: u64,
    pending: VecDeque<Tagged>,
    warned: bool,
    done: bool,
}

/// Tag every canonical record of `a` against `b`
pub fn compare<'b, A, B>(a: &A, b: &'b B, tolerance: u64) -> SvResult<Comparison<'b, B>>
where
    A: RegionSource + ?Sized,
    B: RegionSource + ?Sized,
{
    log::debug!(
        "comparing {} ({}) against {} ({}), tolerance {}",
        a.label(),
        a.adapter().tool(),
        b.label(),
        b.adapter().tool(),
        tolerance
    );
    Ok(Comparison {
        scan: a.scan()?,
        adapter_a: a.adapter(),
        b,
        tolerance,
        pending: VecDeque::new(),
        warned: false,
        done: false,
    })
}

/// Records of `a` with a match in `b`
pub fn intersection<'b, A, B>(
    a: &A,
    b: &'b B,
    tolerance: u64,
) -> SvResult<impl Iterator<Item = SvResult<Tagged>> + 'b>
where
    A: RegionSource + ?Sized,
    B: RegionSource + ?Sized,
{
    Ok(compare(a, b, tolerance)?.only(Tag::Intersection))
}

/// Records of `a` without a match in `b`
pub fn difference<'b, A, B>(
    a: &A,
    b: &'b B,
    tolerance: u64,
) -> SvResult<impl Iterator<Item = SvResult<Tagged>> + 'b>
where
    A: RegionSource + ?Sized,
    B: RegionSource + ?Sized,
{
    Ok(compare(a, b, tolerance)?.only(Tag::Difference))
}

impl<'b, B: RegionSource + ?Sized> Comparison<'b, B> {
    /// Keep one partition; errors still pass through
    pub fn only(self, tag: Tag) -> impl Iterator<Item = SvResult<Tagged>> + 'b {
        self.filter(move |item| match item {
            Ok(tagged) => tagged.tag == tag,
            Err(_) => true,
        })
    }

    /// B records overlapping the probe window around `breakend`'s 5' end
    fn candidates(&mut self, breakend: &CanonicalBreakend) -> SvResult<Vec<Arc<VcfRecord>>> {
        let start = breakend.bkpos_5p.saturating_sub(self.tolerance);
        let end = breakend.bkpos_5p.saturating_add(self.tolerance);
        log::debug!(
            "probe {} {}:{}-{}",
            breakend.id,
            breakend.chrom_5p,
            start,
            end
        );
        match self.b.fetch(&breakend.chrom_5p, start, end) {
            Ok(records) => Ok(records),
            Err(SvError::IndexUnavailable(label)) => {
                if !self.warned {
                    log::warn!(
                        "no position index for {}, every record will be a difference",
                        label
                    );
                    self.warned = true;
                }
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Tag the canonical records of one A record
    fn tag_record(&mut self, record: Arc<VcfRecord>) -> SvResult<()> {
        let breakends = self.adapter_a.to_breakends(&record)?;
        let adapter_b = self.b.adapter();
        let outline_a = if self.adapter_a.tool() == adapter_b.tool() {
            self.adapter_a.inversion_signature(&record)?
        } else {
            None
        };

        for breakend in breakends {
            let mut matched = false;
            for candidate in self.candidates(&breakend)? {
                let canonical = adapter_b.to_breakends(&candidate)?;
                if canonical.iter().any(|c| breakend.same_event(c)) {
                    matched = true;
                    break;
                }
                if let Some(outline_a) = &outline_a {
                    if adapter_b.classify(&candidate) == VariantKind::Inv {
                        let same_outline = adapter_b
                            .inversion_signature(&candidate)?
                            .is_some_and(|outline_b| outline_a.same_junction(&outline_b));
                        if same_outline {
                            matched = true;
                            break;
                        }
                    }
                }
            }

            let tag = if matched {
                Tag::Intersection
            } else {
                Tag::Difference
            };
            self.pending.push_back(Tagged {
                tag,
                breakend,
                record: Arc::clone(&record),
            });
        }
        Ok(())
    }
}

impl<'b, B: RegionSource + ?Sized> Iterator for Comparison<'b, B> {
    type Item = SvResult<Tagged>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tagged) = self.pending.pop_front() {
                return Some(Ok(tagged));
            }
            if self.done {
                return None;
            }
            let record = match self.scan.next() {
                Some(Ok(record)) => record,
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                None => {
                    self.done = true;
                    return None;
                }
            };
            if let Err(err) = self.tag_record(record) {
                self.pending.clear();
                self.done = true;
                return Some(Err(err));
            }
        }
    }
}
