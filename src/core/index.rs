//! Interval index over raw records
//!
//! Uses rust-lapper for O(log n + k) window queries. Each record is
//! indexed by its reference footprint plus an anchor at every canonical
//! 5' breakend that falls outside that footprint, so a record is always
//! reachable from its own 5' probe.

use crate::adapter::CallerAdapter;
use crate::formats::vcf::VcfRecord;
use rust_lapper::{Interval, Lapper};
use std::collections::HashMap;
use std::sync::Arc;

/// Interval pointing at a record ordinal
pub type RecordInterval = Interval<u64, usize>;

/// Records of one call set, queryable by chromosome window
pub struct RecordIndex {
    records: Vec<Arc<VcfRecord>>,
    /// Chromosome -> interval tree of record ordinals
    maps: HashMap<String, Lapper<u64, usize>>,
}

impl RecordIndex {
    /// Build the index; `adapter` supplies the canonical 5' anchors
    pub fn build(records: Vec<Arc<VcfRecord>>, adapter: CallerAdapter) -> Self {
        let mut by_chrom: HashMap<String, Vec<RecordInterval>> = HashMap::new();

        for (ordinal, record) in records.iter().enumerate() {
            let stop = footprint_end(record);
            by_chrom.entry(record.chrom.clone()).or_default().push(Interval {
                start: record.pos,
                stop: stop.saturating_add(1),
                val: ordinal,
            });

            // Records that fail to canonicalize keep their footprint; the
            // error resurfaces when a fetch hands them to the adapter.
            let breakends = match adapter.to_breakends(record) {
                Ok(breakends) => breakends,
                Err(err) => {
                    log::debug!("indexing footprint only: {}", err);
                    continue;
                }
            };
            for breakend in breakends {
                let inside = breakend.chrom_5p == record.chrom
                    && (record.pos..=stop).contains(&breakend.bkpos_5p);
                if !inside {
                    by_chrom.entry(breakend.chrom_5p).or_default().push(Interval {
                        start: breakend.bkpos_5p,
                        stop: breakend.bkpos_5p.saturating_add(1),
                        val: ordinal,
                    });
                }
            }
        }

        let maps = by_chrom
            .into_iter()
            .map(|(chrom, intervals)| (chrom, Lapper::new(intervals)))
            .collect();

        Self { records, maps }
    }

    /// Records touching the inclusive 1-based window `[start, end]`, each
    /// once, in (POS, file order) order
    pub fn fetch(&self, chrom: &str, start: u64, end: u64) -> Vec<Arc<VcfRecord>> {
        let Some(lapper) = self.maps.get(chrom) else {
            return Vec::new();
        };
        if end < start {
            return Vec::new();
        }

        let mut ordinals: Vec<usize> = lapper
            .find(start, end.saturating_add(1))
            .map(|iv| iv.val)
            .collect();
        ordinals.sort_unstable_by_key(|&i| (self.records[i].pos, i));
        ordinals.dedup();
        ordinals.into_iter().map(|i| Arc::clone(&self.records[i])).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Indexed records in file order
    pub fn records(&self) -> &[Arc<VcfRecord>] {
        &self.records
    }

    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.maps.contains_key(chrom)
    }

    pub fn chroms(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    /// Number of intervals (footprints and anchors) on a chromosome
    pub fn interval_count(&self, chrom: &str) -> usize {
        self.maps.get(chrom).map(|l| l.len()).unwrap_or(0)
    }
}

/// Last reference base a record touches: its REF span or `END`, whichever
/// reaches further
fn footprint_end(record: &VcfRecord) -> u64 {
    let end = record.end().ok().flatten().unwrap_or(record.pos);
    record.ref_end().max(end)
}
