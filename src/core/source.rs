//! Record sources
//!
//! A [`RegionSource`] gives the matcher two independent ways into a call
//! set: a sequential scan, and windowed fetches against an index.

use crate::adapter::CallerAdapter;
use crate::core::classify::VariantKind;
use crate::core::error::{SvError, SvResult};
use crate::core::index::RecordIndex;
use crate::core::io::{open_text, LineIterator};
use crate::formats::vcf::{VcfHeader, VcfRecord};
use std::io::{self, BufRead, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A call set readable sequentially and by genomic window
pub trait RegionSource {
    /// Adapter that canonicalizes this source's records
    fn adapter(&self) -> CallerAdapter;

    /// Name used in log lines
    fn label(&self) -> &str;

    /// Start a sequential pass; each call opens its own reader
    fn scan(&self) -> SvResult<RecordScan>;

    /// Records touching the inclusive 1-based window `[start, end]` on
    /// `chrom`, sorted by position and free of duplicates
    fn fetch(&self, chrom: &str, start: u64, end: u64) -> SvResult<Vec<Arc<VcfRecord>>>;

    /// Header lines, for re-serializing records
    fn header(&self) -> SvResult<VcfHeader>;
}

/// Which records a source hands out
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFilter {
    pub exclude_snps: bool,
    pub pass_only: bool,
    /// Records without a QUAL fail a minimum
    pub min_qual: Option<f64>,
    /// Allow-list of kinds, as classified by the source's adapter
    pub kinds: Option<Vec<VariantKind>>,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            exclude_snps: true,
            pass_only: false,
            min_qual: None,
            kinds: None,
        }
    }
}

impl RecordFilter {
    /// Keep every record
    pub fn everything() -> Self {
        Self {
            exclude_snps: false,
            ..Self::default()
        }
    }

    pub fn accepts(&self, record: &VcfRecord, adapter: CallerAdapter) -> bool {
        if self.exclude_snps && record.is_snp() {
            return false;
        }
        if self.pass_only && !matches!(&record.filter, Some(f) if f.is_empty()) {
            return false;
        }
        if let Some(min) = self.min_qual {
            if !record.qual.is_some_and(|q| q >= min) {
                return false;
            }
        }
        match &self.kinds {
            Some(kinds) => kinds.contains(&adapter.classify(record)),
            None => true,
        }
    }
}

/// Sequential cursor over the data lines of a VCF stream
///
/// Header and blank lines are skipped, filtered-out records are dropped.
/// After the first error the scan yields nothing more.
pub struct RecordScan {
    lines: LineIterator<Box<dyn BufRead + Send>>,
    filter: RecordFilter,
    adapter: CallerAdapter,
    done: bool,
}

impl RecordScan {
    pub fn new(reader: Box<dyn BufRead + Send>, filter: RecordFilter, adapter: CallerAdapter) -> Self {
        Self {
            lines: LineIterator::new(reader),
            filter,
            adapter,
            done: false,
        }
    }
}

impl Iterator for RecordScan {
    type Item = SvResult<Arc<VcfRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let line_number = self.lines.line_number() + 1;
            let line = match self.lines.next_line()? {
                Ok(line) => line,
                Err(err) => {
                    self.done = true;
                    return Some(Err(SvError::Io(err)));
                }
            };
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let record = match VcfRecord::parse(line, line_number) {
                Ok(record) => record,
                Err(source) => {
                    self.done = true;
                    return Some(Err(SvError::InvalidRecord {
                        line: line_number,
                        source,
                    }));
                }
            };
            if self.filter.accepts(&record, self.adapter) {
                return Some(Ok(Arc::new(record)));
            }
        }
        None
    }
}

enum Origin {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

impl Origin {
    fn open(&self) -> io::Result<Box<dyn BufRead + Send>> {
        match self {
            Origin::File(path) => open_text(path),
            Origin::Memory(bytes) => Ok(Box::new(Cursor::new(Arc::clone(bytes)))),
        }
    }
}

/// VCF call set, plain or compressed, on disk or in memory
///
/// Opened unindexed; [`VcfSource::indexed`] reads it once and builds a
/// [`RecordIndex`] so it can answer fetches.
pub struct VcfSource {
    origin: Origin,
    label: String,
    adapter: CallerAdapter,
    filter: RecordFilter,
    index: Option<RecordIndex>,
}

impl VcfSource {
    /// Open a VCF file (plain, gzip/BGZF or bzip2)
    pub fn open<P: AsRef<Path>>(path: P, adapter: CallerAdapter) -> SvResult<Self> {
        let path = path.as_ref();
        // fail on a missing file here rather than on first scan
        std::fs::metadata(path)?;
        Ok(Self {
            origin: Origin::File(path.to_path_buf()),
            label: path.display().to_string(),
            adapter,
            filter: RecordFilter::default(),
            index: None,
        })
    }

    /// Call set held in memory
    pub fn from_text(text: impl Into<String>, adapter: CallerAdapter) -> Self {
        let bytes: Arc<[u8]> = Arc::from(text.into().into_bytes());
        Self {
            origin: Origin::Memory(bytes),
            label: "<memory>".to_string(),
            adapter,
            filter: RecordFilter::default(),
            index: None,
        }
    }

    /// Replace the record filter; an existing index is dropped
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self.index = None;
        self
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    /// Read the whole source once and index it
    pub fn indexed(mut self) -> SvResult<Self> {
        let records = self.scan()?.collect::<SvResult<Vec<_>>>()?;
        let index = RecordIndex::build(records, self.adapter);
        log::info!(
            "indexed {} records over {} chromosomes from {}",
            index.len(),
            index.chroms().count(),
            self.label
        );
        self.index = Some(index);
        Ok(self)
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&RecordIndex> {
        self.index.as_ref()
    }
}

impl RegionSource for VcfSource {
    fn adapter(&self) -> CallerAdapter {
        self.adapter
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn scan(&self) -> SvResult<RecordScan> {
        Ok(RecordScan::new(self.origin.open()?, self.filter.clone(), self.adapter))
    }

    fn fetch(&self, chrom: &str, start: u64, end: u64) -> SvResult<Vec<Arc<VcfRecord>>> {
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| SvError::IndexUnavailable(self.label.clone()))?;
        Ok(index.fetch(chrom, start, end))
    }

    fn header(&self) -> SvResult<VcfHeader> {
        Ok(VcfHeader::read(self.origin.open()?)?)
    }
}
