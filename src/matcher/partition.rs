//! Writing the two partitions of a comparison

use super::{Tag, Tagged};
use crate::core::error::SvResult;
use crate::formats::sv::SvWriter;
use crate::formats::vcf::{VcfHeader, VcfRecord, VcfWriter};
use std::io::{self, Write};
use std::sync::Arc;

/// Output format of a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Source records, re-serialized with the source header
    #[default]
    Vcf,
    /// Canonical records in the flat text form
    Sv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Vcf => "vcf",
            OutputFormat::Sv => "sv",
        }
    }
}

/// Sink for one partition
pub enum PartitionWriter<W: Write> {
    Vcf {
        writer: VcfWriter<W>,
        /// Last source record written, so that an inversion's two
        /// sub-records emit their source line once
        last: Option<Arc<VcfRecord>>,
    },
    Sv(SvWriter<W>),
}

impl<W: Write> PartitionWriter<W> {
    pub fn new(format: OutputFormat, inner: W, header: &VcfHeader) -> io::Result<Self> {
        match format {
            OutputFormat::Vcf => Ok(PartitionWriter::Vcf {
                writer: VcfWriter::new(inner, header)?,
                last: None,
            }),
            OutputFormat::Sv => Ok(PartitionWriter::Sv(SvWriter::new(inner)?)),
        }
    }

    pub fn write(&mut self, tagged: &Tagged) -> io::Result<()> {
        match self {
            PartitionWriter::Vcf { writer, last } => {
                let repeated = last
                    .as_ref()
                    .is_some_and(|prev| Arc::ptr_eq(prev, &tagged.record));
                if !repeated {
                    writer.write_record(&tagged.record)?;
                    *last = Some(Arc::clone(&tagged.record));
                }
                Ok(())
            }
            PartitionWriter::Sv(writer) => writer.write_record(&tagged.breakend),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            PartitionWriter::Vcf { writer, .. } => writer.flush(),
            PartitionWriter::Sv(writer) => writer.flush(),
        }
    }
}

/// Comparison statistics, counted in canonical records
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompareStats {
    pub total: usize,
    pub intersection: usize,
    pub difference: usize,
}

/// Drain a comparison into its two partitions
///
/// Stops at the first error; whatever was written before it is flushed.
pub fn write_partitions<I, W>(
    comparison: I,
    intersection: &mut PartitionWriter<W>,
    difference: &mut PartitionWriter<W>,
) -> SvResult<CompareStats>
where
    I: IntoIterator<Item = SvResult<Tagged>>,
    W: Write,
{
    let mut stats = CompareStats::default();
    let mut outcome = Ok(());

    for item in comparison {
        let tagged = match item {
            Ok(tagged) => tagged,
            Err(err) => {
                outcome = Err(err);
                break;
            }
        };
        stats.total += 1;
        match tagged.tag {
            Tag::Intersection => {
                stats.intersection += 1;
                intersection.write(&tagged)?;
            }
            Tag::Difference => {
                stats.difference += 1;
                difference.write(&tagged)?;
            }
        }
    }

    intersection.flush()?;
    difference.flush()?;
    outcome.map(|_| stats)
}
