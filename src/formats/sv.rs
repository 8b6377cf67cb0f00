//! Flat breakend text form
//!
//! One tab-separated line per [`CanonicalBreakend`], preceded by a single
//! `#` header line. Absent values are written as `.`.

use crate::adapter::CallerAdapter;
use crate::core::breakend::{AnnoInfo, CanonicalBreakend, InfoValue, MetaInfo, SourceTool, Strand};
use crate::core::error::{SvError, SvResult};
use crate::core::io::LineIterator;
use crate::core::source::RegionSource;
use crate::formats::vcf::{format_filter, format_info_entry, parse_filter};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Column names of the flat form
pub const COLUMNS: [&str; 15] = [
    "id",
    "chrom_5p",
    "bkpos_5p",
    "strand_5p",
    "chrom_3p",
    "bkpos_3p",
    "strand_3p",
    "inner_ins",
    "span_reads",
    "junc_reads",
    "qual",
    "filter",
    "source_tool",
    "meta_info",
    "anno_info",
];

/// Records per rayon work unit in [`convert_calls`]
const CHUNK_SIZE: usize = 4096;

/// Flat-form line errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SvParseError {
    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Empty {0} field")]
    EmptyField(&'static str),

    #[error("Invalid {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid strand: '{0}'")]
    InvalidStrand(String),

    #[error("Unknown source tool: '{0}'")]
    UnknownTool(String),
}

/// Header line of the flat form
pub fn header_line() -> String {
    format!("#{}", COLUMNS.join("\t"))
}

fn or_dot<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| ".".to_string())
}

fn format_meta(meta: &MetaInfo) -> String {
    if meta.is_empty() {
        return ".".to_string();
    }
    meta.iter()
        .map(|(key, value)| format_info_entry(key, value))
        .collect::<Vec<_>>()
        .join(";")
}

fn format_anno(anno: Option<&AnnoInfo>) -> String {
    match anno {
        Some(anno) if !anno.is_empty() => anno
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(";"),
        _ => ".".to_string(),
    }
}

/// Serialize one record, without a line ending
pub fn format_sv_line(record: &CanonicalBreakend) -> String {
    [
        record.id.clone(),
        record.chrom_5p.clone(),
        record.bkpos_5p.to_string(),
        record.strand_5p.to_string(),
        record.chrom_3p.clone(),
        record.bkpos_3p.to_string(),
        record.strand_3p.to_string(),
        or_dot(record.inner_ins.as_deref()),
        or_dot(record.span_reads),
        or_dot(record.junc_reads),
        or_dot(record.qual),
        format_filter(record.filter.as_deref()),
        record.source_tool.label().to_string(),
        format_meta(&record.meta_info),
        format_anno(record.anno_info.as_ref()),
    ]
    .join("\t")
}

fn optional(field: &str) -> Option<&str> {
    match field {
        "." => None,
        value => Some(value),
    }
}

fn number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, SvParseError> {
    value.parse().map_err(|_| SvParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn optional_number<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> Result<Option<T>, SvParseError> {
    optional(value).map(|v| number(field, v)).transpose()
}

/// Quality scores must be finite so records stay equal to themselves
fn quality(value: &str) -> Result<Option<f64>, SvParseError> {
    match optional_number::<f64>("qual", value)? {
        Some(q) if !q.is_finite() => Err(SvParseError::InvalidNumber {
            field: "qual",
            value: value.to_string(),
        }),
        q => Ok(q),
    }
}

fn strand(value: &str) -> Result<Strand, SvParseError> {
    let mut chars = value.chars();
    match (chars.next().and_then(Strand::from_char), chars.next()) {
        (Some(strand), None) => Ok(strand),
        _ => Err(SvParseError::InvalidStrand(value.to_string())),
    }
}

fn non_empty(name: &'static str, value: &str) -> Result<String, SvParseError> {
    if value.is_empty() {
        Err(SvParseError::EmptyField(name))
    } else {
        Ok(value.to_string())
    }
}

fn parse_meta(field: &str) -> MetaInfo {
    if field == "." {
        return MetaInfo::new();
    }
    field
        .split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, ".")) => (key.to_string(), InfoValue::Null),
            Some((key, value)) => (key.to_string(), InfoValue::Text(value.to_string())),
            None => (entry.to_string(), InfoValue::Flag),
        })
        .collect()
}

fn parse_anno(field: &str) -> Option<AnnoInfo> {
    optional(field).map(|field| {
        field
            .split(';')
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (entry.to_string(), String::new()),
            })
            .collect()
    })
}

/// Parse one flat-form line
pub fn parse_sv_line(line: &str) -> Result<CanonicalBreakend, SvParseError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != COLUMNS.len() {
        return Err(SvParseError::FieldCount {
            expected: COLUMNS.len(),
            found: fields.len(),
        });
    }

    let source_tool = SourceTool::from_label(fields[12])
        .ok_or_else(|| SvParseError::UnknownTool(fields[12].to_string()))?;

    Ok(CanonicalBreakend {
        id: non_empty("id", fields[0])?,
        chrom_5p: non_empty("chrom_5p", fields[1])?,
        bkpos_5p: number("bkpos_5p", fields[2])?,
        strand_5p: strand(fields[3])?,
        chrom_3p: non_empty("chrom_3p", fields[4])?,
        bkpos_3p: number("bkpos_3p", fields[5])?,
        strand_3p: strand(fields[6])?,
        inner_ins: optional(fields[7]).map(str::to_string),
        span_reads: optional_number("span_reads", fields[8])?,
        junc_reads: optional_number("junc_reads", fields[9])?,
        qual: quality(fields[10])?,
        filter: parse_filter(fields[11]),
        source_tool,
        meta_info: parse_meta(fields[13]),
        anno_info: parse_anno(fields[14]),
    })
}

/// Flat-form writer; the header line is written on creation
pub struct SvWriter<W: Write> {
    inner: BufWriter<W>,
}

impl<W: Write> SvWriter<W> {
    pub fn new(inner: W) -> io::Result<Self> {
        let mut inner = BufWriter::with_capacity(128 * 1024, inner);
        writeln!(inner, "{}", header_line())?;
        Ok(Self { inner })
    }

    pub fn write_record(&mut self, record: &CanonicalBreakend) -> io::Result<()> {
        writeln!(self.inner, "{}", format_sv_line(record))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Flat-form reader; `#` lines and blank lines are skipped
pub struct SvReader<R: BufRead> {
    lines: LineIterator<R>,
}

impl<R: BufRead> SvReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: LineIterator::new(reader),
        }
    }
}

impl<R: BufRead> Iterator for SvReader<R> {
    type Item = SvResult<CanonicalBreakend>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line_number = self.lines.line_number() + 1;
            let line = match self.lines.next_line()? {
                Ok(line) => line,
                Err(err) => return Some(Err(SvError::Io(err))),
            };
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Some(parse_sv_line(line).map_err(|source| SvError::InvalidSvLine {
                line: line_number,
                source,
            }));
        }
    }
}

/// Statistics of a call-set conversion
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    /// Source records read
    pub total: usize,
    /// Canonical records written
    pub written: usize,
    /// Source records that failed to canonicalize
    pub failed: usize,
}

/// Canonicalize every record of `source` into the flat form at `output`
///
/// Records that fail to canonicalize are written with their error to
/// `<output>.fail`. Output order follows input order.
pub fn convert_calls<S: RegionSource + ?Sized, P: AsRef<Path>>(
    source: &S,
    output: P,
    threads: usize,
) -> SvResult<ConversionStats> {
    let records = source.scan()?.collect::<SvResult<Vec<_>>>()?;
    let adapter: CallerAdapter = source.adapter();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| {
            SvError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to create thread pool: {}", e),
            ))
        })?;

    let results: Vec<Vec<Result<Vec<CanonicalBreakend>, String>>> = pool.install(|| {
        records
            .par_chunks(CHUNK_SIZE)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|record| {
                        adapter
                            .to_breakends(record)
                            .map_err(|err| format!("{}\t{}", record, err))
                    })
                    .collect()
            })
            .collect()
    });

    let output = output.as_ref();
    let mut fail_path = output.as_os_str().to_owned();
    fail_path.push(".fail");

    let mut writer = SvWriter::new(File::create(output)?)?;
    let mut fail_file = BufWriter::new(File::create(&fail_path)?);
    let mut stats = ConversionStats {
        total: records.len(),
        ..ConversionStats::default()
    };

    for result in results.into_iter().flatten() {
        match result {
            Ok(breakends) => {
                for breakend in &breakends {
                    writer.write_record(breakend)?;
                }
                stats.written += breakends.len();
            }
            Err(line) => {
                log::warn!("{}", line);
                writeln!(fail_file, "{}", line)?;
                stats.failed += 1;
            }
        }
    }
    writer.flush()?;
    fail_file.flush()?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::VcfSource;

    fn sample() -> CanonicalBreakend {
        let mut meta = MetaInfo::new();
        meta.insert("TOOL".to_string(), InfoValue::Text("Lumpy".to_string()));
        meta.insert("IMPRECISE".to_string(), InfoValue::Flag);
        meta.insert("MATEID".to_string(), InfoValue::Null);
        CanonicalBreakend {
            id: "7".to_string(),
            chrom_5p: "chr1".to_string(),
            bkpos_5p: 100,
            strand_5p: Strand::Plus,
            chrom_3p: "chr2".to_string(),
            bkpos_3p: 500,
            strand_3p: Strand::Minus,
            inner_ins: Some("AC".to_string()),
            qual: Some(12.5),
            filter: Some(vec![]),
            span_reads: Some(3),
            junc_reads: None,
            meta_info: meta,
            anno_info: None,
            source_tool: SourceTool::Lumpy,
        }
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_sv_line(&sample()),
            "7\tchr1\t100\t+\tchr2\t500\t-\tAC\t3\t.\t12.5\tPASS\tLumpy\tIMPRECISE;MATEID=.;TOOL=Lumpy\t."
        );
    }

    #[test]
    fn test_parse_line() {
        let parsed = parse_sv_line(&format_sv_line(&sample())).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_sv_line("1\tchr1\t100"),
            Err(SvParseError::FieldCount { expected: 15, found: 3 })
        ));
        let line = format!("{}\textra", format_sv_line(&sample()));
        assert_eq!(
            parse_sv_line(&line),
            Err(SvParseError::FieldCount { expected: 15, found: 16 })
        );
        for qual in ["nan", "inf"] {
            let line = format_sv_line(&sample()).replace("\t12.5\t", &format!("\t{}\t", qual));
            assert_eq!(
                parse_sv_line(&line),
                Err(SvParseError::InvalidNumber {
                    field: "qual",
                    value: qual.to_string()
                })
            );
        }
        let line = format_sv_line(&sample()).replace("\t+\t", "\t*\t");
        assert_eq!(parse_sv_line(&line), Err(SvParseError::InvalidStrand("*".to_string())));
        let line = format_sv_line(&sample()).replace("Lumpy\tIMPRECISE", "Delly\tIMPRECISE");
        assert_eq!(parse_sv_line(&line), Err(SvParseError::UnknownTool("Delly".to_string())));
    }

    #[test]
    fn test_reader_reports_line() {
        let text = format!("{}\n{}\nbad line\n", header_line(), format_sv_line(&sample()));
        let mut reader = SvReader::new(text.as_bytes());
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(
            reader.next(),
            Some(Err(SvError::InvalidSvLine { line: 3, .. }))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_writer_emits_header() {
        let mut buf = Vec::new();
        {
            let mut writer = SvWriter::new(&mut buf).unwrap();
            writer.write_record(&sample()).unwrap();
            writer.flush().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("#id\tchrom_5p"));
        assert!(lines.next().unwrap().starts_with("7\tchr1"));
    }

    #[test]
    fn test_convert_calls() -> SvResult<()> {
        let text = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
chr1\t100\tinv\tN\t<INV>\t.\t.\tSVTYPE=INV;END=200\n\
chr1\t300\tbad\tN\t<DEL>\t.\t.\tSVTYPE=DEL\n\
chr1\t500\tdel\tN\t<DEL>\t.\t.\tSVTYPE=DEL;END=700\n";
        let source = VcfSource::from_text(text, CallerAdapter::Lumpy);
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("calls.sv");

        let stats = convert_calls(&source, &output, 2)?;
        assert_eq!(stats, ConversionStats { total: 3, written: 3, failed: 1 });

        let ids: Vec<String> = SvReader::new(io::BufReader::new(File::open(&output)?))
            .map(|r| r.map(|b| b.id))
            .collect::<SvResult<_>>()?;
        assert_eq!(ids, vec!["inv.1_1", "inv.2_1", "del"]);

        let failures = std::fs::read_to_string(dir.path().join("calls.sv.fail"))?;
        assert!(failures.starts_with("chr1\t300\tbad"));
        assert!(failures.contains("missing END"));
        Ok(())
    }
}
