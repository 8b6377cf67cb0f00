//! VCF format adapter
//!
//! Splits VCF lines with memchr, parses them into owned [`VcfRecord`]s
//! (including the breakend ALT grammar) and writes records back out.

use crate::core::breakend::InfoValue;
use crate::core::error::RecordLocus;
use memchr::memchr;
use std::fmt;
use std::io::{self, BufRead, BufWriter, Write};

/// Zero-copy VCF record view for parsing
/// Only locates field boundaries; fields are sliced on demand
pub struct VcfRecordView<'a> {
    /// Original line bytes
    line: &'a [u8],
    /// Field boundaries (start, end) for lazy access
    field_bounds: Vec<(usize, usize)>,
}

impl<'a> VcfRecordView<'a> {
    /// Split a VCF line on tabs
    pub fn parse(line: &'a [u8]) -> Result<Self, VcfParseError> {
        if line.is_empty() {
            return Err(VcfParseError::EmptyLine);
        }

        // Find field boundaries using memchr for tab characters
        let mut field_bounds = Vec::with_capacity(10);
        let mut start_pos = 0;
        let mut pos = 0;

        while pos < line.len() {
            if let Some(tab_pos) = memchr(b'\t', &line[pos..]) {
                let end_pos = pos + tab_pos;
                field_bounds.push((start_pos, end_pos));
                start_pos = end_pos + 1;
                pos = start_pos;
            } else {
                // Last field
                field_bounds.push((start_pos, line.len()));
                break;
            }
        }

        // VCF requires at least 8 fields (CHROM, POS, ID, REF, ALT, QUAL, FILTER, INFO)
        if field_bounds.len() < 8 {
            return Err(VcfParseError::TooFewFields {
                expected: 8,
                found: field_bounds.len(),
            });
        }

        Ok(Self { line, field_bounds })
    }

    /// Get the number of fields
    pub fn field_count(&self) -> usize {
        self.field_bounds.len()
    }

    /// Get field as string slice
    pub fn field(&self, index: usize) -> Option<&'a str> {
        self.field_bounds
            .get(index)
            .and_then(|(start, end)| std::str::from_utf8(&self.line[*start..*end]).ok())
    }

    fn required(&self, index: usize, name: &'static str) -> Result<&'a str, VcfParseError> {
        self.field(index).ok_or(VcfParseError::InvalidUtf8(name))
    }
}

/// VCF parsing error
#[derive(Debug, thiserror::Error)]
pub enum VcfParseError {
    #[error("Empty line")]
    EmptyLine,

    #[error("Too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("Invalid UTF-8 in field: {0}")]
    InvalidUtf8(&'static str),

    #[error("Invalid number in field {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("Malformed breakend ALT '{alt}': {reason}")]
    InvalidBreakend { alt: String, reason: &'static str },
}

/// Mate-join breakend ALT allele, e.g. `G]chr2:321]` or `[chr1:100[T`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakend {
    /// Mate chromosome
    pub chrom: String,
    /// Mate position (1-based)
    pub pos: u64,
    /// True when the ALT starts with a bracket: the joined sequence
    /// precedes the local reference base
    pub local_orientation: bool,
    /// True when the mate is written with `[`
    pub remote_orientation: bool,
    /// Bases on the non-bracket side, reference base included
    pub connecting_sequence: String,
    /// False when the mate contig is written as `<contig>`
    pub within_main_assembly: bool,
}

impl Breakend {
    fn parse(alt: &str) -> Result<Self, VcfParseError> {
        let malformed = |reason| VcfParseError::InvalidBreakend {
            alt: alt.to_string(),
            reason,
        };

        let items: Vec<&str> = alt.split(|c| c == '[' || c == ']').collect();
        if items.len() != 3 {
            return Err(malformed("expected exactly two brackets"));
        }
        let brackets: Vec<char> = alt.chars().filter(|c| *c == '[' || *c == ']').collect();
        if brackets[0] != brackets[1] {
            return Err(malformed("mismatched bracket pair"));
        }

        let local_orientation = alt.starts_with('[') || alt.starts_with(']');
        let remote_orientation = brackets[0] == '[';
        let connecting_sequence = if local_orientation {
            if !items[0].is_empty() {
                return Err(malformed("text before leading bracket"));
            }
            items[2]
        } else {
            if !items[2].is_empty() {
                return Err(malformed("text after trailing bracket"));
            }
            items[0]
        };
        if connecting_sequence.is_empty() {
            return Err(malformed("missing reference base"));
        }

        let (contig, pos) = items[1]
            .rsplit_once(':')
            .ok_or_else(|| malformed("mate is not contig:pos"))?;
        let pos: u64 = pos
            .parse()
            .map_err(|_| malformed("mate position is not a number"))?;
        if pos == 0 {
            return Err(malformed("mate position must be >= 1"));
        }
        let (chrom, within_main_assembly) =
            match contig.strip_prefix('<').and_then(|c| c.strip_suffix('>')) {
                Some(inner) => (inner, false),
                None => (contig, true),
            };
        if chrom.is_empty() {
            return Err(malformed("empty mate contig"));
        }

        Ok(Self {
            chrom: chrom.to_string(),
            pos,
            local_orientation,
            remote_orientation,
            connecting_sequence: connecting_sequence.to_string(),
            within_main_assembly,
        })
    }
}

impl fmt::Display for Breakend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bracket = if self.remote_orientation { '[' } else { ']' };
        let mate = if self.within_main_assembly {
            format!("{}:{}", self.chrom, self.pos)
        } else {
            format!("<{}>:{}", self.chrom, self.pos)
        };
        if self.local_orientation {
            write!(f, "{b}{}{b}{}", mate, self.connecting_sequence, b = bracket)
        } else {
            write!(f, "{}{b}{}{b}", self.connecting_sequence, mate, b = bracket)
        }
    }
}

/// One ALT allele
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allele {
    /// Literal bases
    Sequence(String),
    /// `<DEL>`, `<INV>`, ... (stored without angle brackets)
    Symbolic(String),
    /// Mate-join breakend
    Breakend(Breakend),
    /// Single breakend, `.A` or `A.`
    SingleBreakend { local_orientation: bool, sequence: String },
    /// `.`
    Missing,
}

impl Allele {
    /// Parse one comma-separated ALT entry
    pub fn parse(alt: &str) -> Result<Self, VcfParseError> {
        if alt.contains('[') || alt.contains(']') {
            return Breakend::parse(alt).map(Allele::Breakend);
        }
        if alt == "." || alt.is_empty() {
            return Ok(Allele::Missing);
        }
        if let Some(seq) = alt.strip_prefix('.') {
            return Ok(Allele::SingleBreakend {
                local_orientation: true,
                sequence: seq.to_string(),
            });
        }
        if let Some(seq) = alt.strip_suffix('.') {
            return Ok(Allele::SingleBreakend {
                local_orientation: false,
                sequence: seq.to_string(),
            });
        }
        if let Some(inner) = alt.strip_prefix('<').and_then(|a| a.strip_suffix('>')) {
            return Ok(Allele::Symbolic(inner.to_string()));
        }
        Ok(Allele::Sequence(alt.to_string()))
    }

    pub fn as_breakend(&self) -> Option<&Breakend> {
        match self {
            Allele::Breakend(bnd) => Some(bnd),
            _ => None,
        }
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allele::Sequence(s) => f.write_str(s),
            Allele::Symbolic(s) => write!(f, "<{}>", s),
            Allele::Breakend(b) => write!(f, "{}", b),
            Allele::SingleBreakend { local_orientation: true, sequence } => write!(f, ".{}", sequence),
            Allele::SingleBreakend { local_orientation: false, sequence } => write!(f, "{}.", sequence),
            Allele::Missing => f.write_str("."),
        }
    }
}

/// Owned VCF data line
#[derive(Debug, Clone, PartialEq)]
pub struct VcfRecord {
    /// Line number in the source (1-based, 0 when unknown)
    pub line: usize,
    pub chrom: String,
    /// 1-based
    pub pos: u64,
    pub id: Option<String>,
    pub ref_allele: String,
    pub alts: Vec<Allele>,
    pub qual: Option<f64>,
    /// `None` for `.`, empty for `PASS`
    pub filter: Option<Vec<String>>,
    /// INFO entries in file order
    pub info: Vec<(String, InfoValue)>,
    pub format: Option<Vec<String>>,
    /// Raw sample columns
    pub samples: Vec<String>,
}

impl VcfRecord {
    /// Parse a VCF data line
    pub fn parse(line: &str, line_number: usize) -> Result<Self, VcfParseError> {
        let view = VcfRecordView::parse(line.as_bytes())?;

        let chrom = view.required(0, "CHROM")?;
        let pos_str = view.required(1, "POS")?;
        let pos: u64 = pos_str
            .parse()
            .map_err(|_| VcfParseError::InvalidNumber("POS", pos_str.to_string()))?;
        if pos == 0 {
            return Err(VcfParseError::InvalidNumber("POS", pos_str.to_string()));
        }

        let id = match view.required(2, "ID")? {
            "." => None,
            id => Some(id.to_string()),
        };
        let ref_allele = view.required(3, "REF")?.to_string();
        let alts = view
            .required(4, "ALT")?
            .split(',')
            .map(Allele::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let qual = match view.required(5, "QUAL")? {
            "." => None,
            q => match q.parse::<f64>() {
                Ok(value) if value.is_finite() => Some(value),
                _ => return Err(VcfParseError::InvalidNumber("QUAL", q.to_string())),
            },
        };

        let filter = parse_filter(view.required(6, "FILTER")?);
        let info = parse_info(view.required(7, "INFO")?);

        let format = match view.field(8) {
            None | Some(".") => None,
            Some(fmt) => Some(fmt.split(':').map(str::to_string).collect()),
        };
        let samples = (9..view.field_count())
            .map(|i| view.required(i, "SAMPLE").map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            line: line_number,
            chrom: chrom.to_string(),
            pos,
            id,
            ref_allele,
            alts,
            qual,
            filter,
            info,
            format,
            samples,
        })
    }

    /// Look up an INFO tag
    pub fn info_value(&self, key: &str) -> Option<&InfoValue> {
        self.info.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// INFO tag text value
    pub fn info_text(&self, key: &str) -> Option<&str> {
        self.info_value(key).and_then(InfoValue::as_text)
    }

    /// `SVTYPE` INFO tag
    pub fn sv_type(&self) -> Option<&str> {
        self.info_text("SVTYPE")
    }

    /// `END` INFO tag as a position
    pub fn end(&self) -> Result<Option<u64>, String> {
        match self.info_text("END") {
            None => Ok(None),
            Some(end) => end
                .parse()
                .map(Some)
                .map_err(|_| format!("END is not a position: '{}'", end)),
        }
    }

    /// Last reference base covered by the REF allele
    pub fn ref_end(&self) -> u64 {
        self.pos
            .saturating_add((self.ref_allele.len() as u64).saturating_sub(1))
    }

    pub fn is_sv(&self) -> bool {
        self.sv_type().is_some()
    }

    pub fn is_snp(&self) -> bool {
        if self.ref_allele.len() > 1 || self.alts.is_empty() {
            return false;
        }
        self.alts.iter().all(|alt| {
            matches!(alt, Allele::Sequence(s)
                if s.len() == 1 && matches!(s.as_bytes()[0].to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N' | b'*'))
        })
    }

    pub fn is_indel(&self) -> bool {
        if self.is_sv() {
            return false;
        }
        if self.ref_allele.len() > 1 {
            return true;
        }
        self.alts.iter().any(|alt| match alt {
            Allele::Missing => true,
            Allele::Sequence(s) => s.len() != self.ref_allele.len(),
            _ => false,
        })
    }

    /// Per-sample `GT` values; `.` for samples without one
    pub fn genotypes(&self) -> Vec<&str> {
        let gt_index = self
            .format
            .as_ref()
            .and_then(|fmt| fmt.iter().position(|f| f == "GT"));
        self.samples
            .iter()
            .map(|sample| {
                gt_index
                    .and_then(|i| sample.split(':').nth(i))
                    .unwrap_or(".")
            })
            .collect()
    }

    /// Location used in error reports
    pub fn locus(&self) -> RecordLocus {
        RecordLocus {
            line: self.line,
            chrom: self.chrom.clone(),
            pos: self.pos,
            id: self.id.clone().unwrap_or_else(|| ".".to_string()),
        }
    }
}

impl fmt::Display for VcfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alts: Vec<String> = self.alts.iter().map(|a| a.to_string()).collect();
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t",
            self.chrom,
            self.pos,
            self.id.as_deref().unwrap_or("."),
            self.ref_allele,
            alts.join(",")
        )?;
        match self.qual {
            Some(q) => write!(f, "{}\t", q)?,
            None => f.write_str(".\t")?,
        }
        write!(f, "{}\t{}", format_filter(self.filter.as_deref()), format_info(&self.info))?;
        if self.format.is_some() || !self.samples.is_empty() {
            match &self.format {
                Some(fmt_keys) => write!(f, "\t{}", fmt_keys.join(":"))?,
                None => f.write_str("\t.")?,
            }
            for sample in &self.samples {
                write!(f, "\t{}", sample)?;
            }
        }
        Ok(())
    }
}

/// Parse a FILTER column
pub fn parse_filter(filter: &str) -> Option<Vec<String>> {
    match filter {
        "." => None,
        "PASS" => Some(Vec::new()),
        tags => Some(tags.split(';').map(str::to_string).collect()),
    }
}

/// Format a FILTER column
pub fn format_filter(filter: Option<&[String]>) -> String {
    match filter {
        None => ".".to_string(),
        Some([]) => "PASS".to_string(),
        Some(tags) => tags.join(";"),
    }
}

/// Parse an INFO column into ordered entries
pub fn parse_info(info: &str) -> Vec<(String, InfoValue)> {
    if info == "." || info.is_empty() {
        return Vec::new();
    }
    info.split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, ".")) => (key.to_string(), InfoValue::Null),
            Some((key, value)) => (key.to_string(), InfoValue::Text(value.to_string())),
            None => (entry.to_string(), InfoValue::Flag),
        })
        .collect()
}

/// Format INFO entries
pub fn format_info<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a (String, InfoValue)>,
{
    let parts: Vec<String> = entries
        .into_iter()
        .map(|(key, value)| format_info_entry(key, value))
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join(";")
    }
}

pub(crate) fn format_info_entry(key: &str, value: &InfoValue) -> String {
    match value {
        InfoValue::Flag => key.to_string(),
        InfoValue::Text(v) => format!("{}={}", key, v),
        InfoValue::Null => format!("{}=.", key),
    }
}

/// Meta-information and column header lines of a VCF file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcfHeader {
    pub lines: Vec<String>,
}

impl VcfHeader {
    /// Read the leading `#` lines of a VCF stream
    pub fn read<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            if !line.starts_with('#') {
                break;
            }
            lines.push(line);
        }
        Ok(Self { lines })
    }

    /// Sample names from the `#CHROM` line
    pub fn sample_names(&self) -> Vec<&str> {
        self.lines
            .iter()
            .find(|l| l.starts_with("#CHROM"))
            .map(|l| l.split('\t').skip(9).collect())
            .unwrap_or_default()
    }
}

/// Minimal VCF writer: header lines followed by re-serialized records
pub struct VcfWriter<W: Write> {
    inner: BufWriter<W>,
}

impl<W: Write> VcfWriter<W> {
    /// Create a writer and emit the header
    pub fn new(inner: W, header: &VcfHeader) -> io::Result<Self> {
        let mut inner = BufWriter::with_capacity(128 * 1024, inner);
        for line in &header.lines {
            writeln!(inner, "{}", line)?;
        }
        Ok(Self { inner })
    }

    pub fn write_record(&mut self, record: &VcfRecord) -> io::Result<()> {
        writeln!(self.inner, "{}", record)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
