//! Canonical breakend representation
//!
//! Every caller adapter converges on [`CanonicalBreakend`]: a pair of
//! (chromosome, position, strand) endpoints plus the metadata shared by
//! the source record.

use std::collections::BTreeMap;
use std::fmt;

/// Strand orientation of a breakend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    /// Get the complement strand
    ///
    /// # Examples
    /// ```
    /// use sv_concord::core::Strand;
    /// assert_eq!(Strand::Plus.complement(), Strand::Minus);
    /// assert_eq!(Strand::Minus.complement(), Strand::Plus);
    /// ```
    pub fn complement(&self) -> Self {
        match self {
            Strand::Plus => Strand::Minus,
            Strand::Minus => Strand::Plus,
        }
    }

    /// Parse strand from char
    ///
    /// # Examples
    /// ```
    /// use sv_concord::core::Strand;
    /// assert_eq!(Strand::from_char('+'), Some(Strand::Plus));
    /// assert_eq!(Strand::from_char('-'), Some(Strand::Minus));
    /// assert_eq!(Strand::from_char('.'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Plus),
            '-' => Some(Strand::Minus),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Variant calling tool a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTool {
    Lumpy,
    Longranger,
}

impl SourceTool {
    /// Label written to the `TOOL` tag and the flat form
    pub fn label(&self) -> &'static str {
        match self {
            SourceTool::Lumpy => "Lumpy",
            SourceTool::Longranger => "Longranger",
        }
    }

    /// Parse a tool label, ignoring case
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "lumpy" => Some(SourceTool::Lumpy),
            "longranger" => Some(SourceTool::Longranger),
            _ => None,
        }
    }
}

impl fmt::Display for SourceTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value of a metadata tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InfoValue {
    /// Tag present without a value
    Flag,
    /// Raw value text; multi-valued tags keep their commas
    Text(String),
    /// Explicitly unset value
    Null,
}

impl InfoValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InfoValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// First comma-separated value, if any
    pub fn first(&self) -> Option<&str> {
        self.as_text().and_then(|s| s.split(',').next())
    }
}

/// Tool-specific metadata; iteration order is sorted by tag name
pub type MetaInfo = BTreeMap<String, InfoValue>;

/// Downstream annotation payload, filled outside this crate
pub type AnnoInfo = BTreeMap<String, String>;

/// Positions, strands and inserted sequence of a junction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junction {
    pub chrom_5p: String,
    pub bkpos_5p: u64,
    pub strand_5p: Strand,
    pub chrom_3p: String,
    pub bkpos_3p: u64,
    pub strand_3p: Strand,
    pub inner_ins: Option<String>,
}

/// Fields every adapter extracts the same way, modulo tag names
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralFields {
    pub id: String,
    pub qual: Option<f64>,
    pub filter: Option<Vec<String>>,
    pub span_reads: Option<u32>,
    pub junc_reads: Option<u32>,
}

/// Tool-independent breakend pair
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalBreakend {
    pub id: String,
    pub chrom_5p: String,
    /// 1-based
    pub bkpos_5p: u64,
    pub strand_5p: Strand,
    pub chrom_3p: String,
    /// 1-based
    pub bkpos_3p: u64,
    pub strand_3p: Strand,
    pub inner_ins: Option<String>,
    pub qual: Option<f64>,
    /// `Some(vec![])` means passed all filters, `None` means not evaluated
    pub filter: Option<Vec<String>>,
    pub span_reads: Option<u32>,
    pub junc_reads: Option<u32>,
    pub meta_info: MetaInfo,
    pub anno_info: Option<AnnoInfo>,
    pub source_tool: SourceTool,
}

impl CanonicalBreakend {
    /// Assemble a record from its parts
    pub fn from_parts(
        junction: Junction,
        general: GeneralFields,
        meta_info: MetaInfo,
        anno_info: Option<AnnoInfo>,
        source_tool: SourceTool,
    ) -> Self {
        Self {
            id: general.id,
            chrom_5p: junction.chrom_5p,
            bkpos_5p: junction.bkpos_5p,
            strand_5p: junction.strand_5p,
            chrom_3p: junction.chrom_3p,
            bkpos_3p: junction.bkpos_3p,
            strand_3p: junction.strand_3p,
            inner_ins: junction.inner_ins,
            qual: general.qual,
            filter: general.filter,
            span_reads: general.span_reads,
            junc_reads: general.junc_reads,
            meta_info,
            anno_info,
            source_tool,
        }
    }

    /// Check the structural invariants: non-empty chromosomes and
    /// positions >= 1
    pub fn validate(&self) -> Result<(), String> {
        if self.chrom_5p.is_empty() || self.chrom_3p.is_empty() {
            return Err("empty breakend chromosome".to_string());
        }
        if self.bkpos_5p == 0 || self.bkpos_3p == 0 {
            return Err(format!(
                "breakend position must be >= 1, got {} and {}",
                self.bkpos_5p, self.bkpos_3p
            ));
        }
        Ok(())
    }

    /// Strict equality over every field except the identifier and the
    /// source tool (tool identity is still compared through `TOOL`).
    pub fn same_event(&self, other: &CanonicalBreakend) -> bool {
        self.same_junction(other)
            && self.inner_ins == other.inner_ins
            && self.qual == other.qual
            && self.filter == other.filter
            && self.span_reads == other.span_reads
            && self.junc_reads == other.junc_reads
            && self.meta_info == other.meta_info
            && self.anno_info == other.anno_info
    }

    /// Equality of the two endpoints only
    pub fn same_junction(&self, other: &CanonicalBreakend) -> bool {
        self.chrom_5p == other.chrom_5p
            && self.bkpos_5p == other.bkpos_5p
            && self.strand_5p == other.strand_5p
            && self.chrom_3p == other.chrom_3p
            && self.bkpos_3p == other.bkpos_3p
            && self.strand_3p == other.strand_3p
    }

    /// Whether the record passed all filters
    pub fn is_pass(&self) -> bool {
        matches!(&self.filter, Some(f) if f.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pos_5p: u64, pos_3p: u64) -> CanonicalBreakend {
        CanonicalBreakend::from_parts(
            Junction {
                chrom_5p: "chr1".to_string(),
                bkpos_5p: pos_5p,
                strand_5p: Strand::Plus,
                chrom_3p: "chr1".to_string(),
                bkpos_3p: pos_3p,
                strand_3p: Strand::Plus,
                inner_ins: None,
            },
            GeneralFields {
                id: "1".to_string(),
                qual: Some(30.0),
                filter: Some(vec![]),
                span_reads: Some(4),
                junc_reads: None,
            },
            MetaInfo::new(),
            None,
            SourceTool::Lumpy,
        )
    }

    #[test]
    fn test_strand_display() {
        assert_eq!(Strand::Plus.to_string(), "+");
        assert_eq!(Strand::Minus.to_string(), "-");
    }

    #[test]
    fn test_tool_labels() {
        assert_eq!(SourceTool::from_label("LUMPY"), Some(SourceTool::Lumpy));
        assert_eq!(SourceTool::from_label("Longranger"), Some(SourceTool::Longranger));
        assert_eq!(SourceTool::from_label("delly"), None);
    }

    #[test]
    fn test_same_event_ignores_id_only() {
        let a = record(100, 200);
        let mut b = record(100, 200);
        b.id = "2".to_string();
        assert!(a.same_event(&b));
        assert_ne!(a, b);

        b.qual = Some(31.0);
        assert!(!a.same_event(&b));
        assert!(a.same_junction(&b));
    }

    #[test]
    fn test_validate_rejects_zero_position() {
        assert!(record(100, 200).validate().is_ok());
        assert!(record(0, 200).validate().is_err());
    }

    #[test]
    fn test_info_value_first() {
        assert_eq!(InfoValue::Text("-10,10".to_string()).first(), Some("-10"));
        assert_eq!(InfoValue::Flag.first(), None);
        assert_eq!(InfoValue::Null.as_text(), None);
    }

    #[test]
    fn test_is_pass() {
        let mut r = record(1, 2);
        assert!(r.is_pass());
        r.filter = None;
        assert!(!r.is_pass());
        r.filter = Some(vec!["LowQual".to_string()]);
        assert!(!r.is_pass());
    }
}
