//! Per-kind canonicalization rules shared by every caller
//!
//! Callers differ only in the tag names of their [`TagScheme`]; the
//! breakend geometry below is identical for all of them.

use super::TagScheme;
use crate::core::breakend::{GeneralFields, InfoValue, Junction, MetaInfo, Strand};
use crate::core::classify::VariantKind;
use crate::core::error::{SvError, SvResult};
use crate::formats::vcf::{Allele, VcfRecord};

/// Strand pair for a mate-join breakend, from the local and remote
/// orientation flags of its ALT allele
///
/// # Examples
/// ```
/// use sv_concord::adapter::orientation_strands;
/// use sv_concord::core::Strand;
/// assert_eq!(orientation_strands(true, true), (Strand::Minus, Strand::Plus));
/// assert_eq!(orientation_strands(false, false), (Strand::Plus, Strand::Minus));
/// assert_eq!(orientation_strands(true, false), (Strand::Plus, Strand::Plus));
/// ```
pub fn orientation_strands(local_orientation: bool, remote_orientation: bool) -> (Strand, Strand) {
    match (local_orientation, remote_orientation) {
        (true, true) => (Strand::Minus, Strand::Plus),
        (false, false) => (Strand::Plus, Strand::Minus),
        _ => (Strand::Plus, Strand::Plus),
    }
}

/// Identifier, quality, filter and read support of a record
pub(crate) fn general_fields(record: &VcfRecord, scheme: &TagScheme) -> SvResult<GeneralFields> {
    Ok(GeneralFields {
        id: record_id(record),
        qual: record.qual,
        filter: record.filter.clone(),
        span_reads: support_count(record, scheme.span_reads_tag)?,
        junc_reads: support_count(record, scheme.junc_reads_tag)?,
    })
}

/// Record ID, or `CHROM:POS` when the ID column is empty
pub(crate) fn record_id(record: &VcfRecord) -> String {
    record
        .id
        .clone()
        .unwrap_or_else(|| format!("{}:{}", record.chrom, record.pos))
}

fn support_count(record: &VcfRecord, tag: &str) -> SvResult<Option<u32>> {
    match record.info_value(tag).and_then(InfoValue::first) {
        None => Ok(None),
        Some(count) => count.parse().map(Some).map_err(|_| {
            SvError::parse(
                record.locus(),
                format!("{} is not a read count: '{}'", tag, count),
            )
        }),
    }
}

/// Far end of a record's span
///
/// Kinds that need `END` fail without it; the others fall back to `POS`.
pub(crate) fn span_end(record: &VcfRecord, kind: VariantKind) -> SvResult<u64> {
    if kind.requires_end() {
        required_end(record, kind)
    } else {
        Ok(optional_end(record)?.unwrap_or(record.pos))
    }
}

/// `END` tag for kinds that cannot be canonicalized without it
pub(crate) fn required_end(record: &VcfRecord, kind: VariantKind) -> SvResult<u64> {
    optional_end(record)?.ok_or_else(|| SvError::MissingField {
        locus: record.locus(),
        kind,
        field: "END",
    })
}

/// `END` when present; the last coordinate is reserved so that `END + 1`
/// stays representable
fn optional_end(record: &VcfRecord) -> SvResult<Option<u64>> {
    match record.end() {
        Ok(Some(u64::MAX)) => Err(SvError::parse(
            record.locus(),
            format!("END is out of range: {}", u64::MAX),
        )),
        Ok(end) => Ok(end),
        Err(message) => Err(SvError::parse(record.locus(), message)),
    }
}

fn same_chrom(record: &VcfRecord, pos_5p: u64, strand_5p: Strand, pos_3p: u64, strand_3p: Strand) -> Junction {
    Junction {
        chrom_5p: record.chrom.clone(),
        bkpos_5p: pos_5p,
        strand_5p,
        chrom_3p: record.chrom.clone(),
        bkpos_3p: pos_3p,
        strand_3p,
        inner_ins: None,
    }
}

/// DEL, and kinds without a rule of their own: `POS` joins `END`
pub(crate) fn deletion_junction(record: &VcfRecord, end: u64) -> Junction {
    same_chrom(record, record.pos, Strand::Plus, end, Strand::Plus)
}

/// DUP / tandem DUP: the duplicated segment's end loops back to its start
pub(crate) fn duplication_junction(record: &VcfRecord, end: u64) -> Junction {
    same_chrom(record, end, Strand::Plus, record.pos, Strand::Plus)
}

/// The two junctions of an inversion: `(POS-1 +, END -)` and
/// `(POS -, END+1 +)`
pub(crate) fn inversion_junctions(record: &VcfRecord, end: u64) -> [Junction; 2] {
    [
        same_chrom(record, record.pos - 1, Strand::Plus, end, Strand::Minus),
        same_chrom(record, record.pos, Strand::Minus, end + 1, Strand::Plus),
    ]
}

/// Outer coordinates of an inversion, used to compare inversions as a whole
pub(crate) fn inversion_outline(record: &VcfRecord, end: u64) -> Junction {
    same_chrom(record, record.pos, Strand::Plus, end, Strand::Plus)
}

/// Junction of a mate-join breakend; the flag is the ALT's local
/// orientation
pub(crate) fn breakend_junction(record: &VcfRecord) -> SvResult<(Junction, bool)> {
    let alt = record
        .alts
        .first()
        .and_then(Allele::as_breakend)
        .ok_or_else(|| {
            let alts: Vec<String> = record.alts.iter().map(|a| a.to_string()).collect();
            SvError::parse(
                record.locus(),
                format!("BND ALT is not a mate breakend: '{}'", alts.join(",")),
            )
        })?;

    let (strand_5p, strand_3p) = orientation_strands(alt.local_orientation, alt.remote_orientation);
    let mut bases = alt.connecting_sequence.chars();

    let junction = if alt.local_orientation {
        bases.next_back();
        Junction {
            chrom_5p: record.chrom.clone(),
            bkpos_5p: record.pos,
            strand_5p,
            chrom_3p: alt.chrom.clone(),
            bkpos_3p: alt.pos,
            strand_3p,
            inner_ins: non_empty(bases.as_str()),
        }
    } else {
        bases.next();
        Junction {
            chrom_5p: alt.chrom.clone(),
            bkpos_5p: alt.pos,
            strand_5p,
            chrom_3p: record.chrom.clone(),
            bkpos_3p: record.pos,
            strand_3p,
            inner_ins: non_empty(bases.as_str()),
        }
    };
    Ok((junction, alt.local_orientation))
}

fn non_empty(seq: &str) -> Option<String> {
    if seq.is_empty() {
        None
    } else {
        Some(seq.to_string())
    }
}

/// Build the canonical metadata of a record
///
/// Structural tags are dropped, paired confidence tags trade places when
/// `swap_confidence` is set, and `GT` / `TOOL` are added. Inversions get
/// a null `MATEID`.
pub(crate) fn remap_meta(
    record: &VcfRecord,
    scheme: &TagScheme,
    kind: VariantKind,
    swap_confidence: bool,
) -> MetaInfo {
    let present = |tag: &str| record.info_value(tag).is_some();
    let partner = |key: &str| -> Option<&'static str> {
        if !swap_confidence {
            return None;
        }
        scheme.paired_tags.iter().find_map(|&(left, right)| {
            if key == left && present(right) {
                Some(right)
            } else if key == right && present(left) {
                Some(left)
            } else {
                None
            }
        })
    };

    let copied = record
        .info
        .iter()
        .filter(|(key, _)| !scheme.structural_tags.contains(&key.as_str()))
        .map(|(key, value)| {
            let key = partner(key).map(str::to_string).unwrap_or_else(|| key.clone());
            (key, value.clone())
        });

    let added = [
        ("GT".to_string(), InfoValue::Text(record.genotypes().join(","))),
        ("TOOL".to_string(), InfoValue::Text(scheme.tool.label().to_string())),
    ];
    let mate_reset = (kind == VariantKind::Inv).then(|| ("MATEID".to_string(), InfoValue::Null));

    copied.chain(added).chain(mate_reset).collect()
}
