//! Property-based tests for caller adapters
//!
//! Breakend geometry per variant kind, strand algebra, mate-pair
//! resolution and metadata remapping.

use proptest::prelude::*;
use sv_concord::adapter::orientation_strands;
use sv_concord::core::{InfoValue, SourceTool, Strand, SvError};
use sv_concord::formats::VcfRecord;
use sv_concord::CallerAdapter;

/// Generate a chromosome name
fn arb_chrom() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u8..=22).prop_map(|n| format!("chr{}", n)),
        Just("chrX".to_string()),
    ]
}

fn arb_adapter() -> impl Strategy<Value = CallerAdapter> {
    prop_oneof![Just(CallerAdapter::Lumpy), Just(CallerAdapter::Longranger)]
}

/// Generate a (POS, END) pair with POS >= 2
fn arb_span() -> impl Strategy<Value = (u64, u64)> {
    (2u64..10_000_000, 1u64..100_000).prop_map(|(pos, len)| (pos, pos + len))
}

fn parse(line: &str) -> VcfRecord {
    VcfRecord::parse(line, 1).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Deletions join POS to END on the plus strand
    #[test]
    fn prop_deletion_geometry(chrom in arb_chrom(), (pos, end) in arb_span(), adapter in arb_adapter()) {
        let r = parse(&format!("{}\t{}\td\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END={}", chrom, pos, end));
        let out = adapter.to_breakends(&r).unwrap();
        prop_assert_eq!(out.len(), 1);
        let b = &out[0];
        prop_assert_eq!(&b.chrom_5p, &chrom);
        prop_assert_eq!(&b.chrom_3p, &chrom);
        prop_assert_eq!((b.bkpos_5p, b.bkpos_3p), (pos, end));
        prop_assert_eq!((b.strand_5p, b.strand_3p), (Strand::Plus, Strand::Plus));
        prop_assert_eq!(b.source_tool, adapter.tool());
    }

    /// Duplications, tandem or not, swap the breakend order
    #[test]
    fn prop_duplication_geometry(
        chrom in arb_chrom(),
        (pos, end) in arb_span(),
        tandem in any::<bool>(),
        adapter in arb_adapter(),
    ) {
        let svtype = if tandem { "DUP:TANDEM" } else { "DUP" };
        let r = parse(&format!("{}\t{}\td\tN\t<{}>\t.\tPASS\tSVTYPE={};END={}", chrom, pos, svtype, svtype, end));
        let b = &adapter.to_breakends(&r).unwrap()[0];
        prop_assert_eq!((b.bkpos_5p, b.bkpos_3p), (end, pos));
        prop_assert_eq!((b.strand_5p, b.strand_3p), (Strand::Plus, Strand::Plus));
    }

    /// Inversions always yield two junctions around the inverted segment
    #[test]
    fn prop_inversion_decomposition(chrom in arb_chrom(), (pos, end) in arb_span(), adapter in arb_adapter()) {
        let r = parse(&format!("{}\t{}\tinv\tN\t<INV>\t.\tPASS\tSVTYPE=INV;END={};MATEID=x", chrom, pos, end));
        let out = adapter.to_breakends(&r).unwrap();
        prop_assert_eq!(out.len(), 2);
        prop_assert_eq!((out[0].bkpos_5p, out[0].bkpos_3p), (pos - 1, end));
        prop_assert_eq!((out[0].strand_5p, out[0].strand_3p), (Strand::Plus, Strand::Minus));
        prop_assert_eq!((out[1].bkpos_5p, out[1].bkpos_3p), (pos, end + 1));
        prop_assert_eq!((out[1].strand_5p, out[1].strand_3p), (Strand::Minus, Strand::Plus));
        prop_assert_eq!(&out[0].id, "inv.1_1");
        prop_assert_eq!(&out[1].id, "inv.2_1");
        for b in &out {
            prop_assert_eq!(b.meta_info.get("MATEID"), Some(&InfoValue::Null));
        }
    }

    /// Strand pairs depend only on the two orientation flags
    #[test]
    fn prop_orientation_strands(local in any::<bool>(), remote in any::<bool>()) {
        let (s5, s3) = orientation_strands(local, remote);
        if local == remote {
            prop_assert_eq!(s5.complement(), s3);
            prop_assert_eq!(s5 == Strand::Minus, local);
        } else {
            prop_assert_eq!((s5, s3), (Strand::Plus, Strand::Plus));
        }
    }

    /// Every canonical record carries GT and TOOL and none of the tags the
    /// canonical fields replace
    #[test]
    fn prop_meta_remap(
        (pos, end) in arb_span(),
        pe in 0u32..100,
        sr in 0u32..100,
        adapter in arb_adapter(),
    ) {
        let line = format!(
            "chr1\t{}\tx\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END={};PE={};SR={};PAIRS={};SPLIT={};STRANDS=+-:4\tGT\t0/1",
            pos, end, pe, sr, pe, sr
        );
        let b = &adapter.to_breakends(&parse(&line)).unwrap()[0];
        prop_assert_eq!(b.meta_info.get("GT"), Some(&InfoValue::Text("0/1".to_string())));
        prop_assert_eq!(
            b.meta_info.get("TOOL"),
            Some(&InfoValue::Text(adapter.tool().label().to_string()))
        );
        prop_assert!(b.meta_info.get("END").is_none());
        prop_assert_eq!(b.span_reads, Some(pe));
        prop_assert_eq!(b.junc_reads, Some(sr));
        match adapter.tool() {
            SourceTool::Lumpy => {
                prop_assert!(b.meta_info.get("PE").is_none());
                prop_assert!(b.meta_info.get("STRANDS").is_none());
                prop_assert!(b.meta_info.get("PAIRS").is_some());
            }
            SourceTool::Longranger => {
                prop_assert!(b.meta_info.get("PAIRS").is_none());
                prop_assert!(b.meta_info.get("PE").is_some());
            }
        }
    }

    /// Mate lines resolve independently but describe the same two endpoints
    #[test]
    fn prop_mate_pairs_share_endpoints(
        p1 in 1u64..1_000_000,
        p2 in 1u64..1_000_000,
        pattern in 0usize..3,
    ) {
        let (alt1, alt2) = match pattern {
            0 => (format!("T[chr9:{}[", p2), format!("]chr4:{}]A", p1)),
            1 => (format!("T]chr9:{}]", p2), format!("A]chr4:{}]", p1)),
            _ => (format!("[chr9:{}[T", p2), format!("[chr4:{}[A", p1)),
        };
        let r1 = parse(&format!("chr4\t{}\tm1\tT\t{}\t.\tPASS\tSVTYPE=BND;MATEID=m2", p1, alt1));
        let r2 = parse(&format!("chr9\t{}\tm2\tA\t{}\t.\tPASS\tSVTYPE=BND;MATEID=m1", p2, alt2));
        let b1 = &CallerAdapter::Lumpy.to_breakends(&r1).unwrap()[0];
        let b2 = &CallerAdapter::Lumpy.to_breakends(&r2).unwrap()[0];

        let ends = |b: &sv_concord::CanonicalBreakend| {
            ((b.chrom_5p.clone(), b.bkpos_5p), (b.chrom_3p.clone(), b.bkpos_3p))
        };
        let (e1_5, e1_3) = ends(b1);
        let (e2_5, e2_3) = ends(b2);
        if pattern == 0 {
            prop_assert_eq!((&e1_5, &e1_3), (&e2_5, &e2_3));
        } else {
            prop_assert_eq!((&e1_5, &e1_3), (&e2_3, &e2_5));
            prop_assert_eq!((b1.strand_5p, b1.strand_3p), (b2.strand_5p, b2.strand_3p));
        }
    }
}

#[test]
fn test_mirrored_mates_from_vcf_example() {
    let w = parse("chr2\t321681\tbnd_W\tG\tG]chr17:198982]\t6\tPASS\tSVTYPE=BND;MATEID=bnd_Y");
    let y = parse("chr17\t198982\tbnd_Y\tA\tA]chr2:321681]\t6\tPASS\tSVTYPE=BND;MATEID=bnd_W");
    let bw = &CallerAdapter::Lumpy.to_breakends(&w).unwrap()[0];
    let by = &CallerAdapter::Lumpy.to_breakends(&y).unwrap()[0];

    assert_eq!((bw.chrom_5p.as_str(), bw.bkpos_5p), ("chr17", 198982));
    assert_eq!((bw.chrom_3p.as_str(), bw.bkpos_3p), ("chr2", 321681));
    assert_eq!((by.chrom_5p.as_str(), by.bkpos_5p), ("chr2", 321681));
    assert_eq!((by.chrom_3p.as_str(), by.bkpos_3p), ("chr17", 198982));
    assert_eq!((bw.strand_5p, bw.strand_3p), (Strand::Plus, Strand::Minus));
}

#[test]
fn test_malformed_end_reports_locus() {
    let r = VcfRecord::parse("chr1\t100\tbad_end\tN\t<DEL>\t.\t.\tSVTYPE=DEL;END=1e3", 42).unwrap();
    let err = CallerAdapter::Lumpy.to_breakends(&r).unwrap_err();
    assert!(matches!(err, SvError::Parse { .. }));
    assert!(err.to_string().starts_with("record bad_end (chr1:100, line 42)"));
}
