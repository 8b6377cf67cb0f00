//! End-to-end tests over files on disk
//!
//! Compressed inputs, partition files and flat-form conversion.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::Path;
use sv_concord::core::{RegionSource, VcfSource};
use sv_concord::formats::{convert_calls, SvReader};
use sv_concord::matcher::{self, OutputFormat, PartitionWriter};
use sv_concord::{CallerAdapter, SvResult};

const HEADER: &str = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

const LUMPY_CALLS: &str = "chr1\t1000\tdel1\tN\t<DEL>\t50\tPASS\tSVTYPE=DEL;END=2000;CIPOS=-10,10;CIEND=-10,10;PE=5;SR=3\n\
chr1\t5000\tinv1\tN\t<INV>\t40\tPASS\tSVTYPE=INV;END=6000;PE=4\n\
chr2\t700\tbnd1\tA\tA]chr5:900]\t30\tPASS\tSVTYPE=BND;MATEID=bnd2;PE=2\n";

// Same calls as LUMPY_CALLS under other identifiers, minus the translocation
const REPLICATE_CALLS: &str = "chr1\t1000\trep_del\tN\t<DEL>\t50\tPASS\tSVTYPE=DEL;END=2000;CIPOS=-10,10;CIEND=-10,10;PE=5;SR=3\n\
chr1\t5000\trep_inv\tN\t<INV>\t40\tPASS\tSVTYPE=INV;END=6000;PE=4\n";

fn write_gz(path: &Path, text: &str) {
    let mut encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

fn data_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_compare_gzip_inputs_into_vcf_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let a_path = dir.path().join("lumpy.vcf.gz");
    let b_path = dir.path().join("replicate.vcf.bgz");
    write_gz(&a_path, &format!("{}{}", HEADER, LUMPY_CALLS));
    write_gz(&b_path, &format!("{}{}", HEADER, REPLICATE_CALLS));

    let a = VcfSource::open(&a_path, CallerAdapter::Lumpy).unwrap();
    let b = VcfSource::open(&b_path, CallerAdapter::Lumpy)
        .unwrap()
        .indexed()
        .unwrap();
    let header = a.header().unwrap();

    let inter_path = dir.path().join("out.intersection.vcf");
    let diff_path = dir.path().join("out.difference.vcf");
    let mut inter =
        PartitionWriter::new(OutputFormat::Vcf, fs::File::create(&inter_path).unwrap(), &header).unwrap();
    let mut diff =
        PartitionWriter::new(OutputFormat::Vcf, fs::File::create(&diff_path).unwrap(), &header).unwrap();

    let comparison = matcher::compare(&a, &b, 10).unwrap();
    let stats = matcher::write_partitions(comparison, &mut inter, &mut diff).unwrap();
    drop(inter);
    drop(diff);

    // del1 and both inversion junctions match; the translocation has no partner
    assert_eq!(stats.total, 4);
    assert_eq!(stats.intersection, 3);
    assert_eq!(stats.difference, 1);

    let inter_lines = data_lines(&inter_path);
    assert_eq!(inter_lines.len(), 2, "inversion written once: {:?}", inter_lines);
    assert!(inter_lines[0].contains("\tdel1\t"));
    assert!(inter_lines[1].contains("\tinv1\t"));

    let diff_lines = data_lines(&diff_path);
    assert_eq!(diff_lines.len(), 1);
    assert!(diff_lines[0].contains("\tbnd1\t"));

    let written = fs::read_to_string(&inter_path).unwrap();
    assert!(written.starts_with("##fileformat=VCFv4.2\n#CHROM"));
}

#[test]
fn test_compare_into_flat_partitions() {
    let a = VcfSource::from_text(format!("{}{}", HEADER, LUMPY_CALLS), CallerAdapter::Lumpy);
    let b = VcfSource::from_text(format!("{}{}", HEADER, REPLICATE_CALLS), CallerAdapter::Lumpy)
        .indexed()
        .unwrap();
    let header = a.header().unwrap();

    let mut inter_buf = Vec::new();
    let mut diff_buf = Vec::new();
    {
        let mut inter = PartitionWriter::new(OutputFormat::Sv, &mut inter_buf, &header).unwrap();
        let mut diff = PartitionWriter::new(OutputFormat::Sv, &mut diff_buf, &header).unwrap();
        let comparison = matcher::compare(&a, &b, 10).unwrap();
        matcher::write_partitions(comparison, &mut inter, &mut diff).unwrap();
    }

    let inter: Vec<_> = SvReader::new(inter_buf.as_slice())
        .collect::<SvResult<_>>()
        .unwrap();
    let ids: Vec<&str> = inter.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["del1", "inv1.1_1", "inv1.2_1"]);

    let diff: Vec<_> = SvReader::new(diff_buf.as_slice())
        .collect::<SvResult<_>>()
        .unwrap();
    assert_eq!(diff.len(), 1);
    assert_eq!(diff[0].chrom_5p, "chr5");
}

#[test]
fn test_convert_writes_failures_aside() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("calls.vcf");
    let output = dir.path().join("calls.sv");
    let bad = "chr3\t1\tedge_inv\tN\t<INV>\t10\tPASS\tSVTYPE=INV;END=50\n";
    fs::write(&input, format!("{}{}{}", HEADER, LUMPY_CALLS, bad)).unwrap();

    let source = VcfSource::open(&input, CallerAdapter::Lumpy).unwrap();
    let stats = convert_calls(&source, &output, 2).unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.written, 4);
    assert_eq!(stats.failed, 1);

    let converted: Vec<_> = SvReader::new(fs::read(&output).unwrap().as_slice())
        .collect::<SvResult<_>>()
        .unwrap();
    assert_eq!(converted.len(), 4);
    assert_eq!(converted[0].id, "del1");
    assert_eq!((converted[0].bkpos_5p, converted[0].bkpos_3p), (1000, 2000));

    let failures = fs::read_to_string(dir.path().join("calls.sv.fail")).unwrap();
    assert_eq!(failures.lines().count(), 1);
    assert!(failures.starts_with("chr3\t1\tedge_inv\t"));
}
