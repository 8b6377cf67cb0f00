//! sv-concord CLI entry point
//!
//! Compares two structural-variant call sets, or converts one to the flat
//! breakend form.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sv_concord::core::{RecordFilter, RegionSource, SourceTool, VcfSource};
use sv_concord::formats;
use sv_concord::matcher::{self, OutputFormat, PartitionWriter};
use sv_concord::CallerAdapter;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Calling tool that produced a VCF (CLI enum)
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ToolArg {
    #[value(name = "lumpy")]
    Lumpy,
    #[value(name = "longranger")]
    Longranger,
}

impl From<ToolArg> for CallerAdapter {
    fn from(arg: ToolArg) -> Self {
        match arg {
            ToolArg::Lumpy => CallerAdapter::for_tool(SourceTool::Lumpy),
            ToolArg::Longranger => CallerAdapter::for_tool(SourceTool::Longranger),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum FormatArg {
    /// Source VCF records with the source header
    #[default]
    #[value(name = "vcf")]
    Vcf,
    /// Canonical breakends, one tab-separated line each
    #[value(name = "sv")]
    Sv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Vcf => OutputFormat::Vcf,
            FormatArg::Sv => OutputFormat::Sv,
        }
    }
}

#[derive(Parser)]
#[command(name = "sv-concord")]
#[command(about = "Structural-variant call canonicalization and comparison")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the calls of A into those found in B and those not found
    Compare {
        /// Call set whose records are partitioned
        a: PathBuf,
        /// Call set probed for matches
        b: PathBuf,
        /// Tool that produced A
        #[arg(long = "tool-a")]
        tool_a: ToolArg,
        /// Tool that produced B
        #[arg(long = "tool-b")]
        tool_b: ToolArg,
        /// Probe half-width around each 5' breakend, in bases
        #[arg(long, default_value_t = matcher::DEFAULT_TOLERANCE)]
        tolerance: u64,
        /// Output format of both partitions
        #[arg(long, default_value = "vcf")]
        format: FormatArg,
        /// Output prefix; writes <prefix>.intersection.<ext> and <prefix>.difference.<ext>
        #[arg(short = 'o', long = "out-prefix", default_value = "sv_concord")]
        out_prefix: PathBuf,
        /// Only compare records with FILTER=PASS
        #[arg(long)]
        pass_only: bool,
        /// Minimum QUAL of compared records
        #[arg(long)]
        min_qual: Option<f64>,
        /// Keep SNP records
        #[arg(long)]
        keep_snps: bool,
        /// Fetch B through its tabix index instead of indexing it in memory.
        /// Tabix finds records by reference span only, so breakends whose 5'
        /// end lies at the mate are not matched
        #[cfg(feature = "tabix")]
        #[arg(long)]
        tabix: bool,
    },
    /// Canonicalize a call set into the flat breakend form
    Convert {
        /// Input VCF file
        input: PathBuf,
        /// Output file (default: output.sv)
        output: Option<PathBuf>,
        /// Tool that produced the input
        #[arg(long)]
        tool: ToolArg,
        /// Number of threads
        #[arg(short = 't', long, default_value = "1")]
        threads: usize,
    },
}

fn partition_path(prefix: &Path, partition: &str, format: OutputFormat) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!(".{}.{}", partition, format.extension()));
    PathBuf::from(name)
}

fn run_compare<B: RegionSource + ?Sized>(
    a: &VcfSource,
    b: &B,
    tolerance: u64,
    format: OutputFormat,
    out_prefix: &Path,
) -> anyhow::Result<matcher::CompareStats> {
    let header = a.header().context("Failed to read header of A")?;
    let inter_path = partition_path(out_prefix, "intersection", format);
    let diff_path = partition_path(out_prefix, "difference", format);

    let inter_file = File::create(&inter_path)
        .with_context(|| format!("Failed to create {}", inter_path.display()))?;
    let diff_file = File::create(&diff_path)
        .with_context(|| format!("Failed to create {}", diff_path.display()))?;
    let mut inter = PartitionWriter::new(format, inter_file, &header)?;
    let mut diff = PartitionWriter::new(format, diff_file, &header)?;

    eprintln!(
        "Comparing {} -> {}, {}",
        a.label(),
        inter_path.display(),
        diff_path.display()
    );
    let comparison = matcher::compare(a, b, tolerance)?;
    let stats = matcher::write_partitions(comparison, &mut inter, &mut diff)
        .context("Comparison failed")?;
    Ok(stats)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Compare {
            a,
            b,
            tool_a,
            tool_b,
            tolerance,
            format,
            out_prefix,
            pass_only,
            min_qual,
            keep_snps,
            #[cfg(feature = "tabix")]
            tabix,
        } => {
            let filter = RecordFilter {
                exclude_snps: !keep_snps,
                pass_only,
                min_qual,
                kinds: None,
            };
            let format = OutputFormat::from(format);
            let source_a = VcfSource::open(&a, tool_a.into())
                .with_context(|| format!("Failed to open {}", a.display()))?
                .with_filter(filter.clone());

            #[cfg(feature = "tabix")]
            let stats = if tabix {
                let source_b = sv_concord::core::TabixSource::open(&b, tool_b.into())?
                    .with_filter(filter);
                run_compare(&source_a, &source_b, tolerance, format, &out_prefix)?
            } else {
                let source_b = load_indexed(&b, tool_b, filter)?;
                run_compare(&source_a, &source_b, tolerance, format, &out_prefix)?
            };
            #[cfg(not(feature = "tabix"))]
            let stats = {
                let source_b = load_indexed(&b, tool_b, filter)?;
                run_compare(&source_a, &source_b, tolerance, format, &out_prefix)?
            };

            eprintln!("\n=== Comparison Statistics ===");
            eprintln!("Total breakends: {}", stats.total);
            eprintln!("Intersection:    {}", stats.intersection);
            eprintln!("Difference:      {}", stats.difference);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Convert {
            input,
            output,
            tool,
            threads,
        } => {
            let output_path = output.unwrap_or_else(|| PathBuf::from("output.sv"));
            let source = VcfSource::open(&input, tool.into())
                .with_context(|| format!("Failed to open {}", input.display()))?;

            eprintln!("Converting {:?} -> {:?}", input, output_path);
            let stats = formats::convert_calls(&source, &output_path, threads)?;

            eprintln!("\n=== Conversion Statistics ===");
            eprintln!("Total records:   {}", stats.total);
            eprintln!("Breakends:       {}", stats.written);
            eprintln!("Failed:          {}", stats.failed);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }
    }

    Ok(())
}

fn load_indexed(path: &Path, tool: ToolArg, filter: RecordFilter) -> anyhow::Result<VcfSource> {
    let start = Instant::now();
    eprintln!("Indexing call set: {:?}", path);
    let source = VcfSource::open(path, tool.into())
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_filter(filter)
        .indexed()
        .with_context(|| format!("Failed to index {}", path.display()))?;
    eprintln!("Call set indexed in {:.2}s", start.elapsed().as_secs_f64());
    Ok(source)
}
