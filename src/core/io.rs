//! I/O layer for call sets
//!
//! Opens plain, gzip or bzip2 text files behind one `BufRead`, picking
//! memory mapping for large plain files.

use flate2::read::MultiGzDecoder;
use bzip2::read::BzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Default buffer size for BufReader (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Large buffer size for high-throughput I/O (1MB)
pub const LARGE_BUFFER_SIZE: usize = 1024 * 1024;

/// Threshold for using memory mapping (100MB)
pub const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

/// I/O strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoStrategy {
    /// Use buffered reading with configurable buffer size
    Buffered(usize),
    /// Use memory mapping for the entire file
    MemoryMapped,
    /// Automatically select based on file size
    #[default]
    Auto,
}

/// Compression of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Plain,
    /// Gzip or BGZF (.gz)
    Gzip,
    Bzip2,
}

impl CompressionFormat {
    /// Identify compression from the first bytes of a file
    pub fn sniff(magic: &[u8]) -> Self {
        match magic {
            [0x1f, 0x8b, ..] => CompressionFormat::Gzip,
            [b'B', b'Z', b'h', ..] => CompressionFormat::Bzip2,
            _ => CompressionFormat::Plain,
        }
    }
}

/// Detect compression from the file extension, then from magic bytes
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") | Some("bgz") => return Ok(CompressionFormat::Gzip),
        Some("bz2") => return Ok(CompressionFormat::Bzip2),
        _ => {}
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 3];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(CompressionFormat::sniff(&magic[..filled]))
}

/// A reader that picks buffered or memory-mapped access
pub enum SmartReader {
    /// Buffered reader for smaller files or streaming
    Buffered(BufReader<File>),
    /// Memory-mapped reader for large files
    Mapped(MappedReader),
}

/// Memory-mapped file reader
pub struct MappedReader {
    mmap: Mmap,
    position: usize,
}

impl MappedReader {
    pub fn new(file: &File) -> io::Result<Self> {
        // SAFETY: call sets are opened read-only and not modified while mapped
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap, position: 0 })
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

impl Read for MappedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.mmap[self.position..];
        let to_read = std::cmp::min(buf.len(), remaining.len());
        buf[..to_read].copy_from_slice(&remaining[..to_read]);
        self.position += to_read;
        Ok(to_read)
    }
}

impl BufRead for MappedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(&self.mmap[self.position..])
    }

    fn consume(&mut self, amt: usize) {
        self.position = std::cmp::min(self.position + amt, self.mmap.len());
    }
}

impl SmartReader {
    /// Open an uncompressed file with the given strategy
    pub fn open<P: AsRef<Path>>(path: P, strategy: IoStrategy) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let file_size = file.metadata()?.len();

        match strategy {
            IoStrategy::Buffered(buf_size) => {
                Ok(SmartReader::Buffered(BufReader::with_capacity(buf_size, file)))
            }
            IoStrategy::MemoryMapped => Ok(SmartReader::Mapped(MappedReader::new(&file)?)),
            IoStrategy::Auto => {
                if file_size >= MMAP_THRESHOLD {
                    Ok(SmartReader::Mapped(MappedReader::new(&file)?))
                } else {
                    let buf_size = if file_size > 10 * 1024 * 1024 {
                        LARGE_BUFFER_SIZE
                    } else {
                        DEFAULT_BUFFER_SIZE
                    };
                    Ok(SmartReader::Buffered(BufReader::with_capacity(buf_size, file)))
                }
            }
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, SmartReader::Mapped(_))
    }
}

impl Read for SmartReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            SmartReader::Buffered(reader) => reader.read(buf),
            SmartReader::Mapped(reader) => reader.read(buf),
        }
    }
}

impl BufRead for SmartReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            SmartReader::Buffered(reader) => reader.fill_buf(),
            SmartReader::Mapped(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            SmartReader::Buffered(reader) => reader.consume(amt),
            SmartReader::Mapped(reader) => reader.consume(amt),
        }
    }
}

/// Open a text file, decompressing gzip/BGZF and bzip2 transparently
pub fn open_text<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    match detect_compression(path)? {
        CompressionFormat::Gzip => {
            let decoder = MultiGzDecoder::new(File::open(path)?);
            Ok(Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, decoder)))
        }
        CompressionFormat::Bzip2 => {
            let decoder = BzDecoder::new(File::open(path)?);
            Ok(Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, decoder)))
        }
        CompressionFormat::Plain => Ok(Box::new(SmartReader::open(path, IoStrategy::Auto)?)),
    }
}

/// Line iterator that reuses a buffer to avoid allocations
pub struct LineIterator<R: BufRead> {
    reader: R,
    buffer: String,
    line_number: usize,
}

impl<R: BufRead> LineIterator<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::with_capacity(1024),
            line_number: 0,
        }
    }

    /// Read the next line into the internal buffer, without its line ending
    pub fn next_line(&mut self) -> Option<io::Result<&str>> {
        self.buffer.clear();
        match self.reader.read_line(&mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                if self.buffer.ends_with('\n') {
                    self.buffer.pop();
                    if self.buffer.ends_with('\r') {
                        self.buffer.pop();
                    }
                }
                Some(Ok(&self.buffer))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// 1-based number of the line last returned
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}
