use crate::atoms::Atom;
use crate::error::Result;
use crate::reader::{ChunkSource, ReadChunks};
use crate::registry::{Registry, default_registry};
use crate::scanner::{AtomScanner, ScanOptions};
use std::io::Read;

/// Install a decoder table on a base scanner.
pub fn compose(mut scanner: AtomScanner, table: Registry) -> AtomScanner {
    scanner.register_all(table);
    scanner
}

/// A scanner with the QuickTime decoders (`ftyp`, `mdat`, `moov`, `mvhd`,
/// `trak`) already registered.
///
/// ```
/// use atomscan::{AtomData, quicktime_parser};
///
/// let mut bytes = Vec::new();
/// bytes.extend_from_slice(&16u32.to_be_bytes());
/// bytes.extend_from_slice(b"ftypqt  ");
/// bytes.extend_from_slice(&[0, 0, 2, 0]);
///
/// let mut parser = quicktime_parser(std::iter::once(Ok::<_, std::io::Error>(bytes)));
/// let ftyp = parser.next().unwrap()?;
/// assert!(matches!(ftyp.data, AtomData::Ftyp(_)));
/// assert!(parser.next().is_none());
/// # Ok::<(), atomscan::ParseError>(())
/// ```
pub fn quicktime_parser<S: ChunkSource + Send + 'static>(source: S) -> AtomScanner {
    quicktime_parser_with(source, ScanOptions::default())
}

pub fn quicktime_parser_with<S: ChunkSource + Send + 'static>(source: S, options: ScanOptions) -> AtomScanner {
    compose(AtomScanner::with_options(source, options), default_registry())
}

/// Parse every top-level atom from a reader, `chunk_size` bytes at a time.
pub fn parse_reader<R: Read + Send + 'static>(r: R, chunk_size: usize) -> Result<Vec<Atom>> {
    quicktime_parser(ReadChunks::with_chunk_size(r, chunk_size)).collect()
}
