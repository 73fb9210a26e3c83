use crate::atoms::{Atom, AtomHeader, AtomId, FourCC};
use crate::error::{ParseError, Result};
use crate::reader::{ByteReader, ChunkSource};
use crate::registry::{AtomDecoder, Registry};
use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Fail when a decoder consumes a different number of bytes than the
    /// atom declares.
    pub verify_consumption: bool,
    /// Maximum container nesting depth.
    pub max_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            verify_consumption: true,
            max_depth: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Running,
    Ended,
    Failed,
}

/// Pulls atoms off a [`ByteReader`] one at a time.
///
/// Known type codes are handed to their registered decoder, anything else has
/// its payload skipped and comes back as [`crate::AtomData::Generic`]. A size
/// field of `0` is treated as an end-of-stream marker: the scan stops there,
/// including inside containers, and nothing after it is read.
pub struct AtomScanner {
    reader: ByteReader,
    registry: Registry,
    options: ScanOptions,
    next_id: u64,
    parents: Vec<AtomId>,
    state: ScanState,
}

impl AtomScanner {
    /// A scanner with no decoders registered.
    pub fn new<S: ChunkSource + Send + 'static>(source: S) -> Self {
        Self::with_options(source, ScanOptions::default())
    }

    pub fn with_options<S: ChunkSource + Send + 'static>(source: S, options: ScanOptions) -> Self {
        Self::from_reader(ByteReader::new(source), options)
    }

    pub fn from_reader(reader: ByteReader, options: ScanOptions) -> Self {
        Self {
            reader,
            registry: Registry::new(),
            options,
            next_id: 0,
            parents: Vec::new(),
            state: ScanState::Running,
        }
    }

    /// Register or replace the decoder for a type code.
    pub fn define_parser<D: AtomDecoder + 'static>(&mut self, typ: impl AsRef<[u8]>, dec: D) -> Result<()> {
        self.registry.define(typ, dec)
    }

    /// Merge a decoder table into this scanner.
    pub fn register_all(&mut self, table: Registry) {
        self.registry.extend(table);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn reader_mut(&mut self) -> &mut ByteReader {
        &mut self.reader
    }

    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Current container nesting depth, 0 at the top level.
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// Decode the next atom, or `None` once the stream (or a size-0 marker)
    /// has been reached. After an error the scanner yields nothing more.
    pub fn next_atom(&mut self) -> Result<Option<Atom>> {
        if self.state != ScanState::Running {
            return Ok(None);
        }
        match self.scan_one() {
            Ok(Some(atom)) => Ok(Some(atom)),
            Ok(None) => {
                self.state = ScanState::Ended;
                Ok(None)
            }
            Err(e) => {
                self.state = ScanState::Failed;
                Err(e)
            }
        }
    }

    fn scan_one(&mut self) -> Result<Option<Atom>> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };
        let expected = header.data_size();
        let typ = header.typ;
        let start = self.reader.position();

        let atom = match self.registry.get(&typ) {
            Some(entry) => {
                debug!(
                    "{typ} [{}] at {}: parsing {expected} bytes ({})",
                    hex::encode(typ.0),
                    header.offset,
                    entry.name
                );
                entry.inner.decode(self, header)?
            }
            None => {
                debug!(
                    "{typ} [{}] at {}: no parser found; skipping {expected} bytes",
                    hex::encode(typ.0),
                    header.offset
                );
                self.reader.skip_bytes(expected)?;
                Atom::generic(header)
            }
        };

        if self.options.verify_consumption {
            let actual = self.reader.position() - start;
            let truncated =
                actual < expected && (self.state == ScanState::Ended || self.reader.done()?);
            if actual != expected && !truncated {
                return Err(ParseError::ConsumptionMismatch {
                    typ,
                    expected,
                    actual,
                });
            }
        }
        Ok(Some(atom))
    }

    fn read_header(&mut self) -> Result<Option<AtomHeader>> {
        if self.reader.done()? {
            return Ok(None);
        }
        let offset = self.reader.position();

        let size = BigEndian::read_u32(&self.read_header_field::<4>()?);
        if size == 0 {
            debug!("size 0 at {offset}: end of atoms");
            return Ok(None);
        }
        let typ = FourCC(self.read_header_field::<4>()?);
        let extended_size = if size == 1 {
            Some(BigEndian::read_u64(&self.read_header_field::<8>()?))
        } else {
            None
        };

        let header = AtomHeader {
            id: AtomId(self.next_id),
            parent: self.parents.last().copied(),
            offset,
            size,
            typ,
            extended_size,
        };
        if header.total_size() < header.header_size() {
            return Err(ParseError::InvalidSize {
                typ,
                size: header.total_size(),
                offset,
            });
        }
        self.next_id += 1;
        Ok(Some(header))
    }

    fn read_header_field<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.reader.read_bytes(N)?;
        let available = bytes.len() as u64;
        bytes.try_into().map_err(|_| ParseError::StreamEndedUnexpectedly {
            requested: N as u64,
            available,
        })
    }

    /// Scan the children of a container atom.
    ///
    /// Children are pulled until their declared sizes add up to the
    /// container's payload. A child that runs past the end of the payload
    /// aborts with [`ParseError::StructuralOverflow`]. If the stream ends
    /// first, the children read so far are returned.
    pub fn decode_children(&mut self, header: &AtomHeader) -> Result<Vec<Atom>> {
        let declared = header.data_size();
        if declared == 0 {
            return Ok(Vec::new());
        }
        if self.parents.len() >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                typ: header.typ,
                depth: self.parents.len() + 1,
            });
        }

        self.parents.push(header.id);
        let mut children = Vec::new();
        let result = self.fill_children(header, &mut children);
        self.parents.pop();
        result?;
        Ok(children)
    }

    fn fill_children(&mut self, header: &AtomHeader, children: &mut Vec<Atom>) -> Result<()> {
        let declared = header.data_size();
        let mut remaining = declared;
        while remaining > 0 {
            let Some(child) = self.next_atom()? else {
                warn!(
                    "{}: stream ended with {remaining} of {declared} bytes unread",
                    header.typ
                );
                return Ok(());
            };
            let size = child.header.total_size();
            if size > remaining {
                return Err(ParseError::StructuralOverflow {
                    container: header.typ,
                    declared,
                    overflow: size - remaining,
                });
            }
            remaining -= size;
            children.push(child);
        }
        Ok(())
    }
}

impl Iterator for AtomScanner {
    type Item = Result<Atom>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_atom().transpose()
    }
}
