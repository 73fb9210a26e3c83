//! Forward-only byte reader over a sequence of chunks.
//!
//! The reader never seeks. Bytes are pulled from a [`ChunkSource`] only when a
//! read or skip needs them, and whatever is left of the current chunk is kept
//! as residue for the next call.

use crate::error::{ParseError, Result};
use std::io::{self, Read};
use tracing::trace;

/// Largest count handed to a single discard step.
pub const MAX_SKIP_STEP: u64 = u32::MAX as u64;

/// Something that produces the input one chunk at a time.
///
/// `Ok(None)` means the source is exhausted. Empty chunks are allowed and
/// ignored by the reader.
pub trait ChunkSource {
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>>;
}

impl<I> ChunkSource for I
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.next().transpose()
    }
}

/// Adapts a [`Read`] into fixed-capacity chunks.
pub struct ReadChunks<R> {
    inner: R,
    chunk_size: usize,
}

impl<R: Read> ReadChunks<R> {
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

    pub fn new(inner: R) -> Self {
        Self::with_chunk_size(inner, Self::DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1),
        }
    }
}

impl<R: Read> Iterator for ReadChunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            return match self.inner.read(&mut buf) {
                Ok(0) => None,
                Ok(n) => {
                    buf.truncate(n);
                    Some(Ok(buf))
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => Some(Err(e)),
            };
        }
    }
}

/// Turns a chunk source into exact-length reads and skips.
pub struct ByteReader {
    source: Box<dyn ChunkSource + Send>,
    chunk: Vec<u8>,
    cursor: usize,
    exhausted: bool,
    finished: bool,
    position: u64,
}

impl ByteReader {
    const CAPACITY_HINT: usize = 64 * 1024;

    pub fn new<S: ChunkSource + Send + 'static>(source: S) -> Self {
        Self {
            source: Box::new(source),
            chunk: Vec::new(),
            cursor: 0,
            exhausted: false,
            finished: false,
            position: 0,
        }
    }

    /// Total number of bytes read or skipped so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// True once a read or skip came up short.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// True when the source is exhausted and no residue is buffered.
    ///
    /// May pull one chunk from the source to find out.
    pub fn done(&mut self) -> Result<bool> {
        Ok(!self.fill()?)
    }

    /// Makes sure residue is available. Returns false at end of stream.
    fn fill(&mut self) -> io::Result<bool> {
        while self.cursor == self.chunk.len() {
            if self.exhausted {
                return Ok(false);
            }
            match self.source.next_chunk()? {
                Some(chunk) => {
                    trace!(len = chunk.len(), "pulled chunk");
                    self.chunk = chunk;
                    self.cursor = 0;
                }
                None => {
                    self.chunk = Vec::new();
                    self.cursor = 0;
                    self.exhausted = true;
                }
            }
        }
        Ok(true)
    }

    fn residue(&self) -> &[u8] {
        &self.chunk[self.cursor..]
    }

    /// Reads exactly `n` bytes, or fewer if the stream ends first.
    ///
    /// A short read marks the reader finished; any later read or skip of a
    /// non-zero length fails with [`ParseError::StreamEndedUnexpectedly`].
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        if self.finished {
            return Err(ParseError::StreamEndedUnexpectedly {
                requested: n as u64,
                available: 0,
            });
        }

        let mut out = Vec::with_capacity(n.min(Self::CAPACITY_HINT));
        while out.len() < n {
            if !self.fill()? {
                self.finished = true;
                break;
            }
            let take = (n - out.len()).min(self.residue().len());
            out.extend_from_slice(&self.residue()[..take]);
            self.cursor += take;
        }
        self.position += out.len() as u64;
        Ok(out)
    }

    /// Reads a fixed-width field. `None` if the stream ended inside it.
    pub fn read_array<const N: usize>(&mut self) -> Result<Option<[u8; N]>> {
        let bytes = self.read_bytes(N)?;
        Ok(bytes.try_into().ok())
    }

    /// Discards `n` bytes without materializing them.
    ///
    /// Large counts are split into steps of at most [`MAX_SKIP_STEP`] bytes.
    /// End-of-stream handling matches [`ByteReader::read_bytes`].
    pub fn skip_bytes(&mut self, n: u64) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        if self.finished {
            return Err(ParseError::StreamEndedUnexpectedly {
                requested: n,
                available: 0,
            });
        }

        let mut remaining = n;
        while remaining > 0 {
            let step = remaining.min(MAX_SKIP_STEP) as u32;
            let skipped = self.discard(step)?;
            remaining -= skipped as u64;
            if skipped < step {
                self.finished = true;
                break;
            }
        }
        Ok(())
    }

    fn discard(&mut self, n: u32) -> io::Result<u32> {
        let mut left = n as u64;
        while left > 0 && self.fill()? {
            let take = left.min(self.residue().len() as u64);
            self.cursor += take as usize;
            self.position += take;
            left -= take;
        }
        Ok(n - left as u32)
    }
}

impl Read for ByteReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || !self.fill()? {
            return Ok(0);
        }
        let take = buf.len().min(self.residue().len());
        buf[..take].copy_from_slice(&self.residue()[..take]);
        self.cursor += take;
        self.position += take as u64;
        Ok(take)
    }
}
