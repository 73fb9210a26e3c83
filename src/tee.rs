//! Splits one chunk source into two independent cursors.
//!
//! Typical use is parsing the structure on one thread while another thread
//! consumes the raw bytes. Each branch keeps its own queue of chunks the other
//! branch pulled ahead of it, so a slow branch buffers whatever the fast one
//! has already read. With [`tee`] that buffer is unbounded: a branch that is
//! kept alive but never read ends up holding the whole input. Use
//! [`tee_with_limit`] to cap it.

use crate::reader::ChunkSource;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

struct Shared {
    source: Box<dyn ChunkSource + Send>,
    pending: [VecDeque<Vec<u8>>; 2],
    open: [bool; 2],
    exhausted: bool,
    failure: Option<(io::ErrorKind, String)>,
    max_backlog: Option<usize>,
    overrun: [bool; 2],
}

/// One side of a [`tee`]. Yields every chunk of the original source in order.
pub struct TeeBranch {
    shared: Arc<Mutex<Shared>>,
    side: usize,
}

/// Splits `source` into two branches with unbounded backlogs.
pub fn tee<S: ChunkSource + Send + 'static>(source: S) -> (TeeBranch, TeeBranch) {
    split(source, None)
}

/// Like [`tee`], but a branch that falls more than `max_backlog` chunks
/// behind is cut off: its queue is dropped and its next read fails with
/// [`io::ErrorKind::OutOfMemory`]. The other branch is unaffected.
pub fn tee_with_limit<S: ChunkSource + Send + 'static>(
    source: S,
    max_backlog: usize,
) -> (TeeBranch, TeeBranch) {
    split(source, Some(max_backlog))
}

fn split<S: ChunkSource + Send + 'static>(
    source: S,
    max_backlog: Option<usize>,
) -> (TeeBranch, TeeBranch) {
    let shared = Arc::new(Mutex::new(Shared {
        source: Box::new(source),
        pending: [VecDeque::new(), VecDeque::new()],
        open: [true, true],
        exhausted: false,
        failure: None,
        max_backlog,
        overrun: [false, false],
    }));
    (
        TeeBranch {
            shared: Arc::clone(&shared),
            side: 0,
        },
        TeeBranch { shared, side: 1 },
    )
}

impl TeeBranch {
    /// Chunks pulled by the other branch that this one has not consumed yet.
    pub fn backlog(&self) -> usize {
        self.shared
            .lock()
            .map(|s| s.pending[self.side].len())
            .unwrap_or(0)
    }
}

impl Iterator for TeeBranch {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut guard = match self.shared.lock() {
            Ok(guard) => guard,
            Err(_) => return Some(Err(io::Error::other("tee source lock poisoned"))),
        };
        let shared = &mut *guard;
        let other = 1 - self.side;

        if shared.overrun[self.side] {
            return Some(Err(io::Error::new(
                io::ErrorKind::OutOfMemory,
                "tee branch fell too far behind",
            )));
        }
        if let Some(chunk) = shared.pending[self.side].pop_front() {
            return Some(Ok(chunk));
        }
        if let Some((kind, msg)) = &shared.failure {
            return Some(Err(io::Error::new(*kind, msg.clone())));
        }
        if shared.exhausted {
            return None;
        }

        match shared.source.next_chunk() {
            Ok(Some(chunk)) => {
                if shared.open[other] && !shared.overrun[other] {
                    if shared
                        .max_backlog
                        .is_some_and(|max| shared.pending[other].len() >= max)
                    {
                        warn!(side = other, "tee backlog limit reached, cutting branch off");
                        shared.overrun[other] = true;
                        shared.pending[other].clear();
                    } else {
                        shared.pending[other].push_back(chunk.clone());
                    }
                }
                Some(Ok(chunk))
            }
            Ok(None) => {
                shared.exhausted = true;
                None
            }
            Err(e) => {
                shared.failure = Some((e.kind(), e.to_string()));
                Some(Err(e))
            }
        }
    }
}

impl Drop for TeeBranch {
    fn drop(&mut self) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.open[self.side] = false;
            let dropped = shared.pending[self.side].len();
            shared.pending[self.side].clear();
            debug!(side = self.side, dropped, "tee branch closed");
        }
    }
}
