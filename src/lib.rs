pub mod atoms;
pub mod decoders;
pub mod error;
pub mod known_atoms;
pub mod quicktime;
pub mod reader;
pub mod registry;
pub mod scanner;
pub mod tee;

pub use atoms::{Atom, AtomData, AtomHeader, AtomId, FourCC, FtypData, MoovData, MvhdData};
pub use error::{ParseError, Result};
pub use quicktime::{compose, parse_reader, quicktime_parser, quicktime_parser_with};
pub use reader::{ByteReader, ChunkSource, ReadChunks};
pub use registry::{AtomDecoder, Registry, default_registry, extended_registry};
pub use scanner::{AtomScanner, ScanOptions};
pub use tee::{TeeBranch, tee, tee_with_limit};
