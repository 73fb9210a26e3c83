use crate::atoms::{Atom, AtomHeader, FourCC};
use crate::decoders::{ContainerDecoder, FtypDecoder, MdatDecoder, MoovDecoder, MvhdDecoder, TrakDecoder};
use crate::error::Result;
use crate::scanner::AtomScanner;
use std::collections::HashMap;
use std::sync::Arc;

/// Decodes the payload of one atom type.
///
/// The decoder receives the already-read header and the scanner that produced
/// it; the payload is the next `header.data_size()` bytes of
/// `scanner.reader_mut()`. It must consume exactly that many bytes, decoding
/// what it understands and skipping the rest. Containers pull their children
/// through the same scanner.
pub trait AtomDecoder: Send + Sync {
    fn decode(&self, scanner: &mut AtomScanner, header: AtomHeader) -> Result<Atom>;
}

impl<F> AtomDecoder for F
where
    F: Fn(&mut AtomScanner, AtomHeader) -> Result<Atom> + Send + Sync,
{
    fn decode(&self, scanner: &mut AtomScanner, header: AtomHeader) -> Result<Atom> {
        self(scanner, header)
    }
}

/// Decoders keyed by type code.
#[derive(Clone, Default)]
pub struct Registry {
    map: HashMap<FourCC, DecoderEntry>,
}

#[derive(Clone)]
pub(crate) struct DecoderEntry {
    pub(crate) inner: Arc<dyn AtomDecoder>,
    pub(crate) name: String,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Return a new registry with the given decoder added.
    ///
    /// `name` is human-readable and only used for logging.
    pub fn with_decoder<D: AtomDecoder + 'static>(mut self, typ: FourCC, name: &str, dec: D) -> Self {
        self.insert(typ, name, dec);
        self
    }

    /// Register `typ` as a plain container whose children are scanned
    /// recursively.
    pub fn with_container(self, typ: FourCC) -> Self {
        let name = format!("{typ} container");
        self.with_decoder(typ, &name, ContainerDecoder)
    }

    /// Register or replace the decoder for a type code given as raw bytes or
    /// a string.
    pub fn define<D: AtomDecoder + 'static>(&mut self, typ: impl AsRef<[u8]>, dec: D) -> Result<()> {
        let typ = FourCC::try_from(typ.as_ref())?;
        let name = typ.as_str_lossy();
        self.insert(typ, &name, dec);
        Ok(())
    }

    fn insert<D: AtomDecoder + 'static>(&mut self, typ: FourCC, name: &str, dec: D) {
        self.map.insert(
            typ,
            DecoderEntry {
                inner: Arc::new(dec),
                name: name.to_string(),
            },
        );
    }

    /// Copy every entry of `other` into this registry, replacing clashes.
    pub fn extend(&mut self, other: Registry) {
        self.map.extend(other.map);
    }

    pub fn contains(&self, typ: &FourCC) -> bool {
        self.map.contains_key(typ)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn get(&self, typ: &FourCC) -> Option<DecoderEntry> {
        self.map.get(typ).cloned()
    }
}

/// The QuickTime decoder set: `ftyp`, `mdat`, `moov`, `mvhd` and `trak`.
pub fn default_registry() -> Registry {
    Registry::new()
        .with_decoder(FourCC(*b"ftyp"), "File Type", FtypDecoder)
        .with_decoder(FourCC(*b"mdat"), "Movie Data", MdatDecoder)
        .with_decoder(FourCC(*b"moov"), "Movie", MoovDecoder)
        .with_decoder(FourCC(*b"mvhd"), "Movie Header", MvhdDecoder)
        .with_decoder(FourCC(*b"trak"), "Track", TrakDecoder)
}

/// [`default_registry`] plus the track-level containers below `trak`.
pub fn extended_registry() -> Registry {
    [*b"mdia", *b"minf", *b"stbl", *b"edts", *b"dinf"]
        .into_iter()
        .fold(default_registry(), |reg, cc| reg.with_container(FourCC(cc)))
}
