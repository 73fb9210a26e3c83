use crate::atoms::{Atom, AtomData, AtomHeader, FourCC, FtypData, MoovData, MvhdData};
use crate::error::{ParseError, Result};
use crate::reader::ByteReader;
use crate::registry::AtomDecoder;
use crate::scanner::AtomScanner;
use byteorder::{BigEndian, ByteOrder};
use tracing::warn;

// ---------- Helpers ----------

/// Sequential reads bounded by an atom's declared payload.
///
/// Running out of payload or stream stops decoding without an error; the
/// caller keeps whatever fields were read.
struct Fields<'a> {
    reader: &'a mut ByteReader,
    typ: FourCC,
    remaining: u64,
    truncated: bool,
}

impl<'a> Fields<'a> {
    fn new(reader: &'a mut ByteReader, header: &AtomHeader) -> Self {
        Self {
            reader,
            typ: header.typ,
            remaining: header.data_size(),
            truncated: false,
        }
    }

    fn remaining(&self) -> u64 {
        self.remaining
    }

    fn take<const N: usize>(&mut self) -> Result<Option<[u8; N]>> {
        if self.truncated || self.remaining < N as u64 {
            self.truncated = true;
            return Ok(None);
        }
        match self.reader.read_array::<N>() {
            Ok(Some(v)) => {
                self.remaining -= N as u64;
                Ok(Some(v))
            }
            Ok(None) | Err(ParseError::StreamEndedUnexpectedly { .. }) => {
                warn!("{}: stream ended inside field", self.typ);
                self.truncated = true;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn u8(&mut self) -> Result<Option<u8>> {
        Ok(self.take::<1>()?.map(|b| b[0]))
    }

    fn u16(&mut self) -> Result<Option<u16>> {
        Ok(self.take::<2>()?.map(|b| BigEndian::read_u16(&b)))
    }

    fn u32(&mut self) -> Result<Option<u32>> {
        Ok(self.take::<4>()?.map(|b| BigEndian::read_u32(&b)))
    }

    fn u64(&mut self) -> Result<Option<u64>> {
        Ok(self.take::<8>()?.map(|b| BigEndian::read_u64(&b)))
    }

    /// Skip whatever is left of the payload, unless the stream already ended.
    fn finish(self) -> Result<bool> {
        if self.remaining > 0 && !self.reader.is_finished() {
            warn!("{}: {} bytes remaining", self.typ, self.remaining);
            self.reader.skip_bytes(self.remaining)?;
        }
        Ok(self.truncated)
    }
}

macro_rules! field {
    ($read:expr) => {
        match $read? {
            Some(v) => v,
            None => return Ok(None),
        }
    };
}

// ---------- Decoders ----------

/// ftyp: major brand, minor brand, compatible brands.
pub struct FtypDecoder;

impl AtomDecoder for FtypDecoder {
    fn decode(&self, scanner: &mut AtomScanner, header: AtomHeader) -> Result<Atom> {
        let mut f = Fields::new(scanner.reader_mut(), &header);
        let mut ftyp = FtypData {
            major_brand: f.take::<4>()?.map(FourCC),
            ..FtypData::default()
        };
        if ftyp.major_brand.is_some() {
            ftyp.minor_brand = f.take::<4>()?;
        }
        if ftyp.minor_brand.is_some() {
            while f.remaining() >= 4 {
                match f.take::<4>()? {
                    Some(brand) => ftyp.compatible_brands.push(FourCC(brand)),
                    None => break,
                }
            }
        }
        f.finish()?;
        Ok(Atom::new(header, AtomData::Ftyp(ftyp)))
    }
}

/// mvhd: fixed layout movie header. Version 1 widens the times and duration
/// to 64 bits.
pub struct MvhdDecoder;

impl MvhdDecoder {
    fn fields(f: &mut Fields<'_>, m: &mut MvhdData) -> Result<Option<()>> {
        m.version = field!(f.u8());
        m.flags = field!(f.take::<3>());
        if m.version == 1 {
            m.creation_time = field!(f.u64());
            m.modification_time = field!(f.u64());
            m.time_scale = field!(f.u32());
            m.duration = field!(f.u64());
        } else {
            m.creation_time = field!(f.u32()) as u64;
            m.modification_time = field!(f.u32()) as u64;
            m.time_scale = field!(f.u32());
            m.duration = field!(f.u32()) as u64;
        }
        m.preferred_rate = field!(f.u32()) as f32 / 65536.0;
        m.preferred_volume = field!(f.u16());
        m.reserved = field!(f.take::<10>());
        m.matrix = field!(f.take::<36>());
        m.preview_time = field!(f.u32());
        m.preview_duration = field!(f.u32());
        m.poster_time = field!(f.u32());
        m.selection_time = field!(f.u32());
        m.selection_duration = field!(f.u32());
        m.current_time = field!(f.u32());
        m.next_track_id = field!(f.u32());
        Ok(Some(()))
    }
}

impl AtomDecoder for MvhdDecoder {
    fn decode(&self, scanner: &mut AtomScanner, header: AtomHeader) -> Result<Atom> {
        let mut f = Fields::new(scanner.reader_mut(), &header);
        let mut mvhd = MvhdData::default();
        Self::fields(&mut f, &mut mvhd)?;
        mvhd.truncated = f.finish()?;
        Ok(Atom::new(header, AtomData::Mvhd(mvhd)))
    }
}

/// moov: container that also indexes its movie header and tracks.
pub struct MoovDecoder;

impl AtomDecoder for MoovDecoder {
    fn decode(&self, scanner: &mut AtomScanner, header: AtomHeader) -> Result<Atom> {
        let children = scanner.decode_children(&header)?;
        let mut moov = MoovData::default();
        for (i, child) in children.iter().enumerate() {
            match child.data {
                AtomData::Mvhd(_) if moov.mvhd.is_none() => moov.mvhd = Some(i),
                AtomData::Mvhd(_) => warn!("moov: ignoring extra mvhd at {}", child.header.offset),
                AtomData::Trak => moov.traks.push(i),
                _ => {}
            }
        }
        Ok(Atom {
            header,
            children,
            data: AtomData::Moov(moov),
        })
    }
}

/// trak: children are collected but not examined.
pub struct TrakDecoder;

impl AtomDecoder for TrakDecoder {
    fn decode(&self, scanner: &mut AtomScanner, header: AtomHeader) -> Result<Atom> {
        let children = scanner.decode_children(&header)?;
        Ok(Atom {
            header,
            children,
            data: AtomData::Trak,
        })
    }
}

/// Any atom whose payload is a plain sequence of child atoms.
pub struct ContainerDecoder;

impl AtomDecoder for ContainerDecoder {
    fn decode(&self, scanner: &mut AtomScanner, header: AtomHeader) -> Result<Atom> {
        let children = scanner.decode_children(&header)?;
        Ok(Atom {
            header,
            children,
            data: AtomData::Container,
        })
    }
}

/// mdat: payload is skipped, never buffered.
pub struct MdatDecoder;

impl AtomDecoder for MdatDecoder {
    fn decode(&self, scanner: &mut AtomScanner, header: AtomHeader) -> Result<Atom> {
        scanner.reader_mut().skip_bytes(header.data_size())?;
        Ok(Atom::new(header, AtomData::Mdat))
    }
}
