use crate::error::{ParseError, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Seconds between the QuickTime epoch (1904-01-01) and the Unix epoch.
pub const QUICKTIME_EPOCH_OFFSET: i64 = 2_082_844_800;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}

impl TryFrom<&[u8]> for FourCC {
    type Error = ParseError;

    fn try_from(b: &[u8]) -> Result<Self> {
        let code: [u8; 4] = b
            .try_into()
            .map_err(|_| ParseError::InvalidTypeCodeLength(b.len()))?;
        Ok(FourCC(code))
    }
}

impl FromStr for FourCC {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        FourCC::try_from(s.as_bytes())
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(code: [u8; 4]) -> Self {
        FourCC(code)
    }
}

impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

impl Serialize for FourCC {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.as_str_lossy())
    }
}

/// Preorder index of an atom within the scan that produced it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
pub struct AtomId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtomHeader {
    pub id: AtomId,
    /// Enclosing container, `None` for top-level atoms.
    pub parent: Option<AtomId>,
    /// Stream position of the first header byte.
    pub offset: u64,
    /// Raw 32-bit size field; `1` means `extended_size` carries the real size.
    pub size: u32,
    pub typ: FourCC,
    pub extended_size: Option<u64>,
}

impl AtomHeader {
    pub fn is_extended(&self) -> bool {
        self.size == 1
    }

    pub fn header_size(&self) -> u64 {
        if self.is_extended() { 16 } else { 8 }
    }

    /// Declared size of the whole atom, header included.
    pub fn total_size(&self) -> u64 {
        match self.extended_size {
            Some(ext) if self.is_extended() => ext,
            _ => self.size as u64,
        }
    }

    /// Declared payload length.
    pub fn data_size(&self) -> u64 {
        if self.is_extended() {
            self.extended_size.unwrap_or(0).saturating_sub(16)
        } else if self.size == 0 {
            0
        } else {
            (self.size as u64).saturating_sub(8)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Atom {
    #[serde(flatten)]
    pub header: AtomHeader,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Atom>,
    pub data: AtomData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AtomData {
    Generic,
    Ftyp(FtypData),
    Mvhd(MvhdData),
    Moov(MoovData),
    Trak,
    Container,
    Mdat,
    Bytes {
        #[serde(serialize_with = "hex_bytes")]
        bytes: Vec<u8>,
    },
    Text { text: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FtypData {
    pub major_brand: Option<FourCC>,
    #[serde(serialize_with = "hex_opt")]
    pub minor_brand: Option<[u8; 4]>,
    pub compatible_brands: Vec<FourCC>,
}

impl FtypData {
    pub fn major_brand_str(&self) -> Option<String> {
        self.major_brand.map(|b| b.as_str_lossy())
    }

    /// QuickTime stores a version number here, ISO files usually a brand.
    pub fn minor_brand_str(&self) -> Option<String> {
        self.minor_brand.map(|b| FourCC(b).as_str_lossy())
    }

    pub fn minor_version(&self) -> Option<u32> {
        self.minor_brand.map(u32::from_be_bytes)
    }

    pub fn compatible_brand_strs(&self) -> Vec<String> {
        self.compatible_brands.iter().map(FourCC::as_str_lossy).collect()
    }
}

/// Movie header. Times are seconds since 1904-01-01 UTC; durations are in
/// `time_scale` units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MvhdData {
    pub version: u8,
    #[serde(serialize_with = "hex_bytes")]
    pub flags: [u8; 3],
    pub creation_time: u64,
    pub modification_time: u64,
    pub time_scale: u32,
    pub duration: u64,
    pub preferred_rate: f32,
    pub preferred_volume: u16,
    #[serde(serialize_with = "hex_bytes")]
    pub reserved: [u8; 10],
    #[serde(serialize_with = "hex_bytes")]
    pub matrix: [u8; 36],
    pub preview_time: u32,
    pub preview_duration: u32,
    pub poster_time: u32,
    pub selection_time: u32,
    pub selection_duration: u32,
    pub current_time: u32,
    pub next_track_id: u32,
    /// Set when the payload or the stream ended before the last field.
    pub truncated: bool,
}

impl Default for MvhdData {
    fn default() -> Self {
        Self {
            version: 0,
            flags: [0; 3],
            creation_time: 0,
            modification_time: 0,
            time_scale: 0,
            duration: 0,
            preferred_rate: 0.0,
            preferred_volume: 0,
            reserved: [0; 10],
            matrix: [0; 36],
            preview_time: 0,
            preview_duration: 0,
            poster_time: 0,
            selection_time: 0,
            selection_duration: 0,
            current_time: 0,
            next_track_id: 0,
            truncated: false,
        }
    }
}

impl MvhdData {
    pub fn creation_unix_seconds(&self) -> i64 {
        self.creation_time as i64 - QUICKTIME_EPOCH_OFFSET
    }

    pub fn modification_unix_seconds(&self) -> i64 {
        self.modification_time as i64 - QUICKTIME_EPOCH_OFFSET
    }

    /// 8.8 fixed point, 1.0 is full volume.
    pub fn volume(&self) -> f32 {
        self.preferred_volume as f32 / 256.0
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        (self.time_scale != 0).then(|| self.duration as f64 / self.time_scale as f64)
    }
}

/// Indexes into the owning `moov` atom's `children`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MoovData {
    pub mvhd: Option<usize>,
    pub traks: Vec<usize>,
}

impl Atom {
    pub fn new(header: AtomHeader, data: AtomData) -> Self {
        Self {
            header,
            children: Vec::new(),
            data,
        }
    }

    pub fn generic(header: AtomHeader) -> Self {
        Self::new(header, AtomData::Generic)
    }

    pub fn typ(&self) -> FourCC {
        self.header.typ
    }

    pub fn id(&self) -> AtomId {
        self.header.id
    }

    pub fn movie_header(&self) -> Option<&MvhdData> {
        let AtomData::Moov(moov) = &self.data else {
            return None;
        };
        match &self.children.get(moov.mvhd?)?.data {
            AtomData::Mvhd(mvhd) => Some(mvhd),
            _ => None,
        }
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Atom> {
        let traks: &[usize] = match &self.data {
            AtomData::Moov(moov) => &moov.traks,
            _ => &[],
        };
        traks.iter().filter_map(|&i| self.children.get(i))
    }

    /// Preorder walk over this atom and everything below it.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn find(&self, id: AtomId) -> Option<&Atom> {
        self.descendants().find(|a| a.header.id == id)
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Atom>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Atom;

    fn next(&mut self) -> Option<&'a Atom> {
        let atom = self.stack.pop()?;
        self.stack.extend(atom.children.iter().rev());
        Some(atom)
    }
}

fn hex_bytes<S: Serializer, B: AsRef<[u8]>>(b: &B, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(b))
}

fn hex_opt<S: Serializer>(b: &Option<[u8; 4]>, s: S) -> std::result::Result<S::Ok, S::Error> {
    match b {
        Some(b) => s.serialize_some(&hex::encode(b)),
        None => s.serialize_none(),
    }
}
