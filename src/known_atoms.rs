use crate::atoms::FourCC;

/// Names for the atom types commonly found in QuickTime and MP4 files.
///
/// Anything not in this list becomes `KnownAtom::Unknown(fourcc)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownAtom {
    // top level
    Ftyp,
    Moov,
    Mdat,
    Free,
    Skip,
    Wide,
    Pnot,
    Uuid,

    // moov
    Mvhd,
    Trak,
    Udta,
    Clip,
    Ctab,
    Cmov,
    Rmra,

    // trak
    Tkhd,
    Edts,
    Tref,
    Txas,
    Load,
    Imap,
    Mdia,

    Elst,

    // mdia
    Mdhd,
    Hdlr,
    Minf,

    // minf
    Vmhd,
    Smhd,
    Gmhd,
    Dinf,
    Stbl,

    Dref,

    // stbl
    Stsd,
    Stts,
    Ctts,
    Stss,
    Stps,
    Stsc,
    Stsz,
    Stco,
    Co64,
    Sdtp,

    Meta,
    Ilst,

    Unknown(FourCC),
}

impl From<FourCC> for KnownAtom {
    fn from(cc: FourCC) -> Self {
        match &cc.0 {
            b"ftyp" => KnownAtom::Ftyp,
            b"moov" => KnownAtom::Moov,
            b"mdat" => KnownAtom::Mdat,
            b"free" => KnownAtom::Free,
            b"skip" => KnownAtom::Skip,
            b"wide" => KnownAtom::Wide,
            b"pnot" => KnownAtom::Pnot,
            b"uuid" => KnownAtom::Uuid,

            b"mvhd" => KnownAtom::Mvhd,
            b"trak" => KnownAtom::Trak,
            b"udta" => KnownAtom::Udta,
            b"clip" => KnownAtom::Clip,
            b"ctab" => KnownAtom::Ctab,
            b"cmov" => KnownAtom::Cmov,
            b"rmra" => KnownAtom::Rmra,

            b"tkhd" => KnownAtom::Tkhd,
            b"edts" => KnownAtom::Edts,
            b"tref" => KnownAtom::Tref,
            b"txas" => KnownAtom::Txas,
            b"load" => KnownAtom::Load,
            b"imap" => KnownAtom::Imap,
            b"mdia" => KnownAtom::Mdia,

            b"elst" => KnownAtom::Elst,

            b"mdhd" => KnownAtom::Mdhd,
            b"hdlr" => KnownAtom::Hdlr,
            b"minf" => KnownAtom::Minf,

            b"vmhd" => KnownAtom::Vmhd,
            b"smhd" => KnownAtom::Smhd,
            b"gmhd" => KnownAtom::Gmhd,
            b"dinf" => KnownAtom::Dinf,
            b"stbl" => KnownAtom::Stbl,

            b"dref" => KnownAtom::Dref,

            b"stsd" => KnownAtom::Stsd,
            b"stts" => KnownAtom::Stts,
            b"ctts" => KnownAtom::Ctts,
            b"stss" => KnownAtom::Stss,
            b"stps" => KnownAtom::Stps,
            b"stsc" => KnownAtom::Stsc,
            b"stsz" => KnownAtom::Stsz,
            b"stco" => KnownAtom::Stco,
            b"co64" => KnownAtom::Co64,
            b"sdtp" => KnownAtom::Sdtp,

            b"meta" => KnownAtom::Meta,
            b"ilst" => KnownAtom::Ilst,

            _ => KnownAtom::Unknown(cc),
        }
    }
}

impl KnownAtom {
    pub fn full_name(&self) -> &'static str {
        match self {
            KnownAtom::Ftyp => "File Type Compatibility Atom",
            KnownAtom::Moov => "Movie Atom",
            KnownAtom::Mdat => "Movie Data Atom",
            KnownAtom::Free => "Free Space Atom",
            KnownAtom::Skip => "Skip Atom",
            KnownAtom::Wide => "Wide Atom",
            KnownAtom::Pnot => "Preview Atom",
            KnownAtom::Uuid => "User Extension Atom",
            KnownAtom::Mvhd => "Movie Header Atom",
            KnownAtom::Trak => "Track Atom",
            KnownAtom::Udta => "User Data Atom",
            KnownAtom::Clip => "Clipping Atom",
            KnownAtom::Ctab => "Color Table Atom",
            KnownAtom::Cmov => "Compressed Movie Atom",
            KnownAtom::Rmra => "Reference Movie Atom",
            KnownAtom::Tkhd => "Track Header Atom",
            KnownAtom::Edts => "Edit Atom",
            KnownAtom::Tref => "Track Reference Atom",
            KnownAtom::Txas => "Track Exclude From Autoselection Atom",
            KnownAtom::Load => "Track Load Settings Atom",
            KnownAtom::Imap => "Track Input Map Atom",
            KnownAtom::Mdia => "Media Atom",
            KnownAtom::Elst => "Edit List Atom",
            KnownAtom::Mdhd => "Media Header Atom",
            KnownAtom::Hdlr => "Handler Reference Atom",
            KnownAtom::Minf => "Media Information Atom",
            KnownAtom::Vmhd => "Video Media Information Header Atom",
            KnownAtom::Smhd => "Sound Media Information Header Atom",
            KnownAtom::Gmhd => "Base Media Information Header Atom",
            KnownAtom::Dinf => "Data Information Atom",
            KnownAtom::Stbl => "Sample Table Atom",
            KnownAtom::Dref => "Data Reference Atom",
            KnownAtom::Stsd => "Sample Description Atom",
            KnownAtom::Stts => "Time-to-Sample Atom",
            KnownAtom::Ctts => "Composition Offset Atom",
            KnownAtom::Stss => "Sync Sample Atom",
            KnownAtom::Stps => "Partial Sync Sample Atom",
            KnownAtom::Stsc => "Sample-to-Chunk Atom",
            KnownAtom::Stsz => "Sample Size Atom",
            KnownAtom::Stco => "Chunk Offset Atom",
            KnownAtom::Co64 => "64-bit Chunk Offset Atom",
            KnownAtom::Sdtp => "Sample Dependency Flags Atom",
            KnownAtom::Meta => "Metadata Atom",
            KnownAtom::Ilst => "Metadata Item List Atom",
            KnownAtom::Unknown(_) => "Unknown Atom",
        }
    }

    /// Is the payload a plain sequence of child atoms?
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            KnownAtom::Moov
                | KnownAtom::Trak
                | KnownAtom::Udta
                | KnownAtom::Clip
                | KnownAtom::Cmov
                | KnownAtom::Rmra
                | KnownAtom::Edts
                | KnownAtom::Tref
                | KnownAtom::Imap
                | KnownAtom::Mdia
                | KnownAtom::Minf
                | KnownAtom::Gmhd
                | KnownAtom::Dinf
                | KnownAtom::Stbl
        )
    }
}
