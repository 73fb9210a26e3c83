use atomscan::FourCC;
use atomscan::known_atoms::KnownAtom;

#[test]
fn known_atom_from_ftyp() {
    let kb = KnownAtom::from(FourCC(*b"ftyp"));
    assert!(matches!(kb, KnownAtom::Ftyp));
    assert_eq!(kb.full_name(), "File Type Compatibility Atom");
}

#[test]
fn known_atom_classifies_container() {
    assert!(KnownAtom::from(FourCC(*b"moov")).is_container());
    assert!(KnownAtom::from(FourCC(*b"stbl")).is_container());
    assert!(!KnownAtom::from(FourCC(*b"mvhd")).is_container());
    assert!(!KnownAtom::from(FourCC(*b"mdat")).is_container());
}

#[test]
fn unknown_atom_keeps_its_code() {
    let cc = FourCC([0xA9, b'x', b'y', b'z']);
    assert_eq!(KnownAtom::from(cc), KnownAtom::Unknown(cc));
    assert_eq!(KnownAtom::from(cc).full_name(), "Unknown Atom");
}
