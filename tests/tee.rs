mod common;

use atomscan::{Atom, ByteReader, FourCC, quicktime_parser, tee, tee_with_limit};
use common::{MvhdFields, atom, chunked, ftyp, mvhd};
use std::io;
use std::thread;

fn movie() -> Vec<u8> {
    let mut v = ftyp(b"qt  ", [0, 0, 2, 0], &[b"qt  "]);
    v.extend(atom(b"mdat", &[0x11; 4096]));
    v.extend(atom(b"moov", &mvhd(&MvhdFields::default())));
    v
}

#[test]
fn both_branches_see_every_byte() {
    let data = movie();
    let (a, b) = tee(chunked(&data, 100));

    let raw = thread::spawn(move || {
        let mut bytes = Vec::new();
        for chunk in b {
            bytes.extend(chunk?);
        }
        Ok::<_, io::Error>(bytes)
    });

    let atoms: Vec<Atom> = quicktime_parser(a)
        .collect::<atomscan::Result<_>>()
        .unwrap();
    assert_eq!(
        atoms.iter().map(Atom::typ).collect::<Vec<_>>(),
        vec![FourCC(*b"ftyp"), FourCC(*b"mdat"), FourCC(*b"moov")]
    );
    assert_eq!(raw.join().unwrap().unwrap(), data);
}

#[test]
fn branches_parse_identically_on_two_threads() {
    let data = movie();
    let (a, b) = tee(chunked(&data, 33));

    let left = thread::spawn(move || quicktime_parser(a).collect::<atomscan::Result<Vec<Atom>>>());
    let right = thread::spawn(move || quicktime_parser(b).collect::<atomscan::Result<Vec<Atom>>>());

    let left = left.join().unwrap().unwrap();
    let right = right.join().unwrap().unwrap();
    let summary = |atoms: &[Atom]| -> Vec<(FourCC, u64, u64)> {
        atoms
            .iter()
            .flat_map(Atom::descendants)
            .map(|a| (a.typ(), a.header.offset, a.header.total_size()))
            .collect()
    };
    assert_eq!(summary(&left), summary(&right));
    assert_eq!(summary(&left).len(), 4);
}

#[test]
fn dropping_a_branch_leaves_the_other_intact() {
    let data = movie();
    let (a, b) = tee(chunked(&data, 10));

    let mut early = ByteReader::new(a);
    assert_eq!(early.read_bytes(8).unwrap(), &data[..8]);
    drop(early);

    let mut rest = ByteReader::new(b);
    assert_eq!(rest.read_bytes(data.len()).unwrap(), data);
    assert!(rest.done().unwrap());
}

#[test]
fn lagging_branch_buffers_what_the_other_pulled() {
    let data: Vec<u8> = (0..50).collect();
    let (mut a, b) = tee(chunked(&data, 10));

    assert_eq!(a.next().unwrap().unwrap(), &data[..10]);
    assert_eq!(a.next().unwrap().unwrap(), &data[10..20]);
    assert_eq!(b.backlog(), 2);
    assert_eq!(a.backlog(), 0);

    let collected: Vec<u8> = b.map(|c| c.unwrap()).flatten().collect();
    assert_eq!(collected, data);
}

#[test]
fn source_errors_reach_both_branches() {
    let chunks: Vec<io::Result<Vec<u8>>> = vec![
        Ok(vec![1, 2, 3]),
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "cut")),
    ];
    let (mut a, mut b) = tee(chunks.into_iter());

    assert!(a.next().unwrap().is_ok());
    assert_eq!(a.next().unwrap().unwrap_err().kind(), io::ErrorKind::UnexpectedEof);

    assert_eq!(b.next().unwrap().unwrap(), vec![1, 2, 3]);
    assert_eq!(b.next().unwrap().unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn backlog_limit_cuts_off_an_idle_branch() {
    let data: Vec<u8> = (0..50).collect();
    let (a, mut idle) = tee_with_limit(chunked(&data, 10), 2);

    let collected: Vec<u8> = a.map(|c| c.unwrap()).flatten().collect();
    assert_eq!(collected, data);

    assert_eq!(idle.backlog(), 0);
    assert_eq!(idle.next().unwrap().unwrap_err().kind(), io::ErrorKind::OutOfMemory);
}

#[test]
fn backlog_limit_allows_a_branch_that_keeps_up() {
    let data: Vec<u8> = (0..50).collect();
    let (mut a, mut b) = tee_with_limit(chunked(&data, 10), 2);

    let mut left = Vec::new();
    let mut right = Vec::new();
    loop {
        let mut pulled = false;
        for chunk in a.by_ref().take(2) {
            left.extend(chunk.unwrap());
            pulled = true;
        }
        while b.backlog() > 0 {
            right.extend(b.next().unwrap().unwrap());
        }
        if !pulled {
            break;
        }
    }
    assert!(b.next().is_none());
    assert_eq!(left, data);
    assert_eq!(right, data);
}
