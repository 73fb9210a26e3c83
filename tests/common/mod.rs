#![allow(dead_code)]

use std::io;

pub type Chunks = std::vec::IntoIter<io::Result<Vec<u8>>>;

/// Deliver `data` in chunks of `size` bytes (the last one may be shorter).
pub fn chunked(data: &[u8], size: usize) -> Chunks {
    data.chunks(size.max(1))
        .map(|c| Ok(c.to_vec()))
        .collect::<Vec<_>>()
        .into_iter()
}

/// Deliver `data` split at the given offsets.
pub fn split_at(data: &[u8], cuts: &[usize]) -> Chunks {
    let mut cuts: Vec<usize> = cuts.iter().map(|&c| c.min(data.len())).collect();
    cuts.sort_unstable();
    let mut out = Vec::new();
    let mut start = 0;
    for cut in cuts.into_iter().chain(std::iter::once(data.len())) {
        out.push(Ok(data[start..cut].to_vec()));
        start = cut;
    }
    out.into_iter()
}

pub fn atom(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&(payload.len() as u32 + 8).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

pub fn extended_atom(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&1u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(&(payload.len() as u64 + 16).to_be_bytes());
    v.extend_from_slice(payload);
    v
}

pub fn ftyp(major: &[u8; 4], minor: [u8; 4], compatible: &[&[u8; 4]]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(major);
    payload.extend_from_slice(&minor);
    for brand in compatible {
        payload.extend_from_slice(*brand);
    }
    atom(b"ftyp", &payload)
}

/// Version 0 movie header fields, in payload order.
#[derive(Clone, Debug)]
pub struct MvhdFields {
    pub creation_time: u32,
    pub modification_time: u32,
    pub time_scale: u32,
    pub duration: u32,
    pub preferred_rate: u32,
    pub preferred_volume: u16,
    pub matrix: [u8; 36],
    pub preview_time: u32,
    pub preview_duration: u32,
    pub poster_time: u32,
    pub selection_time: u32,
    pub selection_duration: u32,
    pub current_time: u32,
    pub next_track_id: u32,
}

impl Default for MvhdFields {
    fn default() -> Self {
        let mut matrix = [0u8; 36];
        // identity: 1.0 at a, d (16.16) and w (2.30)
        matrix[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        matrix[16..20].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        matrix[32..36].copy_from_slice(&0x4000_0000u32.to_be_bytes());
        Self {
            creation_time: 3_600_000_000,
            modification_time: 3_600_000_123,
            time_scale: 600,
            duration: 6_000,
            preferred_rate: 0x0001_0000,
            preferred_volume: 0x0100,
            matrix,
            preview_time: 1,
            preview_duration: 2,
            poster_time: 3,
            selection_time: 4,
            selection_duration: 5,
            current_time: 6,
            next_track_id: 2,
        }
    }
}

pub fn mvhd_payload(f: &MvhdFields) -> Vec<u8> {
    let mut v = vec![0u8, 0, 0, 0]; // version 0, flags
    v.extend_from_slice(&f.creation_time.to_be_bytes());
    v.extend_from_slice(&f.modification_time.to_be_bytes());
    v.extend_from_slice(&f.time_scale.to_be_bytes());
    v.extend_from_slice(&f.duration.to_be_bytes());
    v.extend_from_slice(&f.preferred_rate.to_be_bytes());
    v.extend_from_slice(&f.preferred_volume.to_be_bytes());
    v.extend_from_slice(&[0u8; 10]);
    v.extend_from_slice(&f.matrix);
    for x in [
        f.preview_time,
        f.preview_duration,
        f.poster_time,
        f.selection_time,
        f.selection_duration,
        f.current_time,
        f.next_track_id,
    ] {
        v.extend_from_slice(&x.to_be_bytes());
    }
    v
}

pub fn mvhd(f: &MvhdFields) -> Vec<u8> {
    atom(b"mvhd", &mvhd_payload(f))
}
