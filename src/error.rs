use crate::atoms::FourCC;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("stream ended unexpectedly (wanted {requested} bytes, got {available})")]
    StreamEndedUnexpectedly { requested: u64, available: u64 },
    #[error("{container}: children exceed declared payload of {declared} bytes by {overflow}")]
    StructuralOverflow {
        container: FourCC,
        declared: u64,
        overflow: u64,
    },
    #[error("type code must be exactly 4 bytes, got {0}")]
    InvalidTypeCodeLength(usize),
    #[error("invalid size {size} for atom {typ} at offset {offset}")]
    InvalidSize { typ: FourCC, size: u64, offset: u64 },
    #[error("{typ}: decoder consumed {actual} bytes, declared payload is {expected}")]
    ConsumptionMismatch {
        typ: FourCC,
        expected: u64,
        actual: u64,
    },
    #[error("{typ}: nesting depth {depth} exceeds limit")]
    NestingTooDeep { typ: FourCC, depth: usize },
}

pub type Result<T> = std::result::Result<T, ParseError>;
