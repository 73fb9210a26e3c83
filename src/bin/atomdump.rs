use anyhow::Context;
use atomscan::{
    Atom, AtomData, AtomScanner, ReadChunks, ScanOptions, compose, default_registry,
    extended_registry, known_atoms::KnownAtom,
};
use clap::{ArgAction, Parser, ValueEnum};
use std::fs::File;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Streaming QuickTime/MP4 atom explorer")]
struct Args {
    /// File to scan, or `-` for stdin
    path: String,

    /// Bytes pulled from the input per chunk
    #[arg(long, default_value_t = 64 * 1024)]
    chunk_size: usize,

    /// Limit printed depth (text output only)
    #[arg(long, default_value_t = 64)]
    max_depth: usize,

    /// Also descend into mdia/minf/stbl/edts/dinf
    #[arg(long, action = ArgAction::SetTrue)]
    containers: bool,

    /// Print decoded fields under each atom
    #[arg(long, action = ArgAction::SetTrue)]
    decode: bool,

    /// Don't check that decoders consume exactly the declared payload
    #[arg(long, action = ArgAction::SetTrue)]
    no_verify: bool,

    /// Emit JSON instead of a human-readable tree
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Log level, overridden by RUST_LOG
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::builder().from_env_lossy()
    } else {
        EnvFilter::builder().parse_lossy(format!("atomscan={}", args.log_level.as_str()))
    };
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();

    let input: Box<dyn Read + Send> = if args.path == "-" {
        Box::new(std::io::stdin())
    } else {
        Box::new(File::open(&args.path).with_context(|| format!("opening {}", args.path))?)
    };

    let options = ScanOptions {
        verify_consumption: !args.no_verify,
        ..ScanOptions::default()
    };
    let table = if args.containers {
        extended_registry()
    } else {
        default_registry()
    };
    let scanner = compose(
        AtomScanner::with_options(ReadChunks::with_chunk_size(input, args.chunk_size), options),
        table,
    );

    if args.json {
        let atoms = scanner.collect::<atomscan::Result<Vec<Atom>>>()?;
        println!("{}", serde_json::to_string_pretty(&atoms)?);
        return Ok(());
    }

    // Print each top-level atom as soon as it is decoded.
    for atom in scanner {
        print_atom(&atom?, 0, &args);
    }
    Ok(())
}

// ---------- Human-readable tree ----------

fn print_atom(a: &Atom, depth: usize, args: &Args) {
    let indent = "  ".repeat(depth);
    let hdr = &a.header;
    let known = KnownAtom::from(hdr.typ);
    let ext = if hdr.is_extended() { " (64-bit)" } else { "" };
    println!(
        "{indent}{:>8} {:>12} {} [{}] {}{ext}",
        format!("{:#x}", hdr.offset),
        hdr.total_size(),
        hdr.typ,
        hex::encode(hdr.typ.0),
        known.full_name()
    );
    if args.decode {
        if let Some(s) = summary(a) {
            println!("{indent}    -> {s}");
        }
    }
    if depth < args.max_depth {
        for c in &a.children {
            print_atom(c, depth + 1, args);
        }
    }
}

fn summary(a: &Atom) -> Option<String> {
    match &a.data {
        AtomData::Ftyp(ftyp) => Some(format!(
            "major={} minor={} compatible={:?}",
            ftyp.major_brand_str().unwrap_or_default(),
            ftyp.minor_brand.map(hex::encode).unwrap_or_default(),
            ftyp.compatible_brand_strs()
        )),
        AtomData::Mvhd(m) => Some(format!(
            "version={} timescale={} duration={}{} rate={} volume={} next_track_id={}{}",
            m.version,
            m.time_scale,
            m.duration,
            m.duration_seconds()
                .map(|s| format!(" ({s:.3}s)"))
                .unwrap_or_default(),
            m.preferred_rate,
            m.volume(),
            m.next_track_id,
            if m.truncated { " [truncated]" } else { "" }
        )),
        AtomData::Moov(_) => Some(format!(
            "mvhd={} tracks={}",
            a.movie_header().is_some(),
            a.tracks().count()
        )),
        AtomData::Mdat => Some(format!("{} bytes of media data", a.header.data_size())),
        AtomData::Bytes { bytes } => Some(format!("{} bytes", bytes.len())),
        AtomData::Text { text } => Some(text.clone()),
        AtomData::Generic | AtomData::Trak | AtomData::Container => None,
    }
}
