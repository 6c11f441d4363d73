use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use memmap2::Mmap;
use parlz::{
    decompress, ChecksumKind, CompressConfig, CompressedStream, Compressor, ParallelCompressor,
    SingleThreadedCompressor,
};

#[derive(Parser, Debug)]
#[command(name = "parlz")]
#[command(about = "Block-parallel LZ compression front end")]
#[command(version)]
struct Args {
    /// Input file (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (use - for stdout)
    #[arg(short, long, required_unless_present = "verify")]
    output: Option<PathBuf>,

    /// Number of worker threads (0 = auto, 1 = single-threaded)
    #[arg(short = 't', long, default_value = "0")]
    threads: usize,

    /// Uncompressed block size in bytes (power of two, 1024-32768)
    #[arg(long, default_value = "32768")]
    block_size: usize,

    /// Trailer checksum: crc32 or adler32
    #[arg(long, default_value = "crc32")]
    checksum: String,

    /// Decompress instead of compress
    #[arg(short, long)]
    decompress: bool,

    /// Round-trip the input in memory and exit (0=ok, 2=error)
    #[arg(long)]
    verify: bool,

    /// Show verbose statistics
    #[arg(short, long)]
    verbose: bool,
}

const EXIT_OK: u8 = 0;
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run() -> Result<u8, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let checksum = parse_checksum(&args.checksum)?;

    let config = CompressConfig {
        block_size: args.block_size,
        num_workers: args.threads,
        checksum,
        ..Default::default()
    };
    config.validate()?;

    let input = read_input(&args.input)?;

    if args.verify {
        return run_verify(&args, &config, &input);
    }

    let output_path = args.output.as_ref().expect("output required when not verifying");

    let start = std::time::Instant::now();

    if args.decompress {
        let decoded = decompress(&input, config.checksum)?;
        let elapsed = start.elapsed();
        write_output(output_path, &decoded)?;

        if args.verbose {
            eprintln!("Decompression complete:");
            eprintln!("  Input bytes:      {}", input.len());
            eprintln!("  Output bytes:     {}", decoded.len());
            eprintln!("  Time:             {:.2?}", elapsed);
            eprintln!(
                "  Throughput:       {:.1} MB/s",
                decoded.len() as f64 / elapsed.as_secs_f64() / 1_000_000.0
            );
        }
        return Ok(EXIT_OK);
    }

    let stream = run_compress(&config, &input)?;
    let elapsed = start.elapsed();
    write_output(output_path, &stream.bytes)?;

    if args.verbose {
        print_stats(&stream, elapsed);
    }

    Ok(EXIT_OK)
}

fn run_verify(
    args: &Args,
    config: &CompressConfig,
    input: &[u8],
) -> Result<u8, Box<dyn std::error::Error>> {
    let start = std::time::Instant::now();
    let stream = run_compress(config, input)?;
    let decoded = decompress(&stream.bytes, config.checksum)?;
    let elapsed = start.elapsed();

    if decoded != input {
        eprintln!("Verify: round trip mismatch");
        return Ok(EXIT_ERROR);
    }

    eprintln!("Verify: ok");
    if args.verbose {
        print_stats(&stream, elapsed);
    }
    Ok(EXIT_OK)
}

fn run_compress(
    config: &CompressConfig,
    input: &[u8],
) -> Result<CompressedStream, parlz::Error> {
    if config.num_workers == 1 {
        let mut compressor = SingleThreadedCompressor::new(config.clone());
        compressor.compress(input)
    } else {
        let mut compressor = ParallelCompressor::new(config.clone());
        compressor.compress(input)
    }
}

fn parse_checksum(name: &str) -> Result<ChecksumKind, Box<dyn std::error::Error>> {
    match name {
        "crc32" => Ok(ChecksumKind::Crc32),
        "adler32" => Ok(ChecksumKind::Adler32),
        other => Err(format!("unknown checksum '{}', expected crc32 or adler32", other).into()),
    }
}

fn read_input(path: &PathBuf) -> io::Result<Vec<u8>> {
    if path.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    let file = File::open(path)?;
    // Map file inputs so large jobs avoid a read copy before chunking.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap.to_vec())
}

fn write_output(path: &PathBuf, bytes: &[u8]) -> io::Result<()> {
    if path.to_str() == Some("-") {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()
    } else {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.flush()
    }
}

fn print_stats(stream: &CompressedStream, elapsed: std::time::Duration) {
    let stats = &stream.stats;
    eprintln!("Compression complete:");
    eprintln!("  Input bytes:      {}", stats.input_bytes);
    eprintln!("  Output bytes:     {}", stats.output_bytes);
    eprintln!("  Blocks:           {}", stats.blocks_written);
    eprintln!("  Stored blocks:    {}", stats.blocks_stored);
    eprintln!("  Tokens packed:    {}", stats.tokens_packed);
    eprintln!("  Checksum:         {:08x}", stream.checksum);
    eprintln!("  Time:             {:.2?}", elapsed);
    eprintln!(
        "  Throughput:       {:.1} MB/s",
        stats.input_bytes as f64 / elapsed.as_secs_f64() / 1_000_000.0
    );
}
