/// hz – Huffman text compression tool.
///
/// Works similar to gzip:
///   hz file.txt              → compress to file.txt.hz (removes original)
///   hz -d file.txt.hz        → decompress to file.txt (removes original)
///   hz -k file.txt           → keep original after compress
///   hz -o out.bin file.txt   → compress to an explicit output path
///   hz -c file.txt           → compress to stdout
///   hz -l file.txt.hz        → list info about compressed file
///   cat file | hz -c         → compress stdin to stdout
///   cat file | hz -dc        → decompress stdin to stdout
use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};

use hz::{CompressOptions, CompressionStats};

fn usage() {
    eprintln!("hz - lossless Huffman text compression tool");
    eprintln!();
    eprintln!("Usage: hz [OPTIONS] [FILE]...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -d, --decompress   Decompress mode");
    eprintln!("  -c, --stdout       Write to stdout (don't remove original)");
    eprintln!("  -o, --output PATH  Write to PATH (single input file only)");
    eprintln!("  -k, --keep         Keep original file");
    eprintln!("  -f, --force        Overwrite existing output files");
    eprintln!("  -l, --list         List info about compressed file");
    eprintln!("      --trim         Strip trailing whitespace before compressing (lossy)");
    eprintln!("  -q, --quiet        Suppress warnings");
    eprintln!("  -v, --verbose      Verbose output");
    eprintln!("  -h, --help         Show this help");
    eprintln!();
    eprintln!("If no FILE is given, reads from stdin and writes to stdout.");
    eprintln!("Compressed files use the .hz extension. Input text must be UTF-8.");
}

#[derive(Debug)]
struct Opts {
    decompress: bool,
    to_stdout: bool,
    output: Option<PathBuf>,
    keep: bool,
    force: bool,
    list: bool,
    trim: bool,
    verbose: bool,
    quiet: bool,
    files: Vec<String>,
}

fn parse_args() -> Opts {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut opts = Opts {
        decompress: false,
        to_stdout: false,
        output: None,
        keep: false,
        force: false,
        list: false,
        trim: false,
        verbose: false,
        quiet: false,
        files: Vec::new(),
    };

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-d" | "--decompress" => opts.decompress = true,
            "-c" | "--stdout" | "--to-stdout" => opts.to_stdout = true,
            "-k" | "--keep" => opts.keep = true,
            "-f" | "--force" => opts.force = true,
            "-l" | "--list" => opts.list = true,
            "-v" | "--verbose" => opts.verbose = true,
            "-q" | "--quiet" => opts.quiet = true,
            "--trim" => opts.trim = true,
            "-h" | "--help" => {
                usage();
                process::exit(0);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("hz: missing argument for -o");
                    process::exit(1);
                }
                opts.output = Some(PathBuf::from(&args[i]));
            }
            // Handle combined short flags like -dc, -kv, etc.
            s if s.starts_with('-') && !s.starts_with("--") && s.len() > 2 => {
                for ch in s[1..].chars() {
                    match ch {
                        'd' => opts.decompress = true,
                        'c' => opts.to_stdout = true,
                        'k' => opts.keep = true,
                        'f' => opts.force = true,
                        'l' => opts.list = true,
                        'v' => opts.verbose = true,
                        'q' => opts.quiet = true,
                        _ => {
                            eprintln!("hz: unknown flag '-{ch}'");
                            process::exit(1);
                        }
                    }
                }
            }
            s if s.starts_with("--") => {
                eprintln!("hz: unknown option '{s}'");
                process::exit(1);
            }
            _ => {
                opts.files.push(arg.clone());
            }
        }
        i += 1;
    }

    opts
}

fn init_logging(opts: &Opts) {
    let level = if opts.verbose {
        log::LevelFilter::Debug
    } else if opts.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp(None)
        .init();
}

/// Determine the output filename for compression.
fn compress_output_path(opts: &Opts, input: &str) -> PathBuf {
    opts.output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{input}.hz")))
}

/// Determine the output filename for decompression.
fn decompress_output_path(opts: &Opts, input: &str) -> Option<PathBuf> {
    if let Some(out) = &opts.output {
        return Some(out.clone());
    }
    let path = Path::new(input);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("hz") => Some(path.with_extension("")),
        _ => None,
    }
}

/// Build compression options from CLI flags.
fn build_cli_options(opts: &Opts) -> CompressOptions {
    CompressOptions {
        trim_trailing_whitespace: opts.trim,
    }
}

fn report_stats(path: &str, stats: &CompressionStats) {
    eprintln!(
        "{path}: {:.1}% ({} → {} bytes, {:.2}% smaller, {:.3} bits/symbol)",
        stats.ratio(),
        stats.original_bytes,
        stats.compressed_bytes,
        stats.savings(),
        stats.bits_per_symbol(),
    );
}

fn read_text(path: &str) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|e| format!("{path}: {e}"))?;
    String::from_utf8(bytes).map_err(|_| format!("{path}: input is not valid UTF-8 text"))
}

/// Write `data` to `out_path`, refusing to clobber unless forced.
fn write_output(opts: &Opts, out_path: &Path, data: &[u8]) -> Result<(), String> {
    let out_str = out_path.display().to_string();
    if out_path.exists() && !opts.force {
        return Err(format!("{out_str} already exists; use -f to overwrite"));
    }
    fs::write(out_path, data).map_err(|e| format!("{out_str}: {e}"))
}

fn remove_input(opts: &Opts, path: &str) -> Result<(), String> {
    if opts.keep || opts.to_stdout {
        return Ok(());
    }
    fs::remove_file(path).map_err(|e| format!("{path}: cannot remove: {e}"))
}

fn list_file(path: &str, data: &[u8]) -> Result<(), String> {
    let info = hz::inspect(data).map_err(|e| format!("{path}: {e}"))?;
    println!(
        "{:>12} {:>12} {:5.1}% {:>8} {:>8} {:>7.3} {}",
        info.original_bytes,
        info.compressed_bytes,
        info.ratio(),
        info.distinct_symbols,
        info.header_bytes,
        info.entropy,
        path,
    );
    Ok(())
}

fn process_compress(opts: &Opts, path: &str, options: &CompressOptions) -> Result<(), String> {
    if !Path::new(path).exists() {
        return Err(format!("{path}: no such file"));
    }
    let text = read_text(path)?;

    let out_path = compress_output_path(opts, path);
    if !opts.to_stdout && out_path.exists() && !opts.force {
        return Err(format!(
            "{} already exists; use -f to overwrite",
            out_path.display()
        ));
    }

    // Nothing is written unless compression succeeds.
    let compressed =
        hz::compress_with_options(&text, options).map_err(|e| format!("{path}: {e}"))?;

    if opts.to_stdout {
        io::stdout()
            .write_all(&compressed.data)
            .map_err(|e| format!("stdout: {e}"))?;
    } else {
        write_output(opts, &out_path, &compressed.data)?;
    }

    if opts.verbose {
        report_stats(path, &compressed.stats);
    }

    remove_input(opts, path)
}

fn process_decompress(opts: &Opts, path: &str) -> Result<(), String> {
    if !Path::new(path).exists() {
        return Err(format!("{path}: no such file"));
    }
    let out_path = if opts.to_stdout {
        None
    } else {
        Some(
            decompress_output_path(opts, path)
                .ok_or_else(|| format!("{path}: unknown suffix -- ignored"))?,
        )
    };

    let data = fs::read(path).map_err(|e| format!("{path}: {e}"))?;
    let text = hz::decompress(&data).map_err(|e| format!("{path}: {e}"))?;

    match out_path {
        None => io::stdout()
            .write_all(text.as_bytes())
            .map_err(|e| format!("stdout: {e}"))?,
        Some(out_path) => {
            write_output(opts, &out_path, text.as_bytes())?;
            if opts.verbose {
                eprintln!("{path}: {} → {} bytes", data.len(), text.len());
            }
        }
    }

    remove_input(opts, path)
}

fn process_stdin_stdout(opts: &Opts, options: &CompressOptions) -> Result<(), String> {
    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .map_err(|e| format!("stdin: {e}"))?;

    let output = if opts.decompress {
        hz::decompress(&input)
            .map_err(|e| format!("stdin: {e}"))?
            .into_bytes()
    } else {
        let text =
            String::from_utf8(input).map_err(|_| "stdin: input is not valid UTF-8 text".to_string())?;
        let compressed =
            hz::compress_with_options(&text, options).map_err(|e| format!("stdin: {e}"))?;
        if opts.verbose {
            report_stats("stdin", &compressed.stats);
        }
        compressed.data
    };

    io::stdout()
        .write_all(&output)
        .map_err(|e| format!("stdout: {e}"))
}

fn run() -> Result<(), ()> {
    let opts = parse_args();
    init_logging(&opts);
    let compress_options = build_cli_options(&opts);
    let mut had_error = false;

    if opts.output.is_some() && opts.files.len() != 1 {
        eprintln!("hz: -o requires exactly one input file");
        return Err(());
    }

    if opts.files.is_empty() {
        // stdin/stdout mode
        if opts.list {
            eprintln!("hz: -l requires a file argument");
            return Err(());
        }
        if let Err(e) = process_stdin_stdout(&opts, &compress_options) {
            eprintln!("hz: {e}");
            return Err(());
        }
        return Ok(());
    }

    // List mode
    if opts.list {
        println!(
            "{:>12} {:>12} {:>6} {:>8} {:>8} {:>7} name",
            "original", "compressed", "ratio", "symbols", "header", "entropy"
        );
        for path in &opts.files {
            match fs::read(path) {
                Ok(data) => {
                    if let Err(e) = list_file(path, &data) {
                        eprintln!("hz: {e}");
                        had_error = true;
                    }
                }
                Err(e) => {
                    eprintln!("hz: {path}: {e}");
                    had_error = true;
                }
            }
        }
        return if had_error { Err(()) } else { Ok(()) };
    }

    for path in &opts.files {
        let result = if path == "-" {
            process_stdin_stdout(&opts, &compress_options)
        } else if opts.decompress {
            process_decompress(&opts, path)
        } else {
            process_compress(&opts, path, &compress_options)
        };

        if let Err(e) = result {
            eprintln!("hz: {e}");
            had_error = true;
        }
    }

    if had_error {
        Err(())
    } else {
        Ok(())
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}
