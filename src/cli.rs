// Command-line front end for the polyline codec.
//
// Subcommands read coordinate text or encoded polylines from a file or
// stdin and write to a file or stdout. Errors go to stderr with a
// non-zero exit code.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::codec::{EncodedPolyline, PRECISION_FACTOR, value};
use crate::coordinate::Coordinate;
use crate::io as pio;

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Google Encoded Polyline encoder/decoder.
#[derive(Parser, Debug)]
#[command(
    name = "gpolyline",
    version,
    about = "Encoded polyline encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode `lat,lng` lines into a polyline.
    Encode(EncodeArgs),
    /// Decode a polyline into coordinates.
    Decode(DecodeArgs),
    /// Check a polyline without decoding it to output.
    Validate(ValidateArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One `lat,lng` line per point.
    Text,
    /// JSON array of `[lat, lng]` pairs.
    Json,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Coordinate file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Polyline file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Check/compute only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Polyline file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "polyline")]
    input: Option<PathBuf>,

    /// Polyline given inline.
    polyline: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Validate,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    format: OutputFormat,
    no_output: bool,
    inline_polyline: Option<String>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        format: OutputFormat::Text,
        no_output: false,
        inline_polyline: None,
        input_file: None,
        output_file: None,
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Encode(args) => {
            opts.command = Command::Encode;
            opts.use_stdout = args.stdout;
            opts.input_file = args.input.or(args.input_pos);
            opts.output_file = args.output.or(args.output_pos);
        }
        Cmd::Decode(args) => {
            opts.command = Command::Decode;
            opts.use_stdout = args.stdout;
            opts.format = args.format;
            opts.no_output = args.no_output;
            opts.input_file = args.input.or(args.input_pos);
            opts.output_file = args.output.or(args.output_pos);
        }
        Cmd::Validate(args) => {
            opts.command = Command::Validate;
            opts.inline_polyline = args.polyline;
            opts.input_file = args.input;
        }
        Cmd::Config => {}
    }
    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("gpolyline".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

fn log_level(opts: &Options) -> log::LevelFilter {
    if opts.quiet {
        return log::LevelFilter::Error;
    }
    match opts.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

// ---------------------------------------------------------------------------
// Stream helpers
// ---------------------------------------------------------------------------

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, i32> {
    match path {
        Some(path) => match File::open(path) {
            Ok(f) => Ok(Box::new(BufReader::with_capacity(BUF_SIZE, f))),
            Err(e) => {
                eprintln!("gpolyline: input file: {}: {e}", path.display());
                Err(1)
            }
        },
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_output(opts: &Options) -> Result<Box<dyn Write>, i32> {
    match (opts.use_stdout, &opts.output_file) {
        (true, _) | (_, None) => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        (false, Some(path)) => {
            if path.exists() && !opts.force {
                eprintln!(
                    "gpolyline: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return Err(1);
            }
            match File::create(path) {
                Ok(f) => Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
                Err(e) => {
                    eprintln!("gpolyline: output file: {}: {e}", path.display());
                    Err(1)
                }
            }
        }
    }
}

fn read_polyline_input(opts: &Options) -> Result<String, i32> {
    if let Some(inline) = &opts.inline_polyline {
        return Ok(inline.trim().to_owned());
    }
    let reader = open_input(opts.input_file.as_deref())?;
    pio::read_polyline(reader).map_err(|e| {
        match e {
            pio::IoError::Decode(e) => eprintln!("gpolyline: {e}"),
            e => eprintln!("gpolyline: read error: {e}"),
        }
        1
    })
}

fn write_json_coordinates<W: Write>(w: &mut W, coordinates: &[Coordinate]) -> io::Result<()> {
    let pairs: Vec<[f64; 2]> = coordinates
        .iter()
        .map(|c| [c.latitude, c.longitude])
        .collect();
    writeln!(w, "{:#}", serde_json::json!(pairs))
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("gpolyline version {version} (Rust)");
    eprintln!("PRECISION_FACTOR={PRECISION_FACTOR}");
    eprintln!("CHAR_RANGE={}..={}", value::CHAR_OFFSET, value::MAX_CHAR);
    eprintln!("MAX_ENCODED_VALUE_LEN={}", value::MAX_ENCODED_LEN);
    eprintln!("FUZZING={}", cfg!(feature = "fuzzing") as u8);
    0
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn cmd_encode(opts: &Options) -> i32 {
    let reader = match open_input(opts.input_file.as_deref()) {
        Ok(r) => r,
        Err(code) => return code,
    };

    // Parse all input before any output is opened.
    let enc = match pio::encode_lines(reader) {
        Ok(enc) => enc,
        Err(e) => {
            eprintln!("gpolyline: encode error: {e}");
            return 1;
        }
    };

    let mut writer = match open_output(opts) {
        Ok(w) => w,
        Err(code) => return code,
    };
    let stats = match pio::write_encoded(&mut writer, enc) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("gpolyline: write error: {e}");
            return 1;
        }
    };

    log::info!(
        "encoder: points: {}, encoded length: {}",
        stats.points,
        stats.encoded_len
    );

    if opts.json_output {
        let json = serde_json::json!({
            "command": "encode",
            "points": stats.points,
            "encoded_len": stats.encoded_len,
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(opts: &Options) -> i32 {
    let polyline = match read_polyline_input(opts) {
        Ok(p) => p,
        Err(code) => return code,
    };

    // Validate fully before any output is opened.
    let coordinates = match EncodedPolyline::new(&polyline).and_then(|line| line.to_vec()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("gpolyline: decode error: {e}");
            return 1;
        }
    };

    if !opts.no_output {
        let mut writer = match open_output(opts) {
            Ok(w) => w,
            Err(code) => return code,
        };
        let written = match opts.format {
            OutputFormat::Text => pio::write_coordinates(&mut writer, &coordinates),
            OutputFormat::Json => write_json_coordinates(&mut writer, &coordinates),
        };
        if let Err(e) = written.and_then(|_| writer.flush()) {
            eprintln!("gpolyline: write error: {e}");
            return 1;
        }
    }

    log::info!(
        "decoder: encoded length: {}, points: {}",
        polyline.len(),
        coordinates.len()
    );

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decode",
            "encoded_len": polyline.len(),
            "points": coordinates.len(),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Validate command
// ---------------------------------------------------------------------------

fn cmd_validate(opts: &Options) -> i32 {
    let polyline = match read_polyline_input(opts) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let result = EncodedPolyline::new(&polyline);
    if opts.json_output {
        let json = match &result {
            Ok(line) => serde_json::json!({
                "command": "validate",
                "valid": true,
                "points": line.len(),
            }),
            Err(e) => serde_json::json!({
                "command": "validate",
                "valid": false,
                "position": e.position(),
                "error": e.to_string(),
            }),
        };
        eprintln!("{json:#}");
    }

    match result {
        Ok(line) => {
            if !opts.quiet {
                eprintln!("gpolyline: valid polyline, {} points", line.len());
            }
            0
        }
        Err(e) => {
            eprintln!("gpolyline: {e}");
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    env_logger::Builder::new()
        .filter_level(log_level(&opts))
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout && !opts.quiet {
        if let Some(path) = opts.output_file.take() {
            log::warn!("-c option overrides output filename: {}", path.display());
        }
    }

    let exit_code = match opts.command {
        Command::Encode => cmd_encode(&opts),
        Command::Decode => cmd_decode(&opts),
        Command::Validate => cmd_validate(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("gpolyline".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    #[test]
    fn encode_subcommand_maps_correctly() {
        let opts = parse_opts(&["encode", "route.txt", "route.polyline"]);
        assert_eq!(opts.command, Command::Encode);
        assert_eq!(opts.input_file, Some(PathBuf::from("route.txt")));
        assert_eq!(opts.output_file, Some(PathBuf::from("route.polyline")));
        assert!(!opts.use_stdout);
    }

    #[test]
    fn decode_subcommand_maps_correctly() {
        let opts = parse_opts(&[
            "--quiet",
            "decode",
            "--format",
            "json",
            "--check-only",
            "--input",
            "in.polyline",
        ]);
        assert_eq!(opts.command, Command::Decode);
        assert_eq!(opts.format, OutputFormat::Json);
        assert!(opts.no_output);
        assert!(opts.quiet);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.polyline")));
        assert_eq!(opts.output_file, None);
    }

    #[test]
    fn validate_inline_polyline() {
        let opts = parse_opts(&["validate", "_p~iF~ps|U"]);
        assert_eq!(opts.command, Command::Validate);
        assert_eq!(opts.inline_polyline.as_deref(), Some("_p~iF~ps|U"));
        assert!(opts.input_file.is_none());
    }

    #[test]
    fn validate_input_conflicts_with_inline() {
        let argv = ["gpolyline", "validate", "--input", "a", "_p~iF"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn global_stdio_and_force_flags() {
        let opts = parse_opts(&["--force", "encode", "--stdout", "in", "out"]);
        assert!(opts.use_stdout);
        assert!(opts.force);
    }

    #[test]
    fn verbose_is_capped() {
        let opts = parse_opts(&["--verbose", "--verbose", "--verbose", "encode", "in"]);
        assert_eq!(opts.verbose, 2);
        assert_eq!(log_level(&opts), log::LevelFilter::Debug);
    }

    #[test]
    fn quiet_lowers_log_level() {
        let opts = parse_opts(&["-q", "config"]);
        assert_eq!(log_level(&opts), log::LevelFilter::Error);
        assert_eq!(parse_opts(&["config"]).command, Command::Config);
    }

    #[test]
    fn json_coordinates_shape() {
        let mut out = Vec::new();
        write_json_coordinates(&mut out, &[Coordinate::new(38.5, -120.2)]).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v, serde_json::json!([[38.5, -120.2]]));
    }

    #[test]
    fn fuzz_hook_tolerates_garbage() {
        fuzz_try_parse_args(&["--nope".to_string()]);
        fuzz_try_parse_args(&["decode".to_string(), "--format".to_string(), "xml".to_string()]);
    }
}
