// Command line front end for Oxivarint.
//
// Raw inputs are files of 8-byte big-endian integers; varint streams are the
// concatenated groups produced by the codec. The value type comes from
// `--type` or, failing that, from a `.uint64` / `.sint64` input extension.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use log::{debug, info};

use crate::io::{decode_buffer, encode_buffer, roundtrip_buffer, to_be_bytes};
use crate::varint::{
    CONT_MASK, Groups, MAX_VARINT_LEN, PAYLOAD_BITS, PAYLOAD_MASK, TrailingGroup, ValueKind,
    VarIntError, decode_u64, zigzag_decode,
};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Varint / zigzag codec for 64-bit integers.
#[derive(Parser, Debug)]
#[command(
    name = "oxivarint",
    version,
    about = "Base-128 varint encoder/decoder for uint64 and sint64 values",
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
    /// Encode big-endian 64-bit values into a varint stream.
    Encode(CodecArgs),
    /// Decode a varint stream into big-endian 64-bit values.
    Decode(DecodeArgs),
    /// Encode then decode big-endian values and verify the result.
    Roundtrip(RoundtripArgs),
    /// List every group of a varint stream.
    Inspect(InspectArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TypeArg {
    Uint64,
    Sint64,
}

#[derive(Args, Debug)]
struct TypeSelect {
    /// Value type (default: inferred from the input file extension).
    #[arg(long = "type", short = 't', value_enum)]
    kind: Option<TypeArg>,
}

#[derive(Args, Debug)]
struct CodecArgs {
    #[command(flatten)]
    select: TypeSelect,

    /// Input file (default: stdin).
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
    #[command(flatten)]
    codec: CodecArgs,

    /// Drop an incomplete trailing group instead of failing.
    #[arg(long)]
    lenient: bool,
}

#[derive(Args, Debug)]
struct RoundtripArgs {
    #[command(flatten)]
    select: TypeSelect,

    /// Big-endian value file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    select: TypeSelect,

    /// Varint stream file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Roundtrip,
    Inspect,
    Config,
}

struct Options {
    command: Command,
    kind: Option<ValueKind>,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    lenient: bool,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn value_kind(select: &TypeSelect) -> Option<ValueKind> {
    select.kind.map(|k| match k {
        TypeArg::Uint64 => ValueKind::Unsigned,
        TypeArg::Sint64 => ValueKind::Signed,
    })
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        kind: None,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        lenient: false,
        input_file: None,
        output_file: None,
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Encode(args) => {
            opts.command = Command::Encode;
            opts.kind = value_kind(&args.select);
            opts.use_stdout = args.stdout;
            opts.input_file = args.input.or(args.input_pos);
            opts.output_file = args.output.or(args.output_pos);
        }
        Cmd::Decode(args) => {
            opts.command = Command::Decode;
            opts.kind = value_kind(&args.codec.select);
            opts.use_stdout = args.codec.stdout;
            opts.lenient = args.lenient;
            opts.input_file = args.codec.input.or(args.codec.input_pos);
            opts.output_file = args.codec.output.or(args.codec.output_pos);
        }
        Cmd::Roundtrip(args) => {
            opts.command = Command::Roundtrip;
            opts.kind = value_kind(&args.select);
            opts.input_file = Some(args.input);
        }
        Cmd::Inspect(args) => {
            opts.command = Command::Inspect;
            opts.kind = value_kind(&args.select);
            opts.input_file = Some(args.input);
        }
        Cmd::Config => {}
    }

    opts
}

/// Explicit `--type` wins; otherwise the input extension decides.
fn resolve_kind(opts: &Options) -> Result<ValueKind, String> {
    if let Some(kind) = opts.kind {
        return Ok(kind);
    }
    opts.input_file
        .as_deref()
        .and_then(ValueKind::from_extension)
        .ok_or_else(|| {
            "cannot infer value type from input; pass --type uint64 or --type sint64".to_string()
        })
}

fn trailing_policy(opts: &Options) -> TrailingGroup {
    if opts.lenient {
        TrailingGroup::Drop
    } else {
        TrailingGroup::Reject
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxivarint".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        let _ = resolve_kind(&opts);
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// `[0xac, 0x02]` style rendering of a byte slice.
fn hex_list(bytes: &[u8]) -> String {
    let items: Vec<String> = bytes.iter().map(|b| format!("{b:#04x}")).collect();
    format!("[{}]", items.join(", "))
}

fn hex_compact(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Input / output plumbing
// ---------------------------------------------------------------------------

fn read_input(opts: &Options) -> Result<Vec<u8>, String> {
    match &opts.input_file {
        Some(path) => std::fs::read(path).map_err(|e| format!("input file: {}: {e}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map_err(|e| format!("read error: {e}"))?;
            Ok(buf)
        }
    }
}

fn open_output(opts: &Options) -> Result<Box<dyn Write>, String> {
    match (opts.use_stdout, &opts.output_file) {
        (true, _) | (_, None) => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        (false, Some(path)) => {
            if path.exists() && !opts.force {
                return Err(format!(
                    "output file exists, use -f to overwrite: {}",
                    path.display()
                ));
            }
            File::create(path)
                .map(|f| Box::new(BufWriter::with_capacity(BUF_SIZE, f)) as Box<dyn Write>)
                .map_err(|e| format!("output file: {}: {e}", path.display()))
        }
    }
}

fn write_output(opts: &Options, data: &[u8]) -> Result<(), String> {
    let mut writer = open_output(opts)?;
    writer
        .write_all(data)
        .and_then(|()| writer.flush())
        .map_err(|e| format!("write error: {e}"))
}

fn input_label(opts: &Options) -> String {
    opts.input_file
        .as_deref()
        .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn cmd_encode(opts: &Options) -> Result<(), String> {
    let kind = resolve_kind(opts)?;
    let raw = read_input(opts)?;
    let encoded = encode_buffer(kind, &raw).map_err(|e| format!("encode error: {e}"))?;

    write_output(opts, &encoded.stream)?;

    if opts.verbose > 0 && !opts.quiet {
        eprintln!("input: {} == {}", hex_list(&raw), encoded.values);
        eprintln!("encoded: {}", hex_list(&encoded.stream));
    }
    info!(
        "encoded {} {kind} values from {}",
        encoded.values.len(),
        input_label(opts)
    );

    if opts.json_output {
        let json = serde_json::json!({
            "command": "encode",
            "type": kind.name(),
            "values": encoded.values.len(),
            "input_size": raw.len(),
            "output_size": encoded.stream.len(),
        });
        eprintln!("{json:#}");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(opts: &Options) -> Result<(), String> {
    let kind = resolve_kind(opts)?;
    let stream = read_input(opts)?;
    let values = decode_buffer(kind, &stream, trailing_policy(opts))
        .map_err(|e| format!("decode error: {e}"))?;
    let raw = to_be_bytes(&values);

    write_output(opts, &raw)?;

    if opts.verbose > 0 && !opts.quiet {
        eprintln!("input: {}", hex_list(&stream));
        eprintln!("decoded: {values}");
    }
    info!("decoded {} {kind} values from {}", values.len(), input_label(opts));

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decode",
            "type": kind.name(),
            "values": values.len(),
            "input_size": stream.len(),
            "output_size": raw.len(),
        });
        eprintln!("{json:#}");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Roundtrip command
// ---------------------------------------------------------------------------

fn cmd_roundtrip(opts: &Options) -> Result<(), String> {
    let kind = resolve_kind(opts)?;
    let raw = read_input(opts)?;
    let rt = roundtrip_buffer(kind, &raw).map_err(|e| format!("roundtrip error: {e}"))?;

    if !opts.quiet {
        eprintln!("input: {} == {}", hex_list(&raw), rt.encoded.values);
        eprintln!("encoded: {}", hex_list(&rt.encoded.stream));
        eprintln!("decoded: {}", rt.decoded);
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "roundtrip",
            "type": kind.name(),
            "values": rt.decoded.len(),
            "input_size": raw.len(),
            "encoded_size": rt.encoded.stream.len(),
        });
        eprintln!("{json:#}");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(opts: &Options) -> Result<(), String> {
    let kind = resolve_kind(opts)?;
    let stream = read_input(opts)?;
    let stdout = io::stdout();
    let mut out = BufWriter::with_capacity(BUF_SIZE, stdout.lock());
    let mut count = 0usize;
    let mut failure: Option<VarIntError> = None;

    let mut emit = |line: String| -> Result<(), String> {
        writeln!(out, "{line}").map_err(|e| format!("write error: {e}"))
    };

    emit(format!("{:>10}  {:<29}  {kind}", "offset", "bytes"))?;
    for group in Groups::new(&stream) {
        let group = match group {
            Ok(g) => g,
            Err(e) => {
                failure = Some(e);
                break;
            }
        };
        let raw = match decode_u64(group.bytes) {
            Ok(v) => v,
            Err(e) => {
                failure = Some(e.at(group.offset));
                break;
            }
        };
        let value = match kind {
            ValueKind::Unsigned => raw.to_string(),
            ValueKind::Signed => format!("{} (zigzag {raw})", zigzag_decode(raw)),
        };
        emit(format!(
            "{:>10}  {:<29}  {value}",
            group.offset,
            hex_compact(group.bytes)
        ))?;
        count += 1;
    }
    drop(emit);
    out.flush().map_err(|e| format!("write error: {e}"))?;

    debug!("inspected {count} groups in {} bytes", stream.len());

    if opts.json_output {
        let json = serde_json::json!({
            "command": "inspect",
            "type": kind.name(),
            "groups": count,
            "input_size": stream.len(),
            "error": failure.map(|e| e.to_string()),
        });
        eprintln!("{json:#}");
    }

    match failure {
        Some(e) => Err(format!("inspect error: {e}")),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> Result<(), String> {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("oxivarint version {version} (Rust)");

    let parallel = cfg!(feature = "parallel") as u8;

    eprintln!("PARALLEL={parallel}");
    eprintln!("MAX_VARINT_LEN={MAX_VARINT_LEN}");
    eprintln!("PAYLOAD_BITS={PAYLOAD_BITS}");
    eprintln!("PAYLOAD_MASK={PAYLOAD_MASK:#04x}");
    eprintln!("CONT_MASK={CONT_MASK:#04x}");
    eprintln!("VALUE_WIDTH={}", crate::io::VALUE_WIDTH);

    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn log_filter(opts: &Options) -> &'static str {
    match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    }
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout
        && !opts.quiet
        && let Some(path) = opts.output_file.take()
    {
        eprintln!(
            "oxivarint: warning: -c option overrides output filename: {}",
            path.display()
        );
    }

    let result = match opts.command {
        Command::Encode => cmd_encode(&opts),
        Command::Decode => cmd_decode(&opts),
        Command::Roundtrip => cmd_roundtrip(&opts),
        Command::Inspect => cmd_inspect(&opts),
        Command::Config => cmd_config(),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(msg) => {
            eprintln!("oxivarint: {msg}");
            process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("oxivarint".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    #[test]
    fn encode_subcommand_maps_correctly() {
        let opts = parse_opts(&["encode", "--type", "sint64", "in.bin", "out.varint"]);
        assert_eq!(opts.command, Command::Encode);
        assert_eq!(opts.kind, Some(ValueKind::Signed));
        assert_eq!(opts.input_file, Some(PathBuf::from("in.bin")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.varint")));
        assert!(!opts.use_stdout);
    }

    #[test]
    fn decode_subcommand_maps_correctly() {
        let opts = parse_opts(&[
            "--quiet",
            "decode",
            "-t",
            "uint64",
            "--lenient",
            "--input",
            "in.varint",
            "--output",
            "out.uint64",
        ]);
        assert_eq!(opts.command, Command::Decode);
        assert!(opts.quiet);
        assert!(opts.lenient);
        assert_eq!(trailing_policy(&opts), TrailingGroup::Drop);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.varint")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.uint64")));
    }

    #[test]
    fn strict_decode_by_default() {
        let opts = parse_opts(&["decode", "x.sint64"]);
        assert_eq!(trailing_policy(&opts), TrailingGroup::Reject);
    }

    #[test]
    fn type_inferred_from_extension() {
        let opts = parse_opts(&["roundtrip", "tests/min.sint64"]);
        assert_eq!(opts.kind, None);
        assert_eq!(resolve_kind(&opts), Ok(ValueKind::Signed));

        let opts = parse_opts(&["inspect", "stream.uint64"]);
        assert_eq!(resolve_kind(&opts), Ok(ValueKind::Unsigned));
    }

    #[test]
    fn explicit_type_overrides_extension() {
        let opts = parse_opts(&["roundtrip", "--type", "uint64", "tests/min.sint64"]);
        assert_eq!(resolve_kind(&opts), Ok(ValueKind::Unsigned));
    }

    #[test]
    fn unknown_extension_needs_type() {
        let opts = parse_opts(&["encode", "data.bin"]);
        assert!(resolve_kind(&opts).is_err());
        let opts = parse_opts(&["encode"]);
        assert!(resolve_kind(&opts).is_err());
    }

    #[test]
    fn invalid_type_is_rejected() {
        let argv = ["oxivarint", "encode", "--type", "int32", "in"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn global_stdio_and_force_flags() {
        let opts = parse_opts(&["--force", "encode", "--stdout", "in.uint64", "out"]);
        assert!(opts.use_stdout);
        assert!(opts.force);
    }

    #[test]
    fn verbose_is_capped() {
        let opts = parse_opts(&["-v", "-v", "-v", "encode", "in.uint64"]);
        assert_eq!(opts.verbose, 2);
        assert_eq!(log_filter(&opts), "debug");
        assert_eq!(log_filter(&parse_opts(&["-q", "config"])), "error");
        assert_eq!(log_filter(&parse_opts(&["config"])), "warn");
    }

    #[test]
    fn config_command_maps() {
        assert_eq!(parse_opts(&["config"]).command, Command::Config);
    }

    #[test]
    fn hex_rendering() {
        assert_eq!(hex_list(&[0xAC, 0x02]), "[0xac, 0x02]");
        assert_eq!(hex_list(&[]), "[]");
        assert_eq!(hex_compact(&[0x95, 0x01]), "95 01");
    }

    #[test]
    fn fuzz_parser_never_panics() {
        fuzz_try_parse_args(&["decode".into(), "--lenient".into()]);
        fuzz_try_parse_args(&["bogus".into()]);
    }
}
