use std::{
    env,
    fs::{read_to_string, write},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use elz::{
    compiler::compiler::{compile, CompileOptions},
    display_error, init_tracing,
};
use inkwell::context::Context;
use tracing::info;

const USAGE: &str = "usage: elz <file> [-o <out.ll>] [--no-verify] [--no-finalize]";

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    verify: bool,
    finalize: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut input = None;
    let mut output = None;
    let mut verify = true;
    let mut finalize = true;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" => match iter.next() {
                Some(path) => output = Some(PathBuf::from(path)),
                None => return Err(String::from("missing path after -o")),
            },
            "--no-verify" => verify = false,
            "--no-finalize" => finalize = false,
            flag if flag.starts_with('-') => return Err(format!("unknown flag: {}", flag)),
            path if input.is_none() => input = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument: {}", extra)),
        }
    }

    let input = input.ok_or_else(|| String::from("missing input file"))?;
    Ok(Args {
        input,
        output,
        verify,
        finalize,
    })
}

fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("main"))
}

fn main() -> ExitCode {
    init_tracing();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };

    let file_name = args.input.to_string_lossy().into_owned();
    let source = match read_to_string(&args.input) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("cannot read {}: {}", file_name, error);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let context = Context::create();
    let options = CompileOptions {
        module_name: module_name(&args.input),
        finalize: args.finalize,
        verify: args.verify,
    };
    let (reporter, result) = compile(&source, &file_name, &options, &context);

    for diagnostic in reporter.all() {
        eprintln!("{}: {}", file_name, diagnostic);
    }

    let output = match result {
        Ok(output) => output,
        Err(error) => {
            display_error(&error, &source, &file_name);
            return ExitCode::FAILURE;
        }
    };
    info!(elapsed = ?start.elapsed(), "generated module");

    if !reporter.is_empty() {
        return ExitCode::FAILURE;
    }

    let out_path = args
        .output
        .unwrap_or_else(|| args.input.with_extension("ll"));
    if let Err(error) = write(&out_path, output.ir()) {
        eprintln!("cannot write {}: {}", out_path.display(), error);
        return ExitCode::FAILURE;
    }

    if !output.exports.is_empty() {
        info!(exports = ?output.exports, "exported symbols");
    }

    ExitCode::SUCCESS
}
