//
// main.rs
// The MDSE REST Compiler
//

//! `mdsec` is the command-line driver for the MDSE REST Compiler.
//!
//! ## Basic usage:
//!
//! `mdsec -o service -m models tienda.api`
//!
//! The only mandatory argument is the source file. By default, it is a
//! requirements model, written in the `api` grammar. The driver lowers
//! it to a platform-independent model (written to `pim.api`), then to a
//! platform-specific model (written to `psm_fastapi.api`), and finally
//! generates the service itself (`schemas.py` and `main.py`).
//!
//! There are more command-line parameters, for greater flexibility:
//!
//! * The output directory of the service is the current directory, `.`,
//!   by default. This can be changed via the `-o` or `--outdir` option.
//! * The intermediate models are written next to the service, unless
//!   the `-m` or `--modeldir` option names another directory.
//! * A run may start from an intermediate model that has been edited by
//!   hand. The `-f` or `--from` option selects the grammar of the source:
//!   * `req` for requirements (the default),
//!   * `pim` for a platform-independent model,
//!   * `psm` for a platform-specific model.
//! * `-N` or `--numbers` selects how `Number` fields are lowered:
//!   * `byname`: well-known whole-number fields (`id`, `stock`, `edad`,
//!     `numero`) become `int`, everything else `float` (the default),
//!   * `float`: every `Number` field becomes `float`.
//! * `-k` or `--key` names a business-key field. A resource having that
//!   field is looked up by its value rather than by position. It may be
//!   repeated; the first key a resource has wins. Defaults to `numero`.
//! * `-a` or `--api-version` sets the version the service reports
//!   about itself, `1.0.0` by default.
//! * `-v` raises the logging level; it may be repeated. The `MDSE_LOG`
//!   environment variable, if set, takes precedence, e.g.
//!   `MDSE_LOG=mdse=trace`.
//!
//! ## Exit Status
//!
//! The command-line compiler exits with status `0` if the compilation
//! succeeds. If the compilation fails, it exits with a non-zero status,
//! after having removed all files written during the run.

#![crate_name="mdsec"]
#![crate_type="bin"]
#![deny(missing_debug_implementations, missing_copy_implementations,
        trivial_casts, trivial_numeric_casts,
        unsafe_code,
        unstable_features,
        unused_import_braces, unused_qualifications, missing_docs)]

#[macro_use]
extern crate clap;

use std::collections::HashMap;
use std::fmt::Display;
use std::fs::{ self, File };
use std::path::{ Path, PathBuf };
use std::time::Instant;
use std::rc::Rc;
use std::cell::RefCell;
use std::io::stderr;
use std::io::prelude::*;
use clap::Arg;
use tracing::debug;
use tracing_subscriber::{ EnvFilter, Layer };
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use mdse::util::{ Diagnostic, DiagnosticKind, PACKAGE_INFO };
use mdse::lexer::*;
use mdse::parser::*;
use mdse::pim::PimModel;
use mdse::psm::PsmModel;
use mdse::pimgen::*;
use mdse::psmgen::*;
use mdse::rules::NumberLowering;
use mdse::codegen::*;
use mdse::error::*;


// Reporting elapsed time for each stage of the compiler pipeline
macro_rules! stopwatch {
    ($msg: expr, $code: expr) => ({
        eprint!("    {:.<40}", $msg);
        stderr().flush().ok();
        let t0 = Instant::now();
        let val = $code;
        let dt = t0.elapsed();
        let message = format!("{:6.1} ms", dt.as_secs_f64() * 1e3);
        eprintln!("{}", Diagnostic::new(message, DiagnosticKind::Info));
        val
    })
}

/// File name of the generated platform-independent model.
const PIM_FILE: &str = "pim.api";

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV_VAR: &str = "MDSE_LOG";

/// Hands out files, and remembers every one of them so that they can
/// be removed if compilation fails half-way.
#[derive(Default)]
struct FileWriterProvider {
    files: HashMap<PathBuf, Rc<RefCell<dyn Write>>>,
}

impl FileWriterProvider {
    fn writer_at(&mut self, dir: &Path, name: &str) -> Result<Rc<RefCell<dyn Write>>> {
        let path = dir.join(name);

        if let Some(rc) = self.files.get(&path) {
            return Ok(rc.clone())
        }

        fs::create_dir_all(dir)?;

        let file = File::create(&path)?;
        let rc: Rc<RefCell<dyn Write>> = Rc::new(RefCell::new(file));

        debug!(path = %path.display(), "created output file");
        self.files.insert(path, rc.clone());

        Ok(rc)
    }

    fn remove_files(&self) {
        for path in self.files.keys() {
            fs::remove_file(path).unwrap_or_else(
                |e| eprintln!("    Could not remove {}: {}", path.to_string_lossy(), e)
            )
        }
    }
}

//
// Parsing Command-Line Arguments
//

type ArgResult<T> = std::result::Result<T, String>;

/// The grammar of the source file, i.e. the stage a run starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Requirements,
    Pim,
    Psm,
}

#[derive(Debug)]
struct CmdArgs {
    lowering_params: LoweringParams,
    codegen_params: CodegenParams,
    start: Stage,
    output_directory: PathBuf,
    model_directory: PathBuf,
    source: String,
    verbosity: u64,
}

impl CmdArgs {
    fn new() -> ArgResult<Self> {
        let args = clap_app!(mdsec =>
            (name:    "mdsec")
            (version: PACKAGE_INFO.version)
            (author:  PACKAGE_INFO.authors)
            (about:   PACKAGE_INFO.description)
            (@arg outdir:      -o --outdir          +takes_value "Output directory of the generated service")
            (@arg modeldir:    -m --modeldir        +takes_value "Output directory of intermediate models")
            (@arg from:        -f --from            +takes_value "Grammar of the source: req, pim or psm")
            (@arg numbers:     -N --numbers         +takes_value "Lowering of numbers: byname or float")
            (@arg api_version: -a --("api-version") +takes_value "Version reported by the generated service")
            (@arg verbose:     -v --verbose         +multiple    "Increase logging verbosity")
            (@arg source:      +required                         "Requirements, PIM or PSM source file")
        ).arg(
            Arg::with_name("key")
                .short("k")
                .long("key")
                .help("Business key field; may be repeated")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
        ).get_matches();

        let mut lowering_params = LoweringParams {
            number_lowering: Self::number_lowering(args.value_of("numbers"))?,
            ..LoweringParams::default()
        };

        if let Some(keys) = args.values_of("key") {
            lowering_params.business_keys = keys.map(str::to_owned).collect();
        }

        let mut codegen_params = CodegenParams::default();

        if let Some(version) = args.value_of("api_version") {
            codegen_params.api_version = version.to_owned();
        }

        let output_directory = PathBuf::from(args.value_of("outdir").unwrap_or("."));
        let model_directory = args.value_of("modeldir").map_or_else(
            || output_directory.clone(),
            PathBuf::from,
        );

        let args = CmdArgs {
            lowering_params,
            codegen_params,
            start:            Self::stage(args.value_of("from"))?,
            output_directory,
            model_directory,
            source:           args.value_of("source").unwrap_or_default().to_owned(),
            verbosity:        args.occurrences_of("verbose"),
        };

        Ok(args)
    }

    fn stage(grammar: Option<&str>) -> ArgResult<Stage> {
        Ok(match grammar {
            None | Some("req") => Stage::Requirements,
            Some("pim")        => Stage::Pim,
            Some("psm")        => Stage::Psm,
            Some(value)        => Self::arg_error("source grammar", value)?,
        })
    }

    fn number_lowering(policy: Option<&str>) -> ArgResult<NumberLowering> {
        Ok(match policy {
            None | Some("byname") => NumberLowering::ByFieldName,
            Some("float")         => NumberLowering::FloatOnly,
            Some(value)           => Self::arg_error("number lowering", value)?,
        })
    }

    fn arg_error<T>(name: &str, value: &str) -> ArgResult<T> {
        Err(format!("Invalid {}: '{}'", name, Diagnostic::new(value, DiagnosticKind::Error)))
    }
}

//
// Logging
//

/// Skipped operations are reported by `report_skipped()` already, so
/// warnings are only logged from `-v` on.
fn init_tracing(verbosity: u64) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(match verbosity {
        0 => "error",
        1 => "mdse=debug,mdsec=debug",
        _ => "trace",
    }));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(stderr)
        .with_target(true)
        .with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        eprintln!("    Warning: tracing subscriber already initialized");
    }
}

//
// I/O
//

fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut buf = String::new();
    let mut file = File::open(path)?;
    file.read_to_string(&mut buf)?;
    Ok(buf)
}

/// Writes an intermediate model, then parses the written text back, so
/// that a model that could not be resumed from is never left behind.
fn write_model<T, F>(
    files: &mut FileWriterProvider,
    dir: &Path,
    name: &str,
    model: &T,
    reparse: F,
) -> Result<()>
    where T: Display + PartialEq,
          F: FnOnce(&str) -> Result<T> {

    let text = model.to_string();
    let rc = files.writer_at(dir, name)?;
    let mut wr = rc.borrow_mut();

    wr.write_all(text.as_bytes())?;
    wr.flush()?;

    let round_trip_error = |message: String| Error::Unreachable {
        message: format!("{} does not round-trip: {}", name, message),
        file: file!(),
        line: line!() as usize,
    };

    match reparse(&text) {
        Ok(ref parsed) if parsed == model => Ok(()),
        Ok(_) => Err(round_trip_error("parsed model differs".to_owned())),
        Err(error) => Err(round_trip_error(error.to_string())),
    }
}

fn report_skipped(pim_gen: &PimGen) {
    for outcome in pim_gen.skipped() {
        if let OperationOutcome::Skipped { ref resource, ref operation, ref reason } = *outcome {
            eprintln!(
                "    {} {}.{}: {}",
                Diagnostic::new("Skipped", DiagnosticKind::Warning),
                resource,
                operation,
                reason,
            );
        }
    }
}

//
// Entry point
//

fn lower_requirements(args: &CmdArgs, files: &mut FileWriterProvider, tokens: &[Token]) -> Result<PimModel> {
    let req = stopwatch!("Parsing requirements", {
        parse_requirements(tokens)?
    });

    let pim_gen = stopwatch!("Generating PIM", {
        generate_pim(&req)
    });

    report_skipped(&pim_gen);

    stopwatch!("Writing PIM", {
        write_model(files, &args.model_directory, PIM_FILE, &pim_gen.pim, pim_from_str)?
    });

    Ok(pim_gen.pim)
}

fn lower_pim(args: &CmdArgs, files: &mut FileWriterProvider, pim: &PimModel) -> Result<PsmModel> {
    let psm = stopwatch!("Generating PSM", {
        generate_psm(pim, &args.lowering_params)?
    });

    stopwatch!("Writing PSM", {
        let name = format!("psm_{}.api", psm.platform);
        write_model(files, &args.model_directory, &name, &psm, psm_from_str)?
    });

    Ok(psm)
}

fn mdsec_main(args: &CmdArgs, files: &mut FileWriterProvider) -> Result<()> {
    let sources = stopwatch!("Reading source", {
        [read_file(&args.source)?]
    });

    let tokens = stopwatch!("Lexing", {
        lex_significant(&sources)?
    });

    let psm = match args.start {
        Stage::Requirements => {
            let pim = lower_requirements(args, files, &tokens)?;
            lower_pim(args, files, &pim)?
        },
        Stage::Pim => {
            let pim = stopwatch!("Parsing PIM", {
                parse_pim(&tokens)?
            });
            lower_pim(args, files, &pim)?
        },
        Stage::Psm => stopwatch!("Parsing PSM", {
            parse_psm(&tokens)?
        }),
    };

    stopwatch!("Generating service", {
        let outdir = &args.output_directory;
        generate_code(&psm, &args.codegen_params, &mut |name: &str| files.writer_at(outdir, name))?
    });

    Ok(())
}

fn main() {
    eprintln!();
    eprintln!("    The MDSE REST Compiler, version {}", PACKAGE_INFO.version);
    eprintln!("    Copyright (C) 2026, {}", PACKAGE_INFO.authors);
    eprintln!();

    let args = CmdArgs::new().unwrap_or_else(|error| {
        eprint!("    {}\n\n", error);
        std::process::exit(1);
    });

    init_tracing(args.verbosity);

    let mut files = FileWriterProvider::default();
    let result = mdsec_main(&args, &mut files);

    // Handle errors by printing them, removing partially-written files, then bailing out
    result.unwrap_or_else(|error| {
        error.pretty_print(&mut stderr(), &[&args.source]).unwrap_or_else(
            |e| eprintln!("    Could not report error: {}", e)
        );
        files.remove_files();
        std::process::exit(1);
    });

    eprintln!();
    eprintln!("    {}", Diagnostic::new("Compilation Successful", DiagnosticKind::Success));
    eprintln!();
}
