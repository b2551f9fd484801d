//! Font classification and clean pass over a book's raw chapters
//!
//! The raw pass needs a layout detector and a document backend and is run
//! through the library. This tool works on its outputs.
//!
//! Usage:
//!   pdf_stitch report --config books/atlas.json
//!   pdf_stitch determine-fonts --config books/atlas.json --cutoff 0.1 --overwrite
//!   pdf_stitch clean --config books/atlas.json --out-dir scrape_out
//!
//! Outputs are read from and written to `<out-dir>/<stem>/`, where the stem
//! defaults to the config file's name.

use pdf_stitch::config::BookConfig;
use pdf_stitch::fonts::DEFAULT_CUTOFF;
use pdf_stitch::pipeline::{BookPaths, BookPipeline};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Report,
    DetermineFonts,
    Clean,
}

struct CliArgs {
    command: Command,
    config: PathBuf,
    out_dir: PathBuf,
    stem: Option<String>,
    cutoff: f64,
    overwrite: bool,
}

impl CliArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let command = match args.get(1).map(String::as_str) {
            Some("report") => Command::Report,
            Some("determine-fonts") => Command::DetermineFonts,
            Some("clean") => Command::Clean,
            Some(other) => return Err(format!("unknown command: {}", other)),
            None => return Err("missing command".to_string()),
        };

        let mut config = None;
        let mut out_dir = PathBuf::from("scrape_out");
        let mut stem = None;
        let mut cutoff = DEFAULT_CUTOFF;
        let mut overwrite = false;

        let mut i = 2;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    i += 1;
                    config = args.get(i).map(PathBuf::from);
                },
                "--out-dir" => {
                    i += 1;
                    if let Some(dir) = args.get(i) {
                        out_dir = PathBuf::from(dir);
                    }
                },
                "--stem" => {
                    i += 1;
                    stem = args.get(i).cloned();
                },
                "--cutoff" => {
                    i += 1;
                    cutoff = args
                        .get(i)
                        .and_then(|s| s.parse().ok())
                        .ok_or_else(|| "--cutoff needs a number".to_string())?;
                },
                "--overwrite" | "-y" => {
                    overwrite = true;
                },
                other => eprintln!("Ignoring argument {}", other),
            }
            i += 1;
        }

        Ok(Self {
            command,
            config: config.ok_or_else(|| "--config is required".to_string())?,
            out_dir,
            stem,
            cutoff,
            overwrite,
        })
    }
}

fn print_usage() {
    eprintln!("Usage: pdf_stitch <report|determine-fonts|clean> --config <book.json>");
    eprintln!("         [--out-dir <dir>] [--stem <name>] [--cutoff <0..1>] [--overwrite]");
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match CliArgs::from_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            return ExitCode::from(2);
        },
    };

    let config = match BookConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", args.config.display(), e);
            return ExitCode::FAILURE;
        },
    };

    let stem = args.stem.clone().unwrap_or_else(|| {
        args.config
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "book".to_string())
    });
    let mut pipeline = BookPipeline::new(config, BookPaths::new(&args.out_dir, &stem));

    let result = match args.command {
        Command::Report => {
            print!("{}", pipeline.tally_fonts().report());
            Ok(())
        },
        Command::DetermineFonts => pipeline
            .determine_fonts(args.cutoff, args.overwrite)
            .map(|fonts| match fonts {
                Some(fonts) => println!(
                    "Stored {} body, {} heading, {} noise fonts",
                    fonts.body.len(),
                    fonts.heading.len(),
                    fonts.noise.len()
                ),
                None => println!("Fonts already stored; pass --overwrite to replace them"),
            }),
        Command::Clean => pipeline.clean_raw().map(|done| {
            println!("Cleaned {}/{} chapters", done.len(), pipeline.chapters().len());
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        },
    }
}
