//! Command-line interface for tagl
//! Parse, validate, and format `.tagl` files.
//!
//! Usage:
//!   tagl check <path> [--format json]     - Report diagnostics
//!   tagl fmt <path> [--write] [--indent N] [--tabs]  - Format a file

use clap::{Arg, ArgAction, Command};
use tagl_analysis::interpolation::{self, LiteralTypeProvider};
use tagl_fmt::{format_file, FormatConfig};
use tagl_parser::tagl::ast::LineIndex;
use tagl_parser::tagl::parsing::parse_file;

fn main() {
    let matches = Command::new("tagl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for checking and formatting tagl files")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("check")
                .about("Parse and validate a file, reporting diagnostics")
                .arg(Arg::new("path").help("Path to the tagl file").required(true).index(1))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format: text or json")
                        .default_value("text"),
                ),
        )
        .subcommand(
            Command::new("fmt")
                .about("Format a file")
                .arg(Arg::new("path").help("Path to the tagl file").required(true).index(1))
                .arg(
                    Arg::new("write")
                        .long("write")
                        .short('w')
                        .help("Rewrite the file in place instead of printing")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .help("Spaces per indentation level")
                        .default_value("4"),
                )
                .arg(
                    Arg::new("tabs")
                        .long("tabs")
                        .help("Indent with tabs")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("check", sub)) => {
            let path = sub.get_one::<String>("path").expect("path is required");
            let format = sub.get_one::<String>("format").expect("format has a default");
            handle_check_command(path, format);
        }
        Some(("fmt", sub)) => {
            let path = sub.get_one::<String>("path").expect("path is required");
            let indent: usize = sub
                .get_one::<String>("indent")
                .expect("indent has a default")
                .parse()
                .unwrap_or_else(|_| {
                    eprintln!("--indent must be a number");
                    std::process::exit(2);
                });
            let config = FormatConfig {
                indent_width: indent,
                use_tabs: sub.get_flag("tabs"),
                normalize_numbers: true,
            };
            handle_fmt_command(path, sub.get_flag("write"), &config);
        }
        _ => unreachable!("subcommand required"),
    }
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("cannot read {path}: {e}");
        std::process::exit(2);
    })
}

fn handle_check_command(path: &str, format: &str) {
    let source = read_source(path);
    let (file, mut diags) = parse_file(&source);

    diags.extend(tagl_analysis::check_file(&file));
    let mut type_diags = tagl_parser::tagl::diagnostics::Diagnostics::new();
    interpolation::check(&file, &LiteralTypeProvider, &mut type_diags);
    diags.extend(type_diags);

    let had_errors = diags.has_errors();
    let sorted = diags.into_sorted();

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&sorted).unwrap_or_else(|e| {
                eprintln!("error serializing diagnostics: {e}");
                std::process::exit(2);
            });
            println!("{json}");
        }
        "text" => {
            let index = LineIndex::new(&source);
            for diag in &sorted {
                println!("{path}:{}", diag.display_with(&index));
            }
        }
        other => {
            eprintln!("unknown format '{other}'; expected text or json");
            std::process::exit(2);
        }
    }

    if had_errors {
        std::process::exit(1);
    }
}

fn handle_fmt_command(path: &str, write: bool, config: &FormatConfig) {
    let source = read_source(path);
    let (file, diags) = parse_file(&source);

    if diags.has_errors() {
        let index = LineIndex::new(&source);
        for diag in diags.into_sorted() {
            eprintln!("{path}:{}", diag.display_with(&index));
        }
        std::process::exit(1);
    }

    let formatted = format_file(&file, config);
    if write {
        std::fs::write(path, &formatted).unwrap_or_else(|e| {
            eprintln!("cannot write {path}: {e}");
            std::process::exit(2);
        });
    } else {
        print!("{formatted}");
    }
}
