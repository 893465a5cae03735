#![cfg(not(tarpaulin_include))]

use assembly_tracker::downloader::{ExportFormat, write_export};
use assembly_tracker::process_upload;
use assembly_tracker::view::render_text_board;
use chrono::Local;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn usage(program: &str) {
    eprintln!("Usage: {} <file.xlsx|file.csv> [--export <path>] [--csv]", program);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("assembly-cli");

    let mut input: Option<PathBuf> = None;
    let mut export_target: Option<PathBuf> = None;
    let mut format = ExportFormat::Xlsx;

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--export" => match rest.next() {
                Some(path) => export_target = Some(PathBuf::from(path)),
                None => {
                    usage(program);
                    return Err("--export needs a path".into());
                }
            },
            "--csv" => format = ExportFormat::Csv,
            "-h" | "--help" => {
                usage(program);
                return Ok(());
            }
            other if input.is_none() => input = Some(PathBuf::from(other)),
            other => {
                usage(program);
                return Err(format!("unexpected argument: {}", other).into());
            }
        }
    }

    let Some(input) = input else {
        usage(program);
        return Err("no input file given".into());
    };

    let bytes = fs::read(&input)?;
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let processed = process_upload(file_name, &bytes)?;

    let report = processed.report;
    println!(
        "{} row(s) read, {} kept, {} without a valid time, {} outside the line\n",
        report.rows_read, report.kept, report.dropped_bad_timestamp, report.dropped_unknown_station
    );
    print!("{}", render_text_board(&processed.dataset.station_views()));

    if let Some(target) = export_target {
        let written = write_export(
            &processed.dataset,
            format,
            Path::new(&target),
            Local::now().naive_local(),
        )?;
        println!("Sequence exported to {}", written.display());
    }

    Ok(())
}
