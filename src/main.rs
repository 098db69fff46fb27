// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/main.rs - Command-line board converter.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use brdconv::error::Result;
use brdconv::format::{self, BoardFormat};

fn formats_help() -> String {
    let mut help = String::from("Formats (r = import, w = export):\n");
    for format in BoardFormat::ALL {
        help += &format!(
            "  {:<10}{}{}  {}\n",
            format.tag(),
            if format.can_import() { 'r' } else { '-' },
            if format.can_export() { 'w' } else { '-' },
            format.description()
        );
    }
    help
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, after_help = formats_help())]
struct Args {
    /// Log more; repeat for more detail. RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Format of the input file.
    #[arg(allow_hyphen_values = true)]
    input_format: String,

    /// The file to read.
    input_path: PathBuf,

    /// Format to write.
    #[arg(allow_hyphen_values = true)]
    output_format: String,

    /// The file to write. Left untouched if the conversion fails.
    output_path: PathBuf,
}

/// Older drivers took tags as options, like `-tebo`.
fn format_from_arg(arg: &str) -> Result<BoardFormat> {
    BoardFormat::from_tag(arg.strip_prefix('-').unwrap_or(arg))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let src = format_from_arg(&args.input_format)?;
    let dst = format_from_arg(&args.output_format)?;

    let input = fs::read(&args.input_path)?;
    info!("read {} bytes from {:?}", input.len(), args.input_path);
    let output = format::convert(src, &input, dst)?;
    fs::write(&args.output_path, &output)?;
    info!("wrote {} bytes to {:?}", output.len(), args.output_path);
    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(error) => {
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!(
                "Error converting {:?} from {} to {}: {}",
                args.input_path, args.input_format, args.output_format, error
            );
            ExitCode::FAILURE
        }
    }
}
