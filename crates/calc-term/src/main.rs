#![forbid(unsafe_code)]

//! `calc` binary entry point.

use calc_engine::DisplayModel;
use calc_term::{cli, logging, render, script, terminal};

fn main() {
    let opts = cli::Opts::parse();

    if let Err(e) = logging::init(opts.log_file.as_deref(), &opts.log_filter) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let config = opts.engine_config();
    let format = opts.number_format();

    if let Some(keys) = &opts.script {
        match script::run(keys, config) {
            Ok(session) => {
                let view = DisplayModel::project(session.snapshot(), session.clear_label(), &format);
                for line in render::panel(&view) {
                    println!("{line}");
                }
            }
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = terminal::run(config, format) {
        eprintln!("Runtime error: {e}");
        std::process::exit(1);
    }
}
