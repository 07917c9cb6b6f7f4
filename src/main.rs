mod args;
mod survey;

use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::survey::SourceOverrides;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    info!("args: {:?}", args);

    let overrides = SourceOverrides {
        input: args.input.clone(),
        input_type: args.input_type.clone(),
        worksheet_name: args.excel_worksheet_name.clone(),
    };

    let res = survey::run_analyses(&args.config, &overrides, args.out, args.reference);
    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&*e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
