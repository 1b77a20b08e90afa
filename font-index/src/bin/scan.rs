//! Record the names of every font under a directory.
//!
//! Takes a font directory and the path of a new database, and stores the raw
//! full and PostScript names of each font for `generate` to decode.

use clap::Parser;
use font_index::Store;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The directory to scan.
    font_dir: std::path::PathBuf,

    /// The database to create. It must not already contain the tables.
    db: std::path::PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return;
        }
    };

    let result = Store::create(&args.db)
        .and_then(|mut store| font_index::scan_directory(&args.font_dir, &mut store));
    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
