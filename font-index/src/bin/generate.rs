//! Build `fonts.json` from a database written by `scan`.
//!
//! Every stored name is decoded and mapped to the fonts that declare it.

use clap::Parser;
use font_index::DecodePolicy;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The database written by `scan`.
    db: std::path::PathBuf,

    /// Where to write the index
    #[arg(short, long, default_value = font_index::DEFAULT_OUTPUT)]
    output: std::path::PathBuf,

    /// Skip names that can't be decoded instead of failing
    #[arg(long)]
    skip_undecodable: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // usage errors aren't failures
            let _ = e.print();
            return;
        }
    };

    let policy = if args.skip_undecodable {
        DecodePolicy::Skip
    } else {
        DecodePolicy::Abort
    };
    if let Err(e) = font_index::generate(&args.db, &args.output, policy) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
