mod args;
mod dash;

use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

/// `--verbose` turns on debug output for this program only, not for the
/// spreadsheet readers.
const VERBOSE_FILTER: &str = "surveycmp=debug,survey_compare=debug";

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        let env = env_logger::Env::default().default_filter_or(VERBOSE_FILTER);
        env_logger::Builder::from_env(env).init();
    } else {
        env_logger::init();
    }

    info!("args: {:?}", args);

    let res = dash::run_dashboard(&args);

    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        for cause in ErrorCompat::iter_chain(&e).skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_is_scoped_to_the_application() {
        let directives: Vec<&str> = VERBOSE_FILTER.split(',').collect();
        assert_eq!(directives, vec!["surveycmp=debug", "survey_compare=debug"]);
        assert!(directives.iter().all(|d| d.contains('=')));
    }
}
