// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use log::{info, LevelFilter};

use thompson_nfa::nfa::reader::NFAReader;

#[derive(clap::Args, Debug)]
struct VerbosityFlag {
    #[arg(short, long, global = true, help = "Set the verbosity to quiet")]
    quiet: bool,

    #[arg(short, long, global = true, help = "Set the verbosity to verbose")]
    verbose: bool,

    #[arg(short, long, global = true, help = "Set the verbosity to debug")]
    debug: bool,

    #[arg(short, long, global = true, help = "Set the verbosity to trace")]
    trace: bool,
}

impl VerbosityFlag {
    fn log_level_filter(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Off
        } else if self.trace {
            LevelFilter::Trace
        } else if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }
}

#[derive(clap::Parser, Debug)]
#[command(name = "nfa", about = "Tests words against a non-deterministic finite automaton")]
struct Cli {
    #[command(flatten)]
    verbosity: VerbosityFlag,

    #[arg(long, help = "Print the automaton before testing the words")]
    print: bool,

    #[arg(help = "File containing the automaton")]
    filename: String,

    #[arg(help = "Words to test, the empty word is written \"\"")]
    words: Vec<String>,
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .parse_default_env()
        .init();

    let nfa = NFAReader::new_from_file(&cli.filename)?;
    info!("Loaded {} with {} states", cli.filename, nfa.num_of_states());

    if cli.print {
        print!("{}", nfa);
    }

    for word in &cli.words {
        let verdict = if nfa.accepts(word) { "accepted" } else { "rejected" };
        println!("{:?}: {}", word, verdict);
    }

    Ok(ExitCode::SUCCESS)
}
