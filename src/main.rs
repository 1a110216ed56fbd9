//! # maskgen
//!
//! maskgen generates masked-LM pretraining instances from tokenized
//! corpora.
//!
//! ```sh
//! maskgen 0.1.0
//! masked-LM pretraining data tool.
//!
//! USAGE:
//!     maskgen <SUBCOMMAND>
//!
//! SUBCOMMANDS:
//!     help        Prints this message or the help of the given subcommand(s)
//!     pipeline    Generate pretraining instances from a tokenized corpus
//! ```
use structopt::StructOpt;

#[macro_use]
extern crate log;

use maskgen::cli;
use maskgen::config::PretrainConfig;
use maskgen::error::Error;
use maskgen::pipelines::{Pipeline, Pretrain};

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Maskgen::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Maskgen::Pipeline(p) => {
            let config = PretrainConfig::from(&p);
            let pipeline = Pretrain::new(p.src, p.dst, p.sequence_column, config);
            pipeline.run()?;
        }
    };
    Ok(())
}
