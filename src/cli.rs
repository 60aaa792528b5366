use clap::{Parser, Subcommand};
use comix_metadata::Field;
use std::path::PathBuf;

/// Edit comic book archives (CBZ, CBR, PDF) in place.
///
/// Every command that changes a book keeps the previous file as
/// `<name>.<ext>.bak`.
#[derive(Debug, Parser)]
#[command(name = "comix", version, about)]
pub struct Cli {
    /// Configuration file, merged over the user configuration.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the format, number of files and metadata of a book.
    Info { file: PathBuf },
    /// Print one metadata field; exits with status 1 if it is not set.
    Get { file: PathBuf, field: Field },
    /// Set metadata fields and repack the book.
    Set {
        file: PathBuf,
        /// Assignments such as `Title="Asterix the Gaul"` or `story_arc=Gaul`.
        #[arg(required = true, value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(Field, String)>,
    },
    /// Convert a book to another format.
    Convert {
        file: PathBuf,
        /// Target format (cbz, cbr, pdf). Defaults to `output` from the
        /// configuration.
        #[arg(long)]
        to: Option<String>,
    },
    /// List comic books under a directory, recursively.
    List {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
}

fn parse_assignment(input: &str) -> Result<(Field, String), String> {
    let (field, value) = input.split_once('=').ok_or_else(|| format!("expected FIELD=VALUE, got {input:?}"))?;
    let field = field.parse::<Field>().map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}
