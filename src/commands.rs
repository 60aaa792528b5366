use crate::error::{ErrorKind, Result};
use comix_book::{Book, Format, Outcome, Tools, find_books};
use comix_config::Config;
use comix_container::walk;
use comix_metadata::Field;
use exn::ResultExt;
use std::path::Path;
use std::process::ExitCode;

pub fn info(tools: Tools, file: &Path) -> Result<ExitCode> {
    let failed = || ErrorKind::Book(file.to_path_buf());
    let book = Book::new(file).with_tools(tools).open().or_raise(failed)?;
    let files = walk::files(book.workspace()).or_raise(failed)?;
    println!("{}", file.display());
    println!("  format: {}", book.input_format());
    println!("  files:  {}", files.len());
    for (field, value) in book.metadata().fields() {
        println!("  {field}: {value}");
    }
    book.close().or_raise(failed)?;
    Ok(ExitCode::SUCCESS)
}

pub fn get(tools: Tools, file: &Path, field: Field) -> Result<ExitCode> {
    let failed = || ErrorKind::Book(file.to_path_buf());
    let book = Book::new(file).with_tools(tools).open().or_raise(failed)?;
    let value = book.metadata().get(field);
    book.close().or_raise(failed)?;
    match value {
        Some(value) => {
            println!("{value}");
            Ok(ExitCode::SUCCESS)
        },
        None => Ok(ExitCode::FAILURE),
    }
}

pub fn set(tools: Tools, file: &Path, assignments: &[(Field, String)]) -> Result<ExitCode> {
    let failed = || ErrorKind::Book(file.to_path_buf());
    let mut book = Book::new(file).with_tools(tools).open().or_raise(failed)?;
    for (field, value) in assignments {
        tracing::info!(%field, %value, "Setting metadata field");
        book.metadata_mut()
            .set(*field, value.as_str())
            .or_raise(|| ErrorKind::Metadata(file.to_path_buf()))?;
    }
    report(book.close().or_raise(failed)?);
    Ok(ExitCode::SUCCESS)
}

pub fn convert(config: &Config, file: &Path, to: Option<&str>) -> Result<ExitCode> {
    let target = match to {
        Some(to) => Some(to.parse::<Format>().or_raise(|| ErrorKind::Config)?),
        None => config.output_format().or_raise(|| ErrorKind::Config)?,
    };
    let Some(target) = target else {
        exn::bail!(ErrorKind::NoTarget);
    };
    let failed = || ErrorKind::Book(file.to_path_buf());
    let mut book = Book::new(file).with_tools(config.tools()).open().or_raise(failed)?;
    book.set_output_format(target);
    report(book.close().or_raise(failed)?);
    Ok(ExitCode::SUCCESS)
}

pub fn list(directory: &Path) -> Result<ExitCode> {
    for book in find_books(directory).or_raise(|| ErrorKind::List(directory.to_path_buf()))? {
        println!("{}", book.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn report(outcome: Outcome) {
    match outcome {
        Outcome::Unchanged => println!("unchanged"),
        Outcome::Invalid => eprintln!("warning: archive no longer matches its format, nothing written"),
        Outcome::Repacked { archive, backup } => {
            println!("wrote {} (previous version kept as {})", archive.display(), backup.display());
        },
    }
}
