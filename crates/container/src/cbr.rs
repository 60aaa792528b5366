//! RAR containers (`.cbr`), handled by external archivers.

use crate::construct::RAR_MAGIC;
use crate::error::{ErrorKind, Result};
use crate::{Tools, walk};
use exn::ResultExt;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Read;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use std::process::{Command, Stdio};

/// A program able to extract RAR archives.
enum Extractor {
    /// RARLAB's `unrar`.
    Unrar { path: PathBuf },
    /// libarchive's `bsdtar`, which reads (but cannot write) RAR.
    Bsdtar { path: PathBuf },
}
impl Extractor {
    fn discover(tools: &Tools) -> Result<Self> {
        if let Some(configured) = &tools.unrar {
            return Ok(Self::Unrar { path: configured_tool(configured)? });
        }
        if let Ok(path) = which::which("unrar") {
            return Ok(Self::Unrar { path });
        }
        tracing::info!("unrar not found in PATH; falling back to bsdtar");
        if let Ok(path) = which::which("bsdtar") {
            return Ok(Self::Bsdtar { path });
        }
        exn::bail!(ErrorKind::ToolNotFound("unrar".to_string()));
    }

    fn command(&self, archive: &Path, destination: &Path) -> Command {
        match self {
            Self::Unrar { path } => {
                // unrar treats the last argument as a directory only if it
                // ends with a separator.
                let mut destination = OsString::from(destination);
                destination.push(MAIN_SEPARATOR_STR);
                let mut command = Command::new(path);
                command.args(["x", "-o+", "-y", "-idq"]).arg(archive).arg(destination);
                command
            },
            Self::Bsdtar { path } => {
                let mut command = Command::new(path);
                command.arg("-x").arg("-f").arg(archive).arg("-C").arg(destination);
                command
            },
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Unrar { .. } => "unrar",
            Self::Bsdtar { .. } => "bsdtar",
        }
    }
}

pub(crate) fn unpack(tools: &Tools, archive: &Path, destination: &Path) -> Result<()> {
    let extractor = Extractor::discover(tools)?;
    run(extractor.command(archive, destination), extractor.name())
}

pub(crate) fn pack(tools: &Tools, archive: &Path, source: &Path) -> Result<()> {
    let rar = match &tools.rar {
        Some(configured) => configured_tool(configured)?,
        None => which::which("rar").or_raise(|| ErrorKind::ToolNotFound("rar".to_string()))?,
    };
    // The archiver runs from inside the source tree, so the output location
    // must not depend on the working directory.
    let archive = std::path::absolute(archive).or_raise(|| ErrorKind::Io)?;
    if archive.exists() {
        // `rar a` would otherwise add to the existing archive.
        fs::remove_file(&archive).or_raise(|| ErrorKind::Io)?;
    }
    let mut command = Command::new(rar);
    command.args(["a", "-y", "-idq", "--"]).arg(&archive).current_dir(source);
    for entry in walk::files(source)? {
        command.arg(entry.relative);
    }
    run(command, "rar")
}

pub(crate) fn test(archive: &Path) -> bool {
    let mut head = Vec::with_capacity(RAR_MAGIC.len());
    File::open(archive)
        .and_then(|file| file.take(RAR_MAGIC.len() as u64).read_to_end(&mut head))
        .is_ok_and(|_| head == RAR_MAGIC)
}

fn configured_tool(path: &Path) -> Result<PathBuf> {
    which::which(path).or_raise(|| ErrorKind::ToolNotFound(path.display().to_string()))
}

fn run(mut command: Command, name: &str) -> Result<()> {
    tracing::debug!(program = name, command = ?command, "Running external archiver");
    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .or_raise(|| ErrorKind::ToolNotFound(name.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!(program = name, stderr = %stderr.trim(), "External archiver reported failure");
        let status = match output.status.code() {
            Some(code) => format!("{name} exited with code {code}"),
            None => format!("{name} was terminated by a signal"),
        };
        exn::bail!(ErrorKind::ToolFailed(status));
    }
    Ok(())
}
