//! Writes `fastc_runtime.h` and `fastc_layout_conformance.c` into a directory.
//!
//! ```text
//! fc-abi-gen <out_dir> [--target <name>]
//! ```
//!
//! `<name>` is `host` (the default) or one of the `TargetAbi` presets; it only
//! affects the conformance program, since the header is target-independent.

mod conformance;
mod header;

use fc_layout::{LayoutError, TargetAbi};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::{env, fs, io};

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("{0} is not described as a struct")]
    NotAStruct(&'static str),
    #[error("no C declarator for field `{field}` of {ty}")]
    UnknownField {
        ty: &'static str,
        field: &'static str,
    },
    #[error("layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("formatting output")]
    Fmt(#[from] std::fmt::Error),
    #[error("unknown target `{0}`")]
    UnknownTarget(String),
    #[error("usage: fc-abi-gen <out_dir> [--target <name>]")]
    Usage,
    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

fn target_by_name(name: &str) -> Result<TargetAbi, GenError> {
    if name == "host" {
        return Ok(TargetAbi::host());
    }
    TargetAbi::PRESETS
        .into_iter()
        .find(|t| t.name == name)
        .ok_or_else(|| GenError::UnknownTarget(name.to_string()))
}

fn write_file(dir: &Path, name: &str, contents: &str) -> Result<PathBuf, GenError> {
    let path = dir.join(name);
    fs::write(&path, contents).map_err(|source| GenError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn run() -> Result<(), GenError> {
    let mut out_dir = None;
    let mut target = TargetAbi::host();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--target" {
            target = target_by_name(&args.next().ok_or(GenError::Usage)?)?;
        } else if out_dir.is_none() && !arg.starts_with('-') {
            out_dir = Some(PathBuf::from(arg));
        } else {
            return Err(GenError::Usage);
        }
    }
    let out_dir = out_dir.ok_or(GenError::Usage)?;

    fs::create_dir_all(&out_dir).map_err(|source| GenError::Io {
        path: out_dir.clone(),
        source,
    })?;

    let header = write_file(&out_dir, header::FILE_NAME, &header::render()?)?;
    let program = write_file(
        &out_dir,
        conformance::FILE_NAME,
        &conformance::render(&target)?,
    )?;

    eprintln!("wrote {}", header.display());
    eprintln!("wrote {} (target {})", program.display(), target.name);
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fc-abi-gen: {e}");
            ExitCode::FAILURE
        }
    }
}
