//! Output files under the configured directory.

use std::io::BufWriter;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, File};

use super::error::SinkError;
use super::model::OutputFormat;
use super::sink::{JsonArraySink, JsonlSink, RecordSink};
use crate::github::RepositoryId;

/// Path of the output file for `repository`:
/// `{output_dir}/{owner}_{name}_comments.{jsonl|json}`.
#[must_use]
pub fn output_path(
    output_dir: &Utf8Path,
    repository: &RepositoryId,
    format: OutputFormat,
) -> Utf8PathBuf {
    output_dir.join(format!(
        "{}_comments.{}",
        repository.file_stem(),
        format.extension()
    ))
}

/// Opens a sink writing `repository`'s records in `format`.
///
/// The directory is created when missing and an existing file is
/// truncated, so a rerun replaces the previous output.
///
/// # Errors
///
/// Returns [`SinkError::Open`] when the directory or file cannot be
/// created.
pub fn open_sink(
    output_dir: &Utf8Path,
    repository: &RepositoryId,
    format: OutputFormat,
) -> Result<Box<dyn RecordSink>, SinkError> {
    let path = output_path(output_dir, repository, format);
    let file = create_file(output_dir, &path)?;
    tracing::debug!(repository = %repository, path = %path, "opened output file");
    Ok(match format {
        OutputFormat::Jsonl => Box::new(JsonlSink::new(file)),
        OutputFormat::Json => Box::new(JsonArraySink::new(BufWriter::new(file))),
    })
}

fn open_error(path: &Utf8Path, error: &std::io::Error) -> SinkError {
    SinkError::Open {
        path: path.to_string(),
        message: error.to_string(),
    }
}

/// Creates `path` inside `output_dir`, creating the directory first.
fn create_file(output_dir: &Utf8Path, path: &Utf8Path) -> Result<File, SinkError> {
    let file_name = path.file_name().ok_or_else(|| SinkError::Open {
        path: path.to_string(),
        message: "no file name".to_owned(),
    })?;

    let (anchor, relative) = if output_dir.is_absolute() {
        let relative = output_dir.strip_prefix("/").map_err(|_| SinkError::Open {
            path: output_dir.to_string(),
            message: "cannot normalise output directory".to_owned(),
        })?;
        (Utf8Path::new("/"), relative)
    } else {
        (Utf8Path::new("."), output_dir)
    };
    let root = Dir::open_ambient_dir(anchor, ambient_authority())
        .map_err(|error| open_error(anchor, &error))?;

    let target = if relative.as_str().is_empty() || relative == Utf8Path::new(".") {
        root
    } else {
        root.create_dir_all(relative)
            .map_err(|error| open_error(output_dir, &error))?;
        root.open_dir(relative)
            .map_err(|error| open_error(output_dir, &error))?
    };

    target
        .create(file_name)
        .map_err(|error| open_error(path, &error))
}
