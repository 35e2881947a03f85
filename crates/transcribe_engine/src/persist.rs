use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_warn;
use tempfile::{Builder, NamedTempFile, TempPath};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("{path:?} is staged twice in one export")]
    DuplicateTarget { path: PathBuf },
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PersistError {
    fn write(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::OutputDir(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))
        }
        Err(err) => Err(PersistError::OutputDir(err.to_string())),
    }
}

/// Files that belong together, such as a transcript and its manifest.
///
/// Content is staged into temp files in the target directory. Nothing under
/// the final names changes until [`OutputBatch::commit`], which either lands
/// every file or puts back what was there before.
pub struct OutputBatch {
    dir: PathBuf,
    staged: Vec<StagedFile>,
}

struct StagedFile {
    target: PathBuf,
    temp: NamedTempFile,
}

struct LandedFile {
    target: PathBuf,
    // Previous content moved aside; dropped (and deleted) once the batch lands.
    previous: Option<TempPath>,
}

impl OutputBatch {
    pub fn new(dir: &Path) -> Result<Self, PersistError> {
        ensure_output_dir(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            staged: Vec::new(),
        })
    }

    /// Writes `content` to a temp file and returns the path it will land at.
    pub fn stage(&mut self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        let target = self.dir.join(filename);
        if self.staged.iter().any(|file| file.target == target) {
            return Err(PersistError::DuplicateTarget { path: target });
        }

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(PersistError::write(&target))?;
        temp.write_all(content.as_bytes())
            .map_err(PersistError::write(&target))?;
        temp.as_file_mut()
            .sync_all()
            .map_err(PersistError::write(&target))?;

        self.staged.push(StagedFile {
            target: target.clone(),
            temp,
        });
        Ok(target)
    }

    pub fn commit(self) -> Result<Vec<PathBuf>, PersistError> {
        let Self { dir, staged } = self;
        let mut landed = Vec::with_capacity(staged.len());
        for file in staged {
            match land(&dir, file) {
                Ok(file) => landed.push(file),
                Err(err) => {
                    roll_back(landed);
                    return Err(err);
                }
            }
        }
        Ok(landed.into_iter().map(|file| file.target).collect())
    }
}

fn land(dir: &Path, file: StagedFile) -> Result<LandedFile, PersistError> {
    let StagedFile { target, temp } = file;
    let previous = if fs::symlink_metadata(&target).is_ok() {
        let backup = Builder::new()
            .prefix(".previous-")
            .tempfile_in(dir)
            .map_err(PersistError::write(&target))?
            .into_temp_path();
        fs::rename(&target, &backup).map_err(PersistError::write(&target))?;
        Some(backup)
    } else {
        None
    };

    if let Err(err) = temp.persist(&target) {
        if let Some(backup) = &previous {
            restore(backup, &target);
        }
        return Err(PersistError::write(&target)(err.error));
    }
    Ok(LandedFile { target, previous })
}

fn roll_back(landed: Vec<LandedFile>) {
    for file in landed.into_iter().rev() {
        match &file.previous {
            Some(backup) => restore(backup, &file.target),
            None => {
                if let Err(err) = fs::remove_file(&file.target) {
                    engine_warn!("Could not remove partial output {:?}: {}", file.target, err);
                }
            }
        }
    }
}

fn restore(backup: &Path, target: &Path) {
    if let Err(err) = fs::rename(backup, target) {
        engine_warn!("Could not restore previous {:?}: {}", target, err);
    }
}
