//! Saving and loading the index files
//!
//! Each file is handled on its own: a failure on one never stops the other
//! two. Writes go to a temporary sibling that is renamed into place, so an
//! interrupted save leaves the previous file intact.

use super::schema::{decoder, IndexFile};
use super::{Indexer, PageRecord};
use crate::hash::{ContentHash, WordHash};
use bincode::Options;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while saving or loading an index file
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("{file}: format version {found}, expected {expected}")]
    VersionMismatch {
        file: IndexFile,
        found: u64,
        expected: u64,
    },

    #[error("{file}: read {read} of {declared} records")]
    Truncated {
        file: IndexFile,
        read: u64,
        declared: u64,
    },

    #[error("No database directory configured")]
    NoDatabaseDirectory,
}

/// Outcome of a save or load, per file
#[derive(Debug, Default)]
pub struct PersistReport {
    /// Files fully written or read
    pub completed: Vec<IndexFile>,

    /// Files that failed, with the reason
    ///
    /// A truncated page metadata file is listed here even though the
    /// records read before the damage were kept.
    pub failures: Vec<(IndexFile, IndexError)>,
}

impl PersistReport {
    /// Returns true if every file succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, file: IndexFile, operation: &str, result: Result<(), IndexError>) {
        match result {
            Ok(()) => self.completed.push(file),
            Err(e) => {
                tracing::warn!("Failed to {} {}: {}", operation, file, e);
                self.failures.push((file, e));
            }
        }
    }
}

impl Indexer {
    /// Writes all three index files to the database directory
    ///
    /// The directory is created if needed. Never panics; per-file failures
    /// are logged and returned in the report.
    pub fn save(&self) -> PersistReport {
        let mut report = PersistReport::default();
        let Some(directory) = self.database_directory() else {
            for file in IndexFile::ALL {
                report.record(file, "save", Err(IndexError::NoDatabaseDirectory));
            }
            return report;
        };

        let result = write_file(directory, IndexFile::Dictionary, |writer| {
            bincode::serialize_into(writer, &self.dictionary)?;
            Ok(())
        });
        report.record(IndexFile::Dictionary, "save", result);

        let result = write_file(directory, IndexFile::TableOfContents, |writer| {
            bincode::serialize_into(writer, &self.table_of_contents)?;
            Ok(())
        });
        report.record(IndexFile::TableOfContents, "save", result);

        let result = write_file(directory, IndexFile::PageMetadata, |writer| {
            bincode::serialize_into(&mut *writer, &(self.pages.len() as u64))?;
            for page in &self.pages {
                bincode::serialize_into(&mut *writer, page)?;
            }
            Ok(())
        });
        report.record(IndexFile::PageMetadata, "save", result);

        tracing::info!(
            "Saved index to {} ({} words, {} pages, {} failures)",
            directory.display(),
            self.word_count(),
            self.page_count(),
            report.failures.len()
        );
        report
    }

    /// Reads all three index files from the database directory
    ///
    /// Each file is decoded completely before it replaces the matching
    /// in-memory table; a file that fails leaves its table unchanged. A page
    /// metadata file that ends early keeps the records read before the
    /// damage.
    pub fn load(&mut self) -> PersistReport {
        let mut report = PersistReport::default();
        let Some(directory) = self.database_directory.clone() else {
            for file in IndexFile::ALL {
                report.record(file, "load", Err(IndexError::NoDatabaseDirectory));
            }
            return report;
        };

        let dictionary = read_file(&directory, IndexFile::Dictionary, |reader, limit| {
            let dictionary: HashMap<WordHash, String> = decoder(limit).deserialize_from(reader)?;
            Ok(dictionary)
        });
        let result = dictionary.map(|dictionary| self.dictionary = dictionary);
        report.record(IndexFile::Dictionary, "load", result);

        let table_of_contents = read_file(&directory, IndexFile::TableOfContents, |reader, limit| {
            let toc: HashMap<WordHash, HashSet<ContentHash>> =
                decoder(limit).deserialize_from(reader)?;
            Ok(toc)
        });
        let result = table_of_contents.map(|toc| self.table_of_contents = toc);
        report.record(IndexFile::TableOfContents, "load", result);

        let pages = read_file(&directory, IndexFile::PageMetadata, read_pages);
        let result = pages.and_then(|(pages, declared)| {
            let read = pages.len() as u64;
            self.replace_pages(pages);
            if read < declared {
                tracing::warn!(
                    "Page metadata is corrupted: read {} of {} records",
                    read,
                    declared
                );
                return Err(IndexError::Truncated {
                    file: IndexFile::PageMetadata,
                    read,
                    declared,
                });
            }
            Ok(())
        });
        report.record(IndexFile::PageMetadata, "load", result);

        let dropped = self.prune_postings();
        if dropped > 0 {
            tracing::warn!("Dropped {} postings for pages that were not loaded", dropped);
        }

        tracing::info!(
            "Loaded index from {} ({} words, {} pages)",
            directory.display(),
            self.word_count(),
            self.page_count()
        );
        report
    }
}

/// Writes one versioned file through a temporary sibling
fn write_file<F>(directory: &Path, file: IndexFile, write_body: F) -> Result<(), IndexError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), IndexError>,
{
    fs::create_dir_all(directory)?;
    let path = directory.join(file.file_name());
    let temp_path = directory.join(format!("{}.tmp", file.file_name()));

    let result = write_temp(&temp_path, file, write_body)
        .and_then(|()| fs::rename(&temp_path, &path).map_err(IndexError::from));
    if let Err(e) = result {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            tracing::debug!("Could not remove {}: {}", temp_path.display(), cleanup);
        }
        return Err(e);
    }

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

fn write_temp<F>(temp_path: &Path, file: IndexFile, write_body: F) -> Result<(), IndexError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), IndexError>,
{
    let mut writer = BufWriter::new(File::create(temp_path)?);
    bincode::serialize_into(&mut writer, &file.version())?;
    write_body(&mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Opens one file, checks its version and hands the body to `read_body`
///
/// `read_body` receives the file size as the decoding limit.
fn read_file<T, F>(directory: &Path, file: IndexFile, read_body: F) -> Result<T, IndexError>
where
    F: FnOnce(&mut BufReader<File>, u64) -> Result<T, IndexError>,
{
    let path = directory.join(file.file_name());
    let handle = File::open(&path)?;
    let limit = handle.metadata()?.len();
    let mut reader = BufReader::new(handle);

    let found: u64 = decoder(limit).deserialize_from(&mut reader)?;
    if found != file.version() {
        return Err(IndexError::VersionMismatch {
            file,
            found,
            expected: file.version(),
        });
    }

    read_body(&mut reader, limit)
}

/// Reads the declared page count and as many records as decode cleanly
fn read_pages(
    reader: &mut BufReader<File>,
    limit: u64,
) -> Result<(Vec<PageRecord>, u64), IndexError> {
    let declared: u64 = decoder(limit).deserialize_from(&mut *reader)?;

    let mut pages = Vec::new();
    for index in 0..declared {
        let record: Result<PageRecord, _> = decoder(limit).deserialize_from(&mut *reader);
        match record {
            Ok(page) => pages.push(page),
            Err(e) => {
                tracing::debug!("Stopped reading page records at {}: {}", index, e);
                break;
            }
        }
    }

    Ok((pages, declared))
}
