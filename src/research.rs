//! The research module files summaries as Markdown documents and keeps
//! their metadata in a JSON digest stored next to them.
//!
//! The digest is read once when the store is opened; the in-memory record
//! list is authoritative from then on and every mutation rewrites the whole
//! digest file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{error, info};
use once_cell::sync::Lazy;
use rand::Rng;
use rand::distributions::Alphanumeric;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DIGEST_DATE_FORMAT, FILE_NAME_UNSAFE, REPEATED_UNDERSCORES, RESEARCH_DIGEST_FILE_NAME,
    RESEARCH_FILE_EXT, RESEARCH_FOLDER, RESEARCH_ID_SUFFIX_LENGTH,
};
use crate::error::Result;

static FILE_NAME_UNSAFE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(FILE_NAME_UNSAFE).expect("Failed to compile FILE_NAME_UNSAFE regex"));

static REPEATED_UNDERSCORES_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(REPEATED_UNDERSCORES).expect("Failed to compile REPEATED_UNDERSCORES regex")
});

/// Metadata for one filed research document, as stored in the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRecord {
    /// Unique identifier, also the file stem of the backing document.
    pub id: String,
    /// Creation timestamp, formatted as `%Y-%m-%d %H:%M:%S %z`.
    pub created_date: String,
    /// Sanitized display name.
    pub name: String,
    /// File name of the backing document inside the research folder.
    pub file_name: String,
    /// Links the research was built from.
    pub links: Vec<String>,
    /// Whether the document is hidden from default listings.
    pub archived: bool,
}

/// Stores research documents as Markdown files plus a JSON digest of their
/// metadata.
pub struct ResearchStore {
    /// Folder the documents and the digest live in.
    dir: PathBuf,
    /// Path of the JSON digest file.
    digest_path: PathBuf,
    /// In-memory mirror of the digest.
    records: Vec<ResearchRecord>,
}

impl ResearchStore {
    /// Opens the research store under the given assets folder, creating the
    /// research subfolder and an empty digest when they do not exist yet.
    ///
    /// # Arguments
    ///
    /// * `assets_dir` - Root assets folder the research subfolder lives in
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be created or the digest file
    /// cannot be read, parsed or initialized.
    pub fn open(assets_dir: &Path) -> Result<Self> {
        let dir = assets_dir.join(RESEARCH_FOLDER);
        fs::create_dir_all(&dir)?;
        let digest_path = dir.join(RESEARCH_DIGEST_FILE_NAME);

        let records: Vec<ResearchRecord> = if digest_path.exists() {
            serde_json::from_str(&fs::read_to_string(&digest_path)?)?
        } else {
            fs::write(&digest_path, "[]")?;
            Vec::new()
        };
        info!("Loaded metadata for {} research documents", records.len());

        Ok(Self {
            dir,
            digest_path,
            records,
        })
    }

    /// Files a research document and registers it in the digest.
    ///
    /// The document text is written to `<id>.md` where the id is the
    /// sanitized name plus a random suffix, unique within the digest. When
    /// `add_title_header` is set, a `# <name>` heading with the original,
    /// unsanitized name is prepended to the text.
    ///
    /// # Arguments
    ///
    /// * `text` - The document body
    /// * `name` - Human-readable research name
    /// * `links` - Links the research was built from
    /// * `add_title_header` - Whether to prepend a title heading
    ///
    /// # Returns
    ///
    /// The id of the filed document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document or the digest cannot be written.
    pub fn persist(
        &mut self,
        text: &str,
        name: &str,
        links: &[String],
        add_title_header: bool,
    ) -> Result<String> {
        let body = if add_title_header {
            format!("# {name}\n{text}")
        } else {
            text.to_string()
        };

        let safe_name = sanitize_file_name(name);
        info!("Persisting research: {safe_name}");

        let id = self.unique_id(&safe_name);
        let file_name = format!("{id}.{RESEARCH_FILE_EXT}");
        fs::write(self.dir.join(&file_name), body)?;

        self.records.push(ResearchRecord {
            id: id.clone(),
            created_date: Utc::now().format(DIGEST_DATE_FORMAT).to_string(),
            name: safe_name,
            file_name,
            links: links.to_vec(),
            archived: false,
        });
        self.write_digest()?;

        Ok(id)
    }

    /// Returns the ids of stored research documents.
    ///
    /// # Arguments
    ///
    /// * `include_archived` - Whether archived documents appear in the list
    pub fn list_ids(&self, include_archived: bool) -> Vec<String> {
        self.records
            .iter()
            .filter(|record| include_archived || !record.archived)
            .map(|record| record.id.clone())
            .collect()
    }

    /// Returns the digest record and the document text for a research id.
    ///
    /// Archived documents are treated as absent unless `include_archived`
    /// is set. A record whose backing file cannot be read is still
    /// returned, with empty text; the read failure is logged.
    ///
    /// # Arguments
    ///
    /// * `id` - The research id to look up
    /// * `include_archived` - Whether archived documents are visible
    pub fn get_details(
        &self,
        id: &str,
        include_archived: bool,
    ) -> Option<(ResearchRecord, String)> {
        info!("Getting details for research: {id}");

        let record = self
            .records
            .iter()
            .find(|record| record.id == id && (include_archived || !record.archived))?;

        let path = self.dir.join(&record.file_name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                error!("Failed to read research file {}: {err}", path.display());
                String::new()
            }
        };

        Some((record.clone(), text))
    }

    /// Archives or permanently deletes a research document.
    ///
    /// Archiving marks the record and keeps the document file. Permanent
    /// deletion drops the record from the digest and removes the file; the
    /// file removal also runs for ids the digest no longer knows, so an
    /// orphaned document can be cleaned up. An unknown id is otherwise a
    /// silent no-op.
    ///
    /// # Arguments
    ///
    /// * `id` - The research id to archive or delete
    /// * `permanent` - `false` to archive, `true` to delete for good
    ///
    /// # Errors
    ///
    /// Returns an error if the digest cannot be rewritten or the document
    /// file cannot be removed.
    pub fn delete(&mut self, id: &str, permanent: bool) -> Result<()> {
        info!("Deleting research {id} (permanent: {permanent})");

        if let Some(position) = self.records.iter().position(|record| record.id == id) {
            if permanent {
                self.records.remove(position);
            } else if let Some(record) = self.records.get_mut(position) {
                record.archived = true;
            }
            self.write_digest()?;
        }

        if permanent {
            self.remove_document_file(id)?;
        }

        Ok(())
    }

    fn unique_id(&self, safe_name: &str) -> String {
        loop {
            let suffix: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(RESEARCH_ID_SUFFIX_LENGTH)
                .map(char::from)
                .collect();
            let id = format!("{safe_name}-{suffix}");
            if !self.records.iter().any(|record| record.id == id) {
                return id;
            }
        }
    }

    fn remove_document_file(&self, id: &str) -> Result<()> {
        let path = self.dir.join(format!("{id}.{RESEARCH_FILE_EXT}"));
        if path.exists() {
            fs::remove_file(path)?;
        }

        Ok(())
    }

    fn write_digest(&self) -> Result<()> {
        fs::write(&self.digest_path, serde_json::to_string_pretty(&self.records)?)?;

        Ok(())
    }
}

/// Reduces a research name to a form safe to use in file names and ids.
///
/// Characters outside `[a-zA-Z0-9_.-]` become underscores, leading and
/// trailing dots are stripped, and runs of underscores collapse to one.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced = FILE_NAME_UNSAFE_REGEX.replace_all(name, "_");
    let trimmed = replaced.trim_matches('.');

    REPEATED_UNDERSCORES_REGEX
        .replace_all(trimmed, "_")
        .to_string()
}
