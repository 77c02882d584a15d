//! The prompts module stores named prompt templates as plain text files,
//! one file per prompt, inside the assets folder.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::constants::{PROMPT_FILE_EXT, PROMPTS_FOLDER, REQUIRED_PLACEHOLDERS};
use crate::error::{Error, Result};

/// A catalog of prompt templates backed by a folder of `.txt` files.
///
/// The whole catalog is read into memory when the store is opened; every
/// mutation updates the in-memory copy and rewrites the backing file.
pub struct PromptStore {
    /// Folder the prompt files live in.
    dir: PathBuf,
    /// Loaded prompts as (name, text) pairs, kept in insertion order.
    prompts: Vec<(String, String)>,
}

impl PromptStore {
    /// Opens the prompt store under the given assets folder, creating the
    /// prompts subfolder if needed.
    ///
    /// Every `.txt` file in the folder becomes a prompt: the file stem is
    /// the prompt name and the trimmed file content is its text. Files with
    /// other extensions are ignored.
    ///
    /// # Arguments
    ///
    /// * `assets_dir` - Root assets folder the prompts subfolder lives in
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be created or a prompt file
    /// cannot be read.
    pub fn open(assets_dir: &Path) -> Result<Self> {
        let dir = assets_dir.join(PROMPTS_FOLDER);
        fs::create_dir_all(&dir)?;

        let mut prompts = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PROMPT_FILE_EXT) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let text = fs::read_to_string(&path)?;
            prompts.push((name.to_string(), text.trim().to_string()));
        }
        info!("Loaded {} prompts", prompts.len());

        Ok(Self { dir, prompts })
    }

    /// Returns `true` when the store holds no prompts.
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Returns the names of all stored prompts.
    pub fn list_names(&self) -> Vec<String> {
        self.prompts.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Returns the text of the prompt with the given name.
    ///
    /// # Arguments
    ///
    /// * `name` - The prompt name to look up
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPrompt`] if no prompt with this name exists.
    pub fn get(&self, name: &str) -> Result<&str> {
        info!("Getting prompt: {name}");

        self.prompts
            .iter()
            .find(|(prompt_name, _)| prompt_name == name)
            .map(|(_, text)| text.as_str())
            .ok_or_else(|| Error::UnknownPrompt(name.to_string()))
    }

    /// Adds a prompt after checking that it contains every required
    /// placeholder, then writes it to disk.
    ///
    /// Adding under an existing name replaces that prompt in place.
    ///
    /// # Arguments
    ///
    /// * `name` - The name to store the prompt under
    /// * `text` - The prompt template text
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPlaceholder`] if `text` lacks one of the
    /// required `{{...}}` placeholders, or an error if the prompt file
    /// cannot be written. Nothing is stored when validation fails.
    pub fn add(&mut self, name: &str, text: &str) -> Result<()> {
        for placeholder in REQUIRED_PLACEHOLDERS {
            if !text.contains(&format!("{{{{{placeholder}}}}}")) {
                return Err(Error::MissingPlaceholder(placeholder.to_string()));
            }
        }

        info!("Adding prompt: {name}");
        self.insert(name, text);
        self.save(name, text)
    }

    /// Updates the prompt with the given name, writing the new text to disk.
    ///
    /// The text is stored verbatim; placeholders are not checked on update.
    /// An unknown name is created rather than rejected.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the prompt to update
    /// * `text` - The new prompt template text
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt file cannot be written.
    pub fn update(&mut self, name: &str, text: &str) -> Result<()> {
        info!("Updating prompt: {name}");
        self.insert(name, text);
        self.save(name, text)
    }

    fn insert(&mut self, name: &str, text: &str) {
        match self
            .prompts
            .iter_mut()
            .find(|(prompt_name, _)| prompt_name == name)
        {
            Some(slot) => slot.1 = text.to_string(),
            None => self.prompts.push((name.to_string(), text.to_string())),
        }
    }

    fn save(&self, name: &str, text: &str) -> Result<()> {
        let path = self.dir.join(format!("{name}.{PROMPT_FILE_EXT}"));
        fs::write(path, text)?;

        Ok(())
    }
}
