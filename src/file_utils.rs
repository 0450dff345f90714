use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @const: Characters kept by slugify
static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());

// @const: Separator runs collapsed by slugify
static SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Regular files directly inside `dir`, sorted by file name
    pub fn list_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            if entry.file_type().is_file() {
                files.push(entry.path().to_path_buf());
            }
        }
        Ok(files)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}

/// Lowercase, underscore-separated name safe for folders and files.
///
/// Characters other than word characters, whitespace and `-` are dropped,
/// then runs of whitespace and `-` become a single `_`.
pub fn slugify(value: &str) -> String {
    let cleaned = NON_SLUG_CHARS.replace_all(value, "");
    let lowered = cleaned.trim().to_lowercase();
    SLUG_SEPARATORS.replace_all(&lowered, "_").into_owned()
}

/// Well-known files of one project folder
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    pub slug: String,
    pub root: PathBuf,
}

impl ProjectPaths {
    /// Project folder for a topic under `projects_dir`
    pub fn for_topic<P: AsRef<Path>>(projects_dir: P, topic: &str) -> Self {
        let slug = slugify(topic);
        Self {
            root: projects_dir.as_ref().join(&slug),
            slug,
        }
    }

    /// Existing project folder; its name is the slug
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let root = dir.as_ref().to_path_buf();
        let slug = root.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string());
        Self { slug, root }
    }

    pub fn ensure(&self) -> Result<()> {
        FileManager::ensure_dir(&self.root)?;
        FileManager::ensure_dir(self.footage_dir())
    }

    pub fn script(&self) -> PathBuf {
        self.root.join("script.json")
    }

    pub fn voiceover(&self) -> PathBuf {
        self.root.join("voiceover.mp3")
    }

    pub fn footage_dir(&self) -> PathBuf {
        self.root.join("footage")
    }

    pub fn words(&self) -> PathBuf {
        self.root.join("words.json")
    }

    pub fn final_video(&self) -> PathBuf {
        self.root.join(format!("{}_final.mp4", self.slug))
    }
}
