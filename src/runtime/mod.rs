//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over system operations,
//! enabling dependency injection and testability.
//!
//! # Structure
//!
//! - `env` - Working and well-known directories
//! - `fs` - File system operations (read, write, append, directory)
//! - `user` - User interaction (menu prompts, confirmation prompts)

mod env;
mod fs;
mod user;

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;

    /// Open a file for appending, creating it when missing.
    fn open_append(&self, path: &Path) -> Result<Box<dyn Write + Send>>;

    // Directories
    fn current_dir(&self) -> Result<PathBuf>;
    fn document_dir(&self) -> Option<PathBuf>;
    fn home_dir(&self) -> Option<PathBuf>;

    // User interaction
    /// Ask the user a free-form question and return the trimmed answer.
    fn prompt(&self, message: &str) -> Result<String>;

    /// Prompt user for confirmation. Returns true if user confirms (y/yes), false otherwise.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn open_append(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        self.open_append_impl(path)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn document_dir(&self) -> Option<PathBuf> {
        self.document_dir_impl()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir_impl()
    }

    fn prompt(&self, message: &str) -> Result<String> {
        self.prompt_impl(message)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.confirm_impl(prompt)
    }
}
