//! CLI command handlers

pub mod capture;
pub mod config;
pub mod note;
pub mod status;
pub mod theme;

use jotpad_core::{FileStorage, Notepad};

/// Notepad backed by the on-disk storage file
pub type Pad = Notepad<FileStorage>;
