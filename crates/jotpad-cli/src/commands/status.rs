//! Status command handler

use anyhow::Result;

use jotpad_core::Config;

use super::Pad;
use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(pad: &Pad, config: &Config, output: &Output) -> Result<()> {
    let storage = pad.repository().store().area();
    let size = std::fs::metadata(storage.path())
        .map(|m| m.len())
        .unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "storage": {
                        "path": storage.path(),
                        "exists": storage.exists(),
                        "size": size
                    },
                    "notes": pad.notes().len(),
                    "theme": pad.theme(),
                    "autosave_delay_ms": config.autosave_delay_ms
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", pad.notes().len());
        }
        OutputFormat::Human => {
            println!("Jotpad Status");
            println!("=============");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  File:     {}", storage.path().display());
            println!("  Size:     {}", format_size(size));
            println!();
            println!("Contents:");
            println!("  Notes: {}", pad.notes().len());
            println!("  Theme: {}", pad.theme());
            println!();
            println!("Autosave: after {} ms idle", config.autosave_delay_ms);
        }
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
