//! Before/after size reporting and download naming.

use serde::{Deserialize, Serialize};

use super::OutputFormat;

/// Default prefix for downloaded files.
pub const DEFAULT_FILE_NAME_PREFIX: &str = "kayablue-image";

/// Original upload size against the encoded output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionReport {
    pub original_bytes: usize,
    pub encoded_bytes: usize,
}

impl CompressionReport {
    pub fn new(original_bytes: usize, encoded_bytes: usize) -> Self {
        Self {
            original_bytes,
            encoded_bytes,
        }
    }

    /// Percentage saved relative to the original; negative when the output grew.
    pub fn savings_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        let original = self.original_bytes as f64;
        (original - self.encoded_bytes as f64) / original * 100.0
    }

    /// One-line summary such as `"2.0 MB -> 512.0 KB (75.0% smaller)"`.
    pub fn summary(&self) -> String {
        let savings = self.savings_percent();
        let change = if savings >= 0.0 {
            format!("{savings:.1}% smaller")
        } else {
            format!("{:.1}% larger", -savings)
        };
        format!(
            "{} -> {} ({change})",
            format_size(self.original_bytes),
            format_size(self.encoded_bytes)
        )
    }
}

/// Human-readable byte count using binary units.
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Suggested download file name: `<prefix>-<timestamp_ms>.<ext>`.
pub fn download_file_name(prefix: &str, format: OutputFormat, timestamp_ms: u64) -> String {
    let prefix = prefix.trim();
    let prefix = if prefix.is_empty() {
        DEFAULT_FILE_NAME_PREFIX
    } else {
        prefix
    };
    format!("{prefix}-{timestamp_ms}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savings_percent() {
        assert_eq!(CompressionReport::new(1000, 250).savings_percent(), 75.0);
        assert_eq!(CompressionReport::new(1000, 1000).savings_percent(), 0.0);
        assert_eq!(CompressionReport::new(1000, 1500).savings_percent(), -50.0);
    }

    #[test]
    fn test_savings_with_empty_original() {
        assert_eq!(CompressionReport::new(0, 100).savings_percent(), 0.0);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10.0 MB");
    }

    #[test]
    fn test_summary() {
        let report = CompressionReport::new(2 * 1024 * 1024, 512 * 1024);
        assert_eq!(report.summary(), "2.0 MB -> 512.0 KB (75.0% smaller)");

        let grew = CompressionReport::new(1000, 1100);
        assert_eq!(grew.summary(), "1000 B -> 1.1 KB (10.0% larger)");
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(
            download_file_name("kayablue-image", OutputFormat::Png, 1_700_000_000_000),
            "kayablue-image-1700000000000.png"
        );
        assert_eq!(
            download_file_name("photo", OutputFormat::Jpeg, 42),
            "photo-42.jpg"
        );
    }

    #[test]
    fn test_download_file_name_blank_prefix() {
        assert_eq!(
            download_file_name("  ", OutputFormat::WebP, 7),
            "kayablue-image-7.webp"
        );
    }
}
