//! Shared test utilities for the boardgen test suite.
//!
//! Provides a builder for board YAML, fixture setup, small filesystem
//! helpers, and synthetic image bytes for thumbnail tests.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! write_file(&tmp.path().join("boards"), "zz.yaml", &BoardYaml::new("Extra").render());
//! ```

use image::{ImageEncoder, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` (boards + page_template) to a temp directory.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `content` to `dir/name`, creating `dir` if needed.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// =========================================================================
// Board YAML builder
// =========================================================================

/// Builds the text of a board file, valid unless told otherwise.
///
/// String values are always quoted so `"0"` stays a string.
pub struct BoardYaml {
    fields: Vec<(&'static str, String)>,
    extra: Vec<String>,
}

impl BoardYaml {
    pub fn new(name: &str) -> Self {
        Self {
            fields: vec![
                ("name", quoted(name)),
                ("chip", quoted("ESP32-S3")),
                ("cores", quoted("2")),
                ("flash", quoted("8MB")),
                ("ram", quoted("512KB")),
                ("usb", quoted("type-c")),
                ("dimensions", quoted("52 x 25 mm")),
                ("smd", "false".to_string()),
                ("image", "null".to_string()),
                ("url", quoted("https://example.com/board")),
            ],
            extra: Vec::new(),
        }
    }

    fn set(mut self, key: &str, value: String) -> Self {
        if let Some(field) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            field.1 = value;
        }
        self
    }

    pub fn flash(self, value: &str) -> Self {
        self.set("flash", quoted(value))
    }

    pub fn ram(self, value: &str) -> Self {
        self.set("ram", quoted(value))
    }

    pub fn usb(self, value: &str) -> Self {
        self.set("usb", quoted(value))
    }

    pub fn image(self, value: &str) -> Self {
        self.set("image", quoted(value))
    }

    /// Drop a default field entirely.
    pub fn without(mut self, key: &str) -> Self {
        self.fields.retain(|(k, _)| *k != key);
        self
    }

    /// Append a raw YAML line.
    pub fn line(mut self, raw: &str) -> Self {
        self.extra.push(raw.to_string());
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.fields {
            out.push_str(&format!("{key}: {value}\n"));
        }
        for line in &self.extra {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Encode a solid-color RGBA image as PNG.
pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}
