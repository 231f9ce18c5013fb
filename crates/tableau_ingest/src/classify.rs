//! File type classification by name.

use std::path::Path;

/// Extensions treated as reference text.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "fountain", "json", "csv"];

/// Extensions treated as character images, with their MIME types.
pub const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
];

/// What an uploaded name should be treated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum FileKind {
    /// Reference text
    #[display("text")]
    Text,
    /// Character image with its MIME type
    #[display("image ({})", _0)]
    Image(&'static str),
    /// Zip archive to expand
    #[display("archive")]
    Archive,
    /// OS metadata or hidden file, skipped
    #[display("hidden")]
    Hidden,
    /// Anything else
    #[display("unsupported")]
    Unsupported,
}

/// Classify an upload or archive entry by its name.
///
/// # Examples
///
/// ```
/// use tableau_ingest::{FileKind, classify_name};
///
/// assert_eq!(classify_name("notes/Story.MD"), FileKind::Text);
/// assert_eq!(classify_name("Jane.jpg"), FileKind::Image("image/jpeg"));
/// assert_eq!(classify_name("__MACOSX/._Jane.jpg"), FileKind::Hidden);
/// assert_eq!(classify_name("song.mp3"), FileKind::Unsupported);
/// ```
pub fn classify_name(name: &str) -> FileKind {
    let hidden = name
        .split(['/', '\\'])
        .any(|component| component == "__MACOSX" || component.starts_with('.'));
    if hidden {
        return FileKind::Hidden;
    }

    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);
    let Some(extension) = extension else {
        return FileKind::Unsupported;
    };

    if extension == "zip" {
        return FileKind::Archive;
    }
    if TEXT_EXTENSIONS.contains(&extension.as_str()) {
        return FileKind::Text;
    }
    IMAGE_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| FileKind::Image(mime))
        .unwrap_or(FileKind::Unsupported)
}

/// File name without directories or extension.
pub(crate) fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_files_inside_folders_are_hidden() {
        assert_eq!(classify_name("refs/.DS_Store"), FileKind::Hidden);
        assert_eq!(classify_name(".env"), FileKind::Hidden);
    }

    #[test]
    fn names_without_extension_are_unsupported() {
        assert_eq!(classify_name("README"), FileKind::Unsupported);
    }

    #[test]
    fn stem_drops_directories() {
        assert_eq!(file_stem("cast/Jane Doe.png"), "Jane Doe");
    }
}
