//! Zip archive expansion.

use crate::classify::{FileKind, classify_name};
use crate::material::Ingested;
use crate::upload::classify_bytes;
use std::io::{Cursor, Read};
use tableau_error::{IngestionError, IngestionErrorKind};
use tracing::{debug, warn};
use zip::ZipArchive;

/// Expand a zip archive into classified units, in archive order.
///
/// Runs synchronously; callers move it onto the blocking pool. Entries that
/// cannot be read are ignored individually.
pub(crate) fn expand_zip(archive_name: &str, bytes: Vec<u8>) -> Result<Vec<Ingested>, IngestionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        IngestionError::new(IngestionErrorKind::Archive {
            name: archive_name.to_string(),
            message: e.to_string(),
        })
    })?;

    let mut units = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                let name = format!("{}#{}", archive_name, index);
                let kind = IngestionErrorKind::UnreadableEntry {
                    name: name.clone(),
                    message: e.to_string(),
                };
                warn!(archive = archive_name, index, error = %kind, "Skipping unreadable archive entry");
                units.push(Ingested::ignored(name, kind.to_string()));
                continue;
            }
        };

        if entry.is_dir() {
            continue;
        }
        let entry_name = format!("{}/{}", archive_name, entry.name());
        match classify_name(entry.name()) {
            FileKind::Hidden => {
                debug!(entry = %entry_name, "Skipping hidden archive entry");
                units.push(Ingested::ignored(entry_name, "hidden or OS metadata file"));
                continue;
            }
            FileKind::Archive => {
                units.push(Ingested::ignored(entry_name, "nested archives are not expanded"));
                continue;
            }
            FileKind::Unsupported => {
                let kind = IngestionErrorKind::UnsupportedType(entry.name().to_string());
                units.push(Ingested::ignored(entry_name, kind.to_string()));
                continue;
            }
            FileKind::Text | FileKind::Image(_) => {}
        }

        let mut contents = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        if let Err(e) = entry.read_to_end(&mut contents) {
            let kind = IngestionErrorKind::UnreadableEntry {
                name: entry_name.clone(),
                message: e.to_string(),
            };
            warn!(entry = %entry_name, error = %kind, "Skipping unreadable archive entry");
            units.push(Ingested::ignored(entry_name, kind.to_string()));
            continue;
        }
        let entry_path = entry.name().to_string();
        units.push(classify_bytes(entry_name, &entry_path, contents));
    }

    Ok(units)
}
