//! Ingestion integration tests.

use std::io::{Cursor, Write};
use tableau_core::ReferenceOrigin;
use tableau_ingest::{UploadedItem, ingest};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn zip_bytes(entries: &[(&str, &[u8])]) -> anyhow::Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options)?;
        } else {
            writer.start_file(*name, options)?;
            writer.write_all(bytes)?;
        }
    }
    Ok(writer.finish()?.into_inner())
}

#[tokio::test]
async fn test_plain_files_are_classified() {
    let material = ingest(vec![
        UploadedItem::new("story.txt", b"Once upon a time.".to_vec()),
        UploadedItem::new("Jane.png", vec![0x89, 0x50]),
        UploadedItem::new("theme.mp3", vec![1, 2, 3]),
    ])
    .await;

    assert_eq!(material.texts().len(), 1);
    assert_eq!(material.images().len(), 1);
    assert_eq!(material.images()[0].character(), "Jane");
    assert_eq!(material.images()[0].mime_type(), "image/png");
    assert_eq!(material.ignored().len(), 1);
    assert_eq!(material.ignored()[0].name, "theme.mp3");
}

#[tokio::test]
async fn test_archive_entries_are_expanded_in_order() -> anyhow::Result<()> {
    let archive = zip_bytes(&[
        ("refs/", b""),
        ("refs/chapter1.md", b"# One"),
        ("refs/chapter2.md", b"# Two"),
        ("refs/John Smith.jpeg", &[0xff, 0xd8]),
        ("__MACOSX/refs/._John Smith.jpeg", &[0]),
        ("refs/.DS_Store", &[0]),
    ])?;

    let material = ingest(vec![UploadedItem::new("bundle.zip", archive)]).await;

    let names: Vec<&str> = material.texts().iter().map(|t| t.name().as_str()).collect();
    assert_eq!(names, vec!["bundle.zip/refs/chapter1.md", "bundle.zip/refs/chapter2.md"]);
    assert_eq!(material.images().len(), 1);
    assert_eq!(material.images()[0].character(), "John Smith");
    // Directory entry skipped, both hidden entries ignored
    assert_eq!(material.ignored().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_archive_is_ignored_not_fatal() {
    let material = ingest(vec![
        UploadedItem::new("broken.zip", b"definitely not a zip".to_vec()),
        UploadedItem::new("notes.txt", b"still here".to_vec()),
    ])
    .await;

    assert_eq!(material.texts().len(), 1);
    assert_eq!(material.ignored().len(), 1);
    assert!(material.ignored()[0].reason.contains("broken.zip"));
}

#[tokio::test]
async fn test_invalid_utf8_text_is_ignored() {
    let material = ingest(vec![UploadedItem::new("story.txt", vec![0xff, 0xfe, 0xfd])]).await;

    assert!(material.texts().is_empty());
    assert!(material.ignored()[0].reason.contains("UTF-8"));
}

#[tokio::test]
async fn test_merge_is_deterministic_in_upload_order() -> anyhow::Result<()> {
    let archive = zip_bytes(&[("jane.png", &[2])])?;

    for _ in 0..5 {
        let material = ingest(vec![
            UploadedItem::new("Jane.png", vec![1]),
            UploadedItem::new("cast.zip", archive.clone()),
        ])
        .await;

        assert_eq!(material.images().len(), 1);
        assert_eq!(material.images()[0].bytes(), &vec![2]);
        assert_eq!(material.collisions().len(), 1);
        assert_eq!(material.collisions()[0].replaced, "Jane.png");
        assert_eq!(material.collisions()[0].kept, "cast.zip/jane.png");
    }
    Ok(())
}

#[tokio::test]
async fn test_images_become_uploaded_references() {
    let material = ingest(vec![UploadedItem::new("Jane Doe.webp", vec![7])]).await;

    let references = material.references();
    let jane = references.get("jane doe").expect("reference present");
    assert_eq!(*jane.origin(), ReferenceOrigin::Uploaded);
    assert_eq!(jane.mime_type(), "image/webp");
}

#[tokio::test]
async fn test_from_path_reads_file_name() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("draft.fountain");
    std::fs::write(&path, "INT. KITCHEN - DAY")?;

    let item = UploadedItem::from_path(&path).await?;

    assert_eq!(item.name(), "draft.fountain");
    assert_eq!(item.bytes(), &b"INT. KITCHEN - DAY".to_vec());
    Ok(())
}
