use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::NamedTranscriptFile;
use crate::Result;

/// File name of the archive produced for multi-video runs
pub const ARCHIVE_NAME: &str = "transcripts.zip";

/// Pack the files into a zip archive, one entry per file in input order.
///
/// Entries get a fixed timestamp and permissions so the same input always produces the
/// same bytes. Colliding names are made unique with [`dedupe_filenames`].
pub fn render_archive(files: &[NamedTranscriptFile]) -> Result<(Vec<u8>, &'static str)> {
    let files = dedupe_filenames(files.to_vec());

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for file in &files {
        writer.start_file(file.filename.as_str(), options)?;
        writer.write_all(file.content.as_bytes())?;
    }

    let cursor = writer.finish()?;
    Ok((cursor.into_inner(), ARCHIVE_NAME))
}

/// Rename files whose name was already used earlier in the list by appending
/// ` (2)`, ` (3)`, ... before the extension.
pub fn dedupe_filenames(files: Vec<NamedTranscriptFile>) -> Vec<NamedTranscriptFile> {
    let mut used: HashSet<String> = HashSet::new();

    files
        .into_iter()
        .map(|mut file| {
            if used.contains(&file.filename) {
                let (stem, extension) = split_extension(&file.filename);
                let mut counter = 2;
                let unique = loop {
                    let candidate = format!("{} ({}){}", stem, counter, extension);
                    if !used.contains(&candidate) {
                        break candidate;
                    }
                    counter += 1;
                };
                tracing::warn!("Duplicate file name {}, saving as {}", file.filename, unique);
                file.filename = unique;
            }
            used.insert(file.filename.clone());
            file
        })
        .collect()
}

fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(index) if index > 0 => filename.split_at(index),
        _ => (filename, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn file(name: &str, content: &str) -> NamedTranscriptFile {
        NamedTranscriptFile {
            filename: name.to_string(),
            content: content.to_string(),
        }
    }

    fn read_entries(bytes: &[u8]) -> Vec<(String, String)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut entry = archive.by_index(i).unwrap();
                let mut content = String::new();
                entry.read_to_string(&mut content).unwrap();
                (entry.name().to_string(), content)
            })
            .collect()
    }

    #[test]
    fn test_archive_round_trip() {
        let (bytes, name) = render_archive(&[file("a.txt", "hello")]).unwrap();
        assert_eq!(name, "transcripts.zip");

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive.by_name("a.txt").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn test_archive_keeps_order_and_renames_duplicates() {
        let files = vec![
            file("Talk.txt", "first"),
            file("Intro.txt", "second"),
            file("Talk.txt", "third"),
        ];
        let (bytes, _) = render_archive(&files).unwrap();

        assert_eq!(
            read_entries(&bytes),
            vec![
                ("Talk.txt".to_string(), "first".to_string()),
                ("Intro.txt".to_string(), "second".to_string()),
                ("Talk (2).txt".to_string(), "third".to_string()),
            ]
        );
    }

    #[test]
    fn test_archive_is_reproducible() {
        let files = vec![file("one.txt", "[00:00:00 → 00:00:02] hi\n"), file("two.txt", "")];
        let (first, _) = render_archive(&files).unwrap();
        let (second, _) = render_archive(&files).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_archive() {
        let (bytes, _) = render_archive(&[]).unwrap();
        assert!(read_entries(&bytes).is_empty());
    }

    #[test]
    fn test_dedupe_skips_taken_suffixes() {
        let names: Vec<_> = dedupe_filenames(vec![
            file("a.txt", ""),
            file("a (2).txt", ""),
            file("a.txt", ""),
            file("a.txt", ""),
            file("noext", ""),
            file("noext", ""),
        ])
        .into_iter()
        .map(|f| f.filename)
        .collect();

        assert_eq!(names, vec!["a.txt", "a (2).txt", "a (3).txt", "a (4).txt", "noext", "noext (2)"]);
    }
}
