//! Zip export extraction.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::error::DicomCompareError;

/// Counts gathered while scanning an extracted export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub total_files: usize,
    pub total_folders: usize,
    pub dicom_files: usize,
    pub non_dicom_files: usize,
}

impl ExtractionStats {
    /// Walks `root` and classifies every regular file.
    pub fn scan(root: &Path) -> Self {
        let mut stats = Self::default();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
        {
            let file_type = entry.file_type();
            if file_type.is_dir() {
                stats.total_folders += 1;
            } else if file_type.is_file() {
                stats.total_files += 1;
                if super::is_dicom_file(entry.path()) {
                    stats.dicom_files += 1;
                } else {
                    stats.non_dicom_files += 1;
                }
            }
        }
        stats
    }
}

/// An archive unpacked into a temporary directory, removed on drop.
#[derive(Debug)]
pub struct ExtractedArchive {
    pub dir: TempDir,
    pub stats: ExtractionStats,
}

impl ExtractedArchive {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Returns true when the path looks like a zip archive by extension.
pub fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Extracts `path` into a fresh temporary directory.
pub fn extract_archive(path: &Path) -> Result<ExtractedArchive, DicomCompareError> {
    let file = File::open(path).map_err(|source| DicomCompareError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    let archive_error = |source| DicomCompareError::Archive {
        path: path.to_path_buf(),
        source,
    };

    let mut archive = zip::ZipArchive::new(file).map_err(archive_error)?;
    let dir = tempfile::Builder::new()
        .prefix("dicomcompare-")
        .tempdir()?;
    archive.extract(dir.path()).map_err(archive_error)?;

    let stats = ExtractionStats::scan(dir.path());
    tracing::debug!(
        archive = %path.display(),
        files = stats.total_files,
        folders = stats.total_folders,
        dicom = stats.dicom_files,
        "extracted archive"
    );

    Ok(ExtractedArchive { dir, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    fn fake_dicom() -> Vec<u8> {
        let mut data = vec![0u8; 128];
        data.extend_from_slice(b"DICM");
        data.extend_from_slice(&[0u8; 16]);
        data
    }

    #[test]
    fn extracts_and_counts_files() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("export.zip");
        let dicom = fake_dicom();
        write_zip(
            &zip_path,
            &[
                ("study/series/IM0001", &dicom),
                ("study/series/IM0002.dcm", &dicom),
                ("study/README.txt", b"hello"),
            ],
        );

        let extracted = extract_archive(&zip_path).unwrap();
        assert_eq!(extracted.stats.total_files, 3);
        assert_eq!(extracted.stats.dicom_files, 2);
        assert_eq!(extracted.stats.non_dicom_files, 1);
        assert_eq!(extracted.stats.total_folders, 2);
        assert!(extracted.path().join("study/series/IM0001").is_file());
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("broken.zip");
        std::fs::write(&zip_path, b"not a zip").unwrap();

        let err = extract_archive(&zip_path).unwrap_err();
        assert!(matches!(err, DicomCompareError::Archive { .. }));
    }

    #[test]
    fn zip_detection_is_case_insensitive() {
        assert!(is_zip(Path::new("a/B.ZIP")));
        assert!(!is_zip(Path::new("a/b.dcm")));
    }
}
