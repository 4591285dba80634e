//! Loading exports from disk into the record model.
//!
//! An export is a zip archive, a directory or a single DICOM file. Files are
//! discovered with a cheap header check, parsed up to (but excluding) the
//! pixel data, and converted element by element into a [`TagMap`]. Pixel
//! payloads are attached as [`DicomFilePixels`] sources and decoded only when
//! an image comparison asks for them.
//!
//! A file that fails to parse is recorded in [`LoadStats::failures`] and
//! skipped; it never aborts loading the rest of the export.

pub mod archive;

pub use archive::{extract_archive, ExtractedArchive, ExtractionStats};

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dicom_core::header::Header;
use dicom_core::value::{PrimitiveValue, Value};
use dicom_core::VR;
use dicom_dictionary_std::tags;
use dicom_object::file::ReadPreamble;
use dicom_object::mem::InMemElement;
use dicom_object::{DefaultDicomObject, InMemDicomObject, OpenFileOptions};
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use serde::Serialize;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::error::DicomCompareError;
use crate::model::{
    Export, Instance, PixelArray, PixelError, PixelLoad, PixelSource, Rescale, TagElement, TagId,
    TagMap, TagValue, Window,
};

/// Extensions that are never DICOM.
const SKIPPED_EXTENSIONS: [&str; 10] = [
    "txt", "xml", "json", "log", "zip", "rar", "tar", "gz", "md", "pdf",
];

/// 128-byte preamble plus the `DICM` magic.
const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// One file that could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// What happened while loading one export.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LoadStats {
    /// Present when the export was an archive or directory.
    pub extraction: Option<ExtractionStats>,
    pub candidates: usize,
    pub loaded: usize,
    pub failures: Vec<LoadFailure>,
}

/// A loaded export plus whatever must outlive it.
///
/// Pixel sources reopen their files on demand, so an extracted archive's
/// temporary directory is kept here for as long as the export is in use.
#[derive(Debug)]
pub struct LoadedExport {
    pub export: Export,
    pub stats: LoadStats,
    workdir: WorkDir,
}

impl LoadedExport {
    /// Splits off the export; the returned [`WorkDir`] must be kept alive
    /// while the export's pixel data may still be read.
    pub fn into_parts(self) -> (Export, LoadStats, WorkDir) {
        (self.export, self.stats, self.workdir)
    }
}

/// Temporary extraction directory, removed on drop.
#[derive(Debug, Default)]
pub struct WorkDir(Option<TempDir>);

/// Loads one export from a zip archive, a directory or a single file.
pub fn load_export(path: &Path) -> Result<LoadedExport, DicomCompareError> {
    if !path.exists() {
        return Err(DicomCompareError::InputNotFound(path.to_path_buf()));
    }

    let label = export_label(path);
    let (root, workdir, extraction) = if path.is_dir() {
        (path.to_path_buf(), None, Some(ExtractionStats::scan(path)))
    } else if archive::is_zip(path) {
        let extracted = extract_archive(path)?;
        let root = extracted.path().to_path_buf();
        (root, Some(extracted.dir), Some(extracted.stats))
    } else {
        (path.to_path_buf(), None, None)
    };

    let files = discover_dicom_files(&root);
    let mut stats = LoadStats {
        extraction,
        candidates: files.len(),
        ..LoadStats::default()
    };

    let mut instances = Vec::with_capacity(files.len());
    for file in files {
        match load_instance(&file, &label) {
            Ok(instance) => instances.push(instance),
            Err(err) => {
                tracing::warn!(file = %file.display(), "skipping file: {err}");
                stats.failures.push(LoadFailure {
                    path: file,
                    reason: err.to_string(),
                });
            }
        }
    }
    stats.loaded = instances.len();

    tracing::info!(
        export = %label,
        loaded = stats.loaded,
        failed = stats.failures.len(),
        "loaded export"
    );

    Ok(LoadedExport {
        export: Export::new(label, instances),
        stats,
        workdir: WorkDir(workdir),
    })
}

fn export_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// All files under `root` that pass [`is_dicom_file`], in path order.
pub fn discover_dicom_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_dicom_file(path))
        .collect()
}

/// Cheap header check: known non-DICOM extensions are skipped, then the
/// `DICM` magic after the preamble is required. Files too short for a
/// preamble are accepted only with a `.dcm` extension.
pub fn is_dicom_file(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    if extension
        .as_deref()
        .is_some_and(|ext| SKIPPED_EXTENSIONS.contains(&ext))
    {
        return false;
    }

    match has_dicom_magic(path) {
        Ok(true) => true,
        Ok(false) => extension.as_deref() == Some("dcm"),
        Err(_) => false,
    }
}

fn has_dicom_magic(path: &Path) -> std::io::Result<bool> {
    let mut header = [0u8; PREAMBLE_LEN + 4];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < header.len() {
        let read = file.read(&mut header[filled..])?;
        if read == 0 {
            return Ok(false);
        }
        filled += read;
    }
    Ok(&header[PREAMBLE_LEN..] == MAGIC)
}

fn open_dicom(path: &Path, stop_at_pixels: bool) -> Result<DefaultDicomObject, DicomCompareError> {
    let options = OpenFileOptions::new().read_preamble(ReadPreamble::Auto);
    let options = if stop_at_pixels {
        options.read_until(tags::PIXEL_DATA)
    } else {
        options
    };
    options
        .open_file(path)
        .map_err(|source| DicomCompareError::DicomOpen {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
}

/// Parses one file into an [`Instance`] without touching its pixel data.
pub fn load_instance(path: &Path, label: &str) -> Result<Instance, DicomCompareError> {
    let object = open_dicom(path, true)?;
    let tags = convert_object(&object);

    let mut instance = Instance::anonymous()
        .with_file_path(path)
        .with_source_label(label);
    instance.uid = first_str(&tags, TagId::SOP_INSTANCE_UID).map(Into::into);
    instance.series_uid = first_str(&tags, TagId::SERIES_INSTANCE_UID);
    instance.study_uid = first_str(&tags, TagId::STUDY_INSTANCE_UID);

    let source = DicomFilePixels {
        path: path.to_path_buf(),
        rescale: rescale_from(&tags),
        window: window_from(&tags),
    };
    Ok(instance.with_tags(tags).with_pixel_source(Arc::new(source)))
}

fn first_str(tags: &TagMap, tag: TagId) -> Option<String> {
    tags.get(&tag).and_then(TagElement::first_str)
}

fn first_f64(tags: &TagMap, tag: TagId) -> Option<f64> {
    tags.get(&tag).and_then(TagElement::first_f64)
}

fn rescale_from(tags: &TagMap) -> Option<Rescale> {
    let slope = first_f64(tags, TagId::RESCALE_SLOPE);
    let intercept = first_f64(tags, TagId::RESCALE_INTERCEPT);
    if slope.is_none() && intercept.is_none() {
        return None;
    }
    Some(Rescale::new(slope.unwrap_or(1.0), intercept.unwrap_or(0.0)))
}

fn window_from(tags: &TagMap) -> Option<Window> {
    let center = first_f64(tags, TagId::WINDOW_CENTER)?;
    let width = first_f64(tags, TagId::WINDOW_WIDTH)?;
    Some(Window::new(center, width))
}

/// Converts every element of a dataset (or sequence item).
pub fn convert_object(object: &InMemDicomObject) -> TagMap {
    object
        .iter()
        .map(|element| (TagId::from(element.tag()), convert_element(element)))
        .collect()
}

fn convert_element(element: &InMemElement) -> TagElement {
    let vr = element.vr();
    let value = match element.value() {
        Value::Primitive(primitive) => convert_primitive(primitive, vr),
        Value::Sequence(sequence) => {
            TagValue::Sequence(sequence.items().iter().map(convert_object).collect())
        }
        Value::PixelSequence(sequence) => TagValue::Binary(
            sequence
                .fragments()
                .iter()
                .flat_map(|fragment| fragment.iter().copied())
                .collect(),
        ),
    };
    TagElement::new(vr, value)
}

fn is_binary_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::OB | VR::OD | VR::OF | VR::OL | VR::OV | VR::OW | VR::UN
    )
}

fn is_binary_numeric_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::US | VR::SS | VR::UL | VR::SL | VR::UV | VR::SV | VR::FL | VR::FD
    )
}

fn convert_primitive(value: &PrimitiveValue, vr: VR) -> TagValue {
    if is_binary_vr(vr) {
        return match value {
            PrimitiveValue::Empty => TagValue::Empty,
            other => TagValue::Binary(other.to_bytes().into_owned()),
        };
    }

    match value {
        PrimitiveValue::Empty => TagValue::Empty,
        PrimitiveValue::Str(_) | PrimitiveValue::Strs(_) if is_binary_numeric_vr(vr) => {
            TagValue::Undecodable(format!(
                "{} value stored as text: {}",
                vr.to_string(),
                value.to_str()
            ))
        }
        PrimitiveValue::Str(s) => TagValue::Text(vec![s.clone()]),
        PrimitiveValue::Strs(values) => TagValue::Text(values.iter().cloned().collect()),
        PrimitiveValue::Date(_) | PrimitiveValue::Time(_) | PrimitiveValue::DateTime(_) => {
            TagValue::Text(value.to_multi_str().into_owned())
        }
        PrimitiveValue::Tags(values) => TagValue::Text(
            values
                .iter()
                .map(|tag| TagId::from(*tag).to_string())
                .collect(),
        ),
        PrimitiveValue::U8(values) => TagValue::Int(values.iter().map(|&v| i64::from(v)).collect()),
        PrimitiveValue::I16(values) => {
            TagValue::Int(values.iter().map(|&v| i64::from(v)).collect())
        }
        PrimitiveValue::U16(values) => {
            TagValue::Int(values.iter().map(|&v| i64::from(v)).collect())
        }
        PrimitiveValue::I32(values) => {
            TagValue::Int(values.iter().map(|&v| i64::from(v)).collect())
        }
        PrimitiveValue::U32(values) => {
            TagValue::Int(values.iter().map(|&v| i64::from(v)).collect())
        }
        PrimitiveValue::I64(values) => TagValue::Int(values.to_vec()),
        PrimitiveValue::U64(values) => match values
            .iter()
            .map(|&v| i64::try_from(v))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(ints) => TagValue::Int(ints),
            Err(_) => TagValue::Undecodable(format!("{} value out of range", vr.to_string())),
        },
        PrimitiveValue::F32(values) => {
            TagValue::Float(values.iter().map(|&v| f64::from(v)).collect())
        }
        PrimitiveValue::F64(values) => TagValue::Float(values.to_vec()),
        #[allow(unreachable_patterns)]
        _ => TagValue::Undecodable(format!("unsupported {} value", vr.to_string())),
    }
}

/// Pixel payload of a file on disk, decoded on demand.
#[derive(Clone, Debug)]
pub struct DicomFilePixels {
    pub path: PathBuf,
    pub rescale: Option<Rescale>,
    pub window: Option<Window>,
}

impl PixelSource for DicomFilePixels {
    fn load(&self) -> PixelLoad {
        let object = open_dicom(&self.path, false).map_err(|e| PixelError::new(e.to_string()))?;
        if object.element(tags::PIXEL_DATA).is_err() {
            return Ok(None);
        }

        let decoded = object
            .decode_pixel_data()
            .map_err(|e| PixelError::new(format!("failed to decode pixel data: {e}")))?;
        // Stored values; rescale is applied by normalization only.
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let samples = decoded
            .to_vec_with_options::<f64>(&options)
            .map_err(|e| PixelError::new(format!("failed to convert pixel data: {e}")))?;

        let frames = decoded.number_of_frames() as usize;
        let samples_per_pixel = decoded.samples_per_pixel() as usize;
        let mut shape = Vec::with_capacity(4);
        if frames > 1 {
            shape.push(frames);
        }
        shape.push(decoded.rows() as usize);
        shape.push(decoded.columns() as usize);
        if samples_per_pixel > 1 {
            shape.push(samples_per_pixel);
        }

        tracing::trace!(file = %self.path.display(), ?shape, "decoded pixel data");

        let mut array = PixelArray::new(shape, samples);
        array.rescale = self.rescale;
        array.window = self.window;
        Ok(Some(array))
    }
}
