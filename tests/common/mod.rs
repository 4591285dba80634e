#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use dicom_core::value::PrimitiveValue;
use dicom_core::{DataElement, Tag, VR};
use dicom_dictionary_std::tags;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};

const SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7";
const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";

/// A single-frame 16-bit monochrome image.
#[derive(Clone, Debug)]
pub struct Pixels {
    pub rows: u16,
    pub columns: u16,
    pub samples: Vec<u16>,
}

impl Pixels {
    pub fn new(rows: u16, columns: u16, samples: Vec<u16>) -> Self {
        assert_eq!(samples.len(), rows as usize * columns as usize);
        Self {
            rows,
            columns,
            samples,
        }
    }

    pub fn filled(rows: u16, columns: u16, value: u16) -> Self {
        Self::new(rows, columns, vec![value; rows as usize * columns as usize])
    }
}

/// A DICOM file to be written by a test.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub uid: Option<String>,
    pub series_uid: String,
    pub study_uid: String,
    pub elements: Vec<(Tag, VR, PrimitiveValue)>,
    pub pixels: Option<Pixels>,
}

impl Fixture {
    pub fn new(uid: &str) -> Self {
        Self {
            uid: Some(uid.to_string()),
            ..Self::anonymous()
        }
    }

    pub fn anonymous() -> Self {
        Self {
            uid: None,
            series_uid: "1.2.3.1".to_string(),
            study_uid: "1.2.3".to_string(),
            elements: Vec::new(),
            pixels: None,
        }
    }

    pub fn series(mut self, series_uid: &str) -> Self {
        self.series_uid = series_uid.to_string();
        self
    }

    pub fn element(mut self, tag: Tag, vr: VR, value: PrimitiveValue) -> Self {
        self.elements.push((tag, vr, value));
        self
    }

    pub fn text(self, tag: Tag, vr: VR, value: &str) -> Self {
        self.element(tag, vr, PrimitiveValue::from(value))
    }

    pub fn patient_name(self, name: &str) -> Self {
        self.text(tags::PATIENT_NAME, VR::PN, name)
    }

    pub fn rescale(self, slope: &str, intercept: &str) -> Self {
        self.text(tags::RESCALE_SLOPE, VR::DS, slope)
            .text(tags::RESCALE_INTERCEPT, VR::DS, intercept)
    }

    pub fn window(self, center: &str, width: &str) -> Self {
        self.text(tags::WINDOW_CENTER, VR::DS, center)
            .text(tags::WINDOW_WIDTH, VR::DS, width)
    }

    pub fn pixels(mut self, pixels: Pixels) -> Self {
        self.pixels = Some(pixels);
        self
    }

    pub fn to_object(&self) -> InMemDicomObject {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(SECONDARY_CAPTURE),
        ));
        if let Some(uid) = &self.uid {
            obj.put(DataElement::new(
                tags::SOP_INSTANCE_UID,
                VR::UI,
                PrimitiveValue::from(uid.as_str()),
            ));
        }
        obj.put(DataElement::new(
            tags::STUDY_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(self.study_uid.as_str()),
        ));
        obj.put(DataElement::new(
            tags::SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(self.series_uid.as_str()),
        ));
        obj.put(DataElement::new(
            tags::MODALITY,
            VR::CS,
            PrimitiveValue::from("OT"),
        ));
        for (tag, vr, value) in &self.elements {
            obj.put(DataElement::new(*tag, *vr, value.clone()));
        }

        if let Some(pixels) = &self.pixels {
            let us = |tag: Tag, value: u16| DataElement::new(tag, VR::US, PrimitiveValue::from(value));
            obj.put(us(tags::SAMPLES_PER_PIXEL, 1));
            obj.put(DataElement::new(
                tags::PHOTOMETRIC_INTERPRETATION,
                VR::CS,
                PrimitiveValue::from("MONOCHROME2"),
            ));
            obj.put(us(tags::ROWS, pixels.rows));
            obj.put(us(tags::COLUMNS, pixels.columns));
            obj.put(us(tags::BITS_ALLOCATED, 16));
            obj.put(us(tags::BITS_STORED, 16));
            obj.put(us(tags::HIGH_BIT, 15));
            obj.put(us(tags::PIXEL_REPRESENTATION, 0));
            obj.put(DataElement::new(
                tags::PIXEL_DATA,
                VR::OW,
                PrimitiveValue::U16(pixels.samples.clone().into()),
            ));
        }
        obj
    }

    /// Writes the fixture as a Part 10 file.
    pub fn write(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        let meta = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid(SECONDARY_CAPTURE)
            .media_storage_sop_instance_uid(self.uid.as_deref().unwrap_or("2.25.1"))
            .transfer_syntax(EXPLICIT_VR_LE)
            .build()
            .expect("build file meta");
        self.to_object()
            .with_exact_meta(meta)
            .write_to_file(path)
            .expect("write dicom file");
    }
}

/// Writes each fixture into `dir` as `IM0001.dcm`, `IM0002.dcm`, ...
pub fn write_export(dir: &Path, fixtures: &[Fixture]) -> PathBuf {
    fs::create_dir_all(dir).expect("create export dir");
    for (idx, fixture) in fixtures.iter().enumerate() {
        fixture.write(&dir.join(format!("IM{:04}.dcm", idx + 1)));
    }
    dir.to_path_buf()
}

/// Zips every file under `dir` into `zip_path`, keeping relative paths.
pub fn zip_dir(dir: &Path, zip_path: &Path) {
    let file = fs::File::create(zip_path).expect("create zip");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.expect("walk export dir");
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(dir)
            .expect("relative path")
            .to_string_lossy()
            .replace('\\', "/");
        writer.start_file(name, options).expect("start zip entry");
        writer
            .write_all(&fs::read(entry.path()).expect("read export file"))
            .expect("write zip entry");
    }
    writer.finish().expect("finish zip");
}
