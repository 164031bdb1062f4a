#![allow(dead_code)]

use std::sync::Mutex;

use exif::{Context, Field, In, Tag, Value};

use combiner_core::buffer::PixelBuffer;
use combiner_core::io::codec::{Encoder, ImageCodec, OutputFormat};
use combiner_core::io::source::{ImageSource, MemorySource};
use combiner_core::metadata::fields::{parse_value, write_tiff};
use combiner_core::metadata::jpeg::replace_exif;
use combiner_core::metadata::MetadataTag;
use combiner_core::pipeline::{ProgressEvent, ProgressReporter};
use combiner_core::stack::Operation;

/// A buffer where every pixel is `[r, g, b, a]`.
pub fn solid(w: u32, h: u32, rgba: [u8; 4]) -> PixelBuffer {
    PixelBuffer::filled(w, h, rgba)
}

/// A buffer whose pixel at (x, y) is `f(x, y)`.
pub fn patterned(w: u32, h: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> PixelBuffer {
    let mut rgba = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            rgba.extend(f(x, y));
        }
    }
    PixelBuffer::from_rgba8(w, h, rgba).expect("buffer size matches dimensions")
}

#[derive(Clone, Debug, PartialEq)]
pub enum Recorded {
    Started(Operation),
    Progress(ProgressEvent),
}

/// Records every callback in order.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<Recorded>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Progress(p) => Some(p),
                Recorded::Started(_) => None,
            })
            .collect()
    }

    pub fn started(&self) -> Vec<Operation> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Started(op) => Some(op),
                Recorded::Progress(_) => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn operation_started(&self, operation: Operation) {
        self.events.lock().unwrap().push(Recorded::Started(operation));
    }

    fn progress(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(Recorded::Progress(*event));
    }
}

pub fn png_bytes(buffer: &PixelBuffer) -> Vec<u8> {
    ImageCodec
        .encode(buffer, OutputFormat::Png, 100)
        .expect("encode png")
}

pub fn jpeg_bytes(buffer: &PixelBuffer) -> Vec<u8> {
    ImageCodec
        .encode(buffer, OutputFormat::Jpeg, 95)
        .expect("encode jpeg")
}

/// Software tag (IFD0 0x0131), present in test sources but not allow-listed.
pub const SOFTWARE_TAG: u16 = 0x0131;

/// Camera-like tags used by the metadata tests.
pub const CAMERA_TAGS: &[(&str, &str)] = &[
    ("Make", "Acme"),
    ("Model", "Burst 100"),
    ("Orientation", "6"),
    ("DateTimeOriginal", "2024:05:01 10:00:00"),
    ("ExposureTime", "1/250"),
    ("FNumber", "28/10"),
    ("Flash", "16"),
    ("GPSVersionID", "2,2,0,0"),
    ("GPSLatitudeRef", "N"),
    ("GPSLatitude", "52/1,30/1,1234/100"),
];

/// A small JPEG carrying the given allow-listed tags plus a Software tag.
pub fn jpeg_with_exif(buffer: &PixelBuffer, tags: &[(&str, &str)]) -> Vec<u8> {
    let mut fields: Vec<Field> = tags
        .iter()
        .map(|(name, text)| {
            let tag = MetadataTag::named(name).expect("allow-listed tag");
            Field {
                tag: tag.exif_tag(),
                ifd_num: In::PRIMARY,
                value: parse_value(tag.kind, text).expect("valid value"),
            }
        })
        .collect();
    fields.push(Field {
        tag: Tag(Context::Tiff, SOFTWARE_TAG),
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![b"Editor 2.0".to_vec()]),
    });
    jpeg_with_fields(buffer, &fields)
}

/// A small JPEG carrying exactly `fields`.
pub fn jpeg_with_fields(buffer: &PixelBuffer, fields: &[Field]) -> Vec<u8> {
    let tiff = write_tiff(fields).expect("write tiff");
    replace_exif(&jpeg_bytes(buffer), &tiff).expect("insert exif")
}

pub fn memory_sources(images: Vec<(&str, Vec<u8>)>) -> Vec<Box<dyn ImageSource>> {
    images
        .into_iter()
        .map(|(name, bytes)| Box::new(MemorySource::new(name, bytes)) as Box<dyn ImageSource>)
        .collect()
}
