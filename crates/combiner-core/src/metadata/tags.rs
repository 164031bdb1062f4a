use exif::{Context, Tag};

/// The image file directory a tag lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ifd {
    /// IFD0, the primary image directory.
    Primary,
    /// The Exif sub-IFD (pointer tag 0x8769).
    Exif,
    /// The GPS sub-IFD (pointer tag 0x8825).
    Gps,
}

impl Ifd {
    fn context(self) -> Context {
        match self {
            Self::Primary => Context::Tiff,
            Self::Exif => Context::Exif,
            Self::Gps => Context::Gps,
        }
    }
}

/// EXIF field type a tag is written with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    Undefined,
}

/// A metadata field eligible for copying from a source image to a composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MetadataTag {
    pub name: &'static str,
    pub ifd: Ifd,
    pub id: u16,
    pub kind: ValueKind,
}

const fn tag(name: &'static str, ifd: Ifd, id: u16, kind: ValueKind) -> MetadataTag {
    MetadataTag {
        name,
        ifd,
        id,
        kind,
    }
}

use Ifd::{Exif, Gps, Primary};
use ValueKind::{Ascii, Byte, Long, Rational, Short, Undefined};

/// Every copyable tag, in copy order.
pub const ALLOW_LIST: &[MetadataTag] = &[
    // Primary image: dimensions, camera, orientation, timestamp
    tag("ImageWidth", Primary, 0x0100, Long),
    tag("ImageLength", Primary, 0x0101, Long),
    tag("Make", Primary, 0x010F, Ascii),
    tag("Model", Primary, 0x0110, Ascii),
    tag("Orientation", Primary, 0x0112, Short),
    tag("DateTime", Primary, 0x0132, Ascii),
    // Exif: exposure triad, flash, focal length, timestamps, pixel dimensions
    tag("ExposureTime", Exif, 0x829A, Rational),
    tag("FNumber", Exif, 0x829D, Rational),
    tag("PhotographicSensitivity", Exif, 0x8827, Short),
    tag("DateTimeOriginal", Exif, 0x9003, Ascii),
    tag("DateTimeDigitized", Exif, 0x9004, Ascii),
    tag("Flash", Exif, 0x9209, Short),
    tag("FocalLength", Exif, 0x920A, Rational),
    tag("SubSecTime", Exif, 0x9290, Ascii),
    tag("SubSecTimeOriginal", Exif, 0x9291, Ascii),
    tag("SubSecTimeDigitized", Exif, 0x9292, Ascii),
    tag("PixelXDimension", Exif, 0xA002, Long),
    tag("PixelYDimension", Exif, 0xA003, Long),
    // GPS: the whole group
    tag("GPSVersionID", Gps, 0x0000, Byte),
    tag("GPSLatitudeRef", Gps, 0x0001, Ascii),
    tag("GPSLatitude", Gps, 0x0002, Rational),
    tag("GPSLongitudeRef", Gps, 0x0003, Ascii),
    tag("GPSLongitude", Gps, 0x0004, Rational),
    tag("GPSAltitudeRef", Gps, 0x0005, Byte),
    tag("GPSAltitude", Gps, 0x0006, Rational),
    tag("GPSTimeStamp", Gps, 0x0007, Rational),
    tag("GPSSatellites", Gps, 0x0008, Ascii),
    tag("GPSStatus", Gps, 0x0009, Ascii),
    tag("GPSMeasureMode", Gps, 0x000A, Ascii),
    tag("GPSDOP", Gps, 0x000B, Rational),
    tag("GPSSpeedRef", Gps, 0x000C, Ascii),
    tag("GPSSpeed", Gps, 0x000D, Rational),
    tag("GPSTrackRef", Gps, 0x000E, Ascii),
    tag("GPSTrack", Gps, 0x000F, Rational),
    tag("GPSImgDirectionRef", Gps, 0x0010, Ascii),
    tag("GPSImgDirection", Gps, 0x0011, Rational),
    tag("GPSMapDatum", Gps, 0x0012, Ascii),
    tag("GPSDestLatitudeRef", Gps, 0x0013, Ascii),
    tag("GPSDestLatitude", Gps, 0x0014, Rational),
    tag("GPSDestLongitudeRef", Gps, 0x0015, Ascii),
    tag("GPSDestLongitude", Gps, 0x0016, Rational),
    tag("GPSDestBearingRef", Gps, 0x0017, Ascii),
    tag("GPSDestBearing", Gps, 0x0018, Rational),
    tag("GPSDestDistanceRef", Gps, 0x0019, Ascii),
    tag("GPSDestDistance", Gps, 0x001A, Rational),
    tag("GPSProcessingMethod", Gps, 0x001B, Undefined),
    tag("GPSAreaInformation", Gps, 0x001C, Undefined),
    tag("GPSDateStamp", Gps, 0x001D, Ascii),
    tag("GPSDifferential", Gps, 0x001E, Short),
];

impl MetadataTag {
    /// Look up an allow-listed tag by its EXIF name.
    pub fn named(name: &str) -> Option<MetadataTag> {
        ALLOW_LIST.iter().copied().find(|t| t.name == name)
    }

    /// Look up an allow-listed tag by directory and numeric id.
    pub fn lookup(ifd: Ifd, id: u16) -> Option<MetadataTag> {
        ALLOW_LIST
            .iter()
            .copied()
            .find(|t| t.ifd == ifd && t.id == id)
    }

    /// The `exif` crate tag for this field.
    pub fn exif_tag(&self) -> Tag {
        Tag(self.ifd.context(), self.id)
    }

    fn position(&self) -> usize {
        ALLOW_LIST
            .iter()
            .position(|t| t.ifd == self.ifd && t.id == self.id)
            .unwrap_or(usize::MAX)
    }
}

impl std::fmt::Display for MetadataTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Allow-listed tags and their string values, kept in allow-list order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataSet {
    entries: Vec<(MetadataTag, String)>,
}

impl MetadataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a tag's value, replacing any previous value.
    pub fn insert(&mut self, tag: MetadataTag, value: impl Into<String>) {
        let value = value.into();
        match self
            .entries
            .binary_search_by_key(&tag.position(), |(t, _)| t.position())
        {
            Ok(i) => self.entries[i].1 = value,
            Err(i) => self.entries.insert(i, (tag, value)),
        }
    }

    pub fn get(&self, tag: MetadataTag) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t.ifd == tag.ifd && t.id == tag.id)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the allow-listed tag called `name`.
    pub fn get_named(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t.name == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetadataTag, &str)> {
        self.entries.iter().map(|(t, v)| (*t, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
