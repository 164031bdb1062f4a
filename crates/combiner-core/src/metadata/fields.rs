//! EXIF field access on top of the `exif` crate.
//!
//! Values cross the allow-list as text: ASCII verbatim, integers as
//! comma-separated decimals, rationals as `num/den` lists and UNDEFINED as
//! comma-separated byte values.

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Exif, Field, In, Reader, Value};

use crate::error::{CombinerError, Result};

use super::tags::ValueKind;

/// Parse the EXIF block of an encoded image. `None` when it has none.
pub fn read_exif(bytes: &[u8]) -> Result<Option<Exif>> {
    match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(e) => Err(CombinerError::InvalidExif(e.to_string())),
    }
}

/// Primary-image fields that can be written back unchanged.
pub fn writable_fields(block: &Exif) -> Vec<Field> {
    block
        .fields()
        .filter(|f| f.ifd_num == In::PRIMARY && !matches!(f.value, Value::Unknown(..)))
        .map(|f| Field {
            tag: f.tag,
            ifd_num: f.ifd_num,
            value: f.value.clone(),
        })
        .collect()
}

/// Serialize fields as a little-endian TIFF block for an APP1 segment.
///
/// Sub-IFD pointers are generated by the writer.
pub fn write_tiff(fields: &[Field]) -> Result<Vec<u8>> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer
        .write(&mut tiff, true)
        .map_err(|e| CombinerError::InvalidExif(e.to_string()))?;
    Ok(tiff.into_inner())
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Text form of a field value.
///
/// `None` for values that cannot cross as text without changing bytes:
/// unknown types, multi-string ASCII and ASCII that is not UTF-8.
pub fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Ascii(strings) => match strings.as_slice() {
            [single] => String::from_utf8(single.clone()).ok()?,
            _ => return None,
        },
        Value::Byte(v) | Value::Undefined(v, _) => join(v),
        Value::SByte(v) => join(v),
        Value::Short(v) => join(v),
        Value::SShort(v) => join(v),
        Value::Long(v) => join(v),
        Value::SLong(v) => join(v),
        Value::Float(v) => join(v),
        Value::Double(v) => join(v),
        Value::Rational(v) => v
            .iter()
            .map(|r| format!("{}/{}", r.num, r.denom))
            .collect::<Vec<_>>()
            .join(","),
        Value::SRational(v) => v
            .iter()
            .map(|r| format!("{}/{}", r.num, r.denom))
            .collect::<Vec<_>>()
            .join(","),
        _ => return None,
    };
    Some(text)
}

fn split_list<T: std::str::FromStr>(text: &str) -> Option<Vec<T>> {
    text.split(',').map(|s| s.trim().parse().ok()).collect()
}

fn split_ratios(text: &str) -> Option<Vec<exif::Rational>> {
    text.split(',')
        .map(|part| {
            let (num, denom) = part.trim().split_once('/')?;
            Some(exif::Rational {
                num: num.trim().parse().ok()?,
                denom: denom.trim().parse().ok()?,
            })
        })
        .collect()
}

/// Parse the text form of a value as `kind`.
pub fn parse_value(kind: ValueKind, text: &str) -> Result<Value> {
    let invalid = || CombinerError::InvalidExif(format!("'{text}' is not a valid {kind:?}"));
    let value = match kind {
        ValueKind::Ascii => Value::Ascii(vec![text.as_bytes().to_vec()]),
        ValueKind::Byte => Value::Byte(split_list(text).ok_or_else(invalid)?),
        ValueKind::Undefined => Value::Undefined(split_list(text).ok_or_else(invalid)?, 0),
        ValueKind::Short => Value::Short(split_list(text).ok_or_else(invalid)?),
        ValueKind::Long => Value::Long(split_list(text).ok_or_else(invalid)?),
        ValueKind::Rational => Value::Rational(split_ratios(text).ok_or_else(invalid)?),
    };
    Ok(value)
}
