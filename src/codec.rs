//! Pure decode/encode rules for each [`DataType`].
//!
//! The codec is definition-agnostic: it maps raw bytes to [`Value`]s and
//! back, given a data type. Writability checks and registry lookups happen
//! on the session's write path; the codec only validates byte counts and
//! value domains.
//!
//! # Decode
//!
//! [`decode`] interprets exactly `byte_width(data_type)` bytes. Fewer bytes
//! than required, out-of-range packed fields (time, date) and unknown mode
//! codes all fail with [`Ism8Error::Decode`].
//!
//! # Encode
//!
//! [`encode`] is the inverse mapping. A value of the wrong variant or
//! outside the type's representable domain fails with
//! [`Ism8Error::Encode`] and produces no bytes.
//!
//! # Round trip
//!
//! For every type, `decode(encode(v)) == v` for all `v` in the type's valid
//! domain, at the type's declared resolution (0.01 for the KNX float,
//! 100/255 for scalings).
//!
//! # Example
//!
//! ```
//! use wolf_ism8::{codec, DataType, Value};
//!
//! // Captured frame payload for an outside-temperature datapoint: 6.1 °C.
//! let value = codec::decode(178, DataType::Float16, &[0x02, 0x62]).unwrap();
//! assert!((value.as_f64().unwrap() - 6.1).abs() < 0.01);
//!
//! let bytes = codec::encode(1, DataType::Bool, &Value::Bool(true)).unwrap();
//! assert_eq!(bytes, vec![0x01]);
//! ```

use crate::datatype::DataType;
use crate::error::{Ism8Error, Result};
use crate::value::{Date, TimeOfDay, Value};

/// Positive domain limit of the KNX 2-byte float
/// (mantissa 2047 × 2¹⁵ × 0.01).
const FLOAT16_MAX: f64 = 670_760.96;
/// Negative domain limit; two's complement reaches one mantissa step
/// further down (mantissa −2048 × 2¹⁵ × 0.01).
const FLOAT16_MIN: f64 = -671_088.64;

/// Decodes `raw` as a value of `data_type`.
///
/// `id` is carried for error context only. Exactly
/// [`byte_width`](DataType::byte_width) bytes are consumed; surplus bytes
/// are ignored.
///
/// # Errors
///
/// Returns [`Ism8Error::Decode`] if fewer bytes are available than the type
/// requires, if a packed field is out of range, or if a mode code has no
/// documented label.
pub fn decode(id: u16, data_type: DataType, raw: &[u8]) -> Result<Value> {
    let width = data_type.byte_width();
    if raw.len() < width {
        return Err(Ism8Error::decode(
            id,
            format!("need {} bytes for {}, got {}", width, data_type, raw.len()),
        ));
    }
    let raw = &raw[..width];

    match data_type {
        DataType::Bool => Ok(Value::Bool(raw[0] & 0x01 != 0)),
        DataType::Scaling => Ok(Value::Percent(100.0 / 255.0 * f64::from(raw[0]))),
        DataType::Percent => {
            if raw[0] > 100 {
                return Err(Ism8Error::decode(
                    id,
                    format!("percentage {} out of range", raw[0]),
                ));
            }
            Ok(Value::Percent(f64::from(raw[0])))
        }
        DataType::Uint16 => Ok(Value::Integer(i64::from(u16::from_be_bytes([
            raw[0], raw[1],
        ])))),
        DataType::Int16 => Ok(Value::Integer(i64::from(i16::from_be_bytes([
            raw[0], raw[1],
        ])))),
        DataType::Float16 => decode_float16(id, [raw[0], raw[1]]).map(Value::Decimal),
        DataType::Float32 => {
            let bits = f32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
            Ok(Value::Decimal(f64::from(bits)))
        }
        DataType::Int32 => Ok(Value::Integer(i64::from(i32::from_be_bytes([
            raw[0], raw[1], raw[2], raw[3],
        ])))),
        DataType::FlowRate => {
            let counts = i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
            Ok(Value::Decimal(0.0001 * f64::from(counts)))
        }
        DataType::TimeOfDay => {
            let weekday = raw[0] >> 5;
            let hour = raw[0] & 0x1F;
            let (minute, second) = (raw[1], raw[2]);
            if hour > 23 || minute > 59 || second > 59 {
                return Err(Ism8Error::decode(
                    id,
                    format!("time field out of range: {hour:02}:{minute:02}:{second:02}"),
                ));
            }
            Ok(Value::Time(TimeOfDay::new(weekday, hour, minute, second)))
        }
        DataType::Date => {
            let (day, month, offset) = (raw[0], raw[1], raw[2]);
            if day == 0 || day > 31 || month == 0 || month > 12 || offset > 99 {
                return Err(Ism8Error::decode(
                    id,
                    format!("date field out of range: day {day}, month {month}, year {offset}+2000"),
                ));
            }
            Ok(Value::Date(Date::new(day, month, 2000 + u16::from(offset))))
        }
        DataType::HvacMode | DataType::HvacModeCwl | DataType::DhwMode | DataType::HvacControlMode => {
            match data_type.mode_label(raw[0]) {
                Some(label) => Ok(Value::Mode(label)),
                None => Err(Ism8Error::decode(
                    id,
                    format!("mode number {} not implemented for {}", raw[0], data_type),
                )),
            }
        }
    }
}

/// Encodes `value` as `data_type` bytes for transmission.
///
/// # Errors
///
/// Returns [`Ism8Error::Encode`] if the value is of the wrong variant for
/// the type or outside its representable domain. Nothing is produced on
/// failure.
pub fn encode(id: u16, data_type: DataType, value: &Value) -> Result<Vec<u8>> {
    match (data_type, value) {
        (DataType::Bool, Value::Bool(b)) => Ok(vec![u8::from(*b)]),
        (DataType::Scaling, Value::Percent(p)) => {
            check_range(id, *p, 0.0, 100.0)?;
            Ok(vec![(*p * 255.0 / 100.0).round() as u8])
        }
        (DataType::Percent, Value::Percent(p)) => {
            check_range(id, *p, 0.0, 100.0)?;
            Ok(vec![p.round() as u8])
        }
        (DataType::Uint16, Value::Integer(i)) => {
            let v = u16::try_from(*i)
                .map_err(|_| Ism8Error::encode(id, format!("{i} out of range for Uint16")))?;
            Ok(v.to_be_bytes().to_vec())
        }
        (DataType::Int16, Value::Integer(i)) => {
            let v = i16::try_from(*i)
                .map_err(|_| Ism8Error::encode(id, format!("{i} out of range for Int16")))?;
            Ok(v.to_be_bytes().to_vec())
        }
        (DataType::Float16, Value::Decimal(d)) => encode_float16(id, *d).map(|b| b.to_vec()),
        (DataType::Float32, Value::Decimal(d)) => {
            if !d.is_finite() {
                return Err(Ism8Error::encode(id, "value is not finite"));
            }
            Ok((*d as f32).to_be_bytes().to_vec())
        }
        (DataType::Int32, Value::Integer(i)) => {
            let v = i32::try_from(*i)
                .map_err(|_| Ism8Error::encode(id, format!("{i} out of range for Int32")))?;
            Ok(v.to_be_bytes().to_vec())
        }
        (DataType::FlowRate, Value::Decimal(d)) => {
            if !d.is_finite() {
                return Err(Ism8Error::encode(id, "value is not finite"));
            }
            let counts = (*d * 10_000.0).round();
            if counts < f64::from(i32::MIN) || counts > f64::from(i32::MAX) {
                return Err(Ism8Error::encode(id, format!("{d} m³/h out of range")));
            }
            Ok((counts as i32).to_be_bytes().to_vec())
        }
        (DataType::TimeOfDay, Value::Time(t)) => {
            if t.weekday > 7 || t.hour > 23 || t.minute > 59 || t.second > 59 {
                return Err(Ism8Error::encode(
                    id,
                    format!("time field out of range: {t} (weekday {})", t.weekday),
                ));
            }
            Ok(vec![(t.weekday << 5) | t.hour, t.minute, t.second])
        }
        (DataType::Date, Value::Date(d)) => {
            if d.day == 0 || d.day > 31 || d.month == 0 || d.month > 12 {
                return Err(Ism8Error::encode(id, format!("invalid date {d}")));
            }
            if !(2000..=2099).contains(&d.year) {
                return Err(Ism8Error::encode(
                    id,
                    format!("year {} outside 2000-2099", d.year),
                ));
            }
            Ok(vec![d.day, d.month, (d.year - 2000) as u8])
        }
        (ty, Value::Mode(label)) if ty.is_mode() => match ty.mode_code(label) {
            Some(code) => Ok(vec![code]),
            None => Err(Ism8Error::encode(
                id,
                format!("mode \"{label}\" not available for {ty}"),
            )),
        },
        (ty, v) => Err(Ism8Error::encode(
            id,
            format!("value {v:?} does not match data type {ty}"),
        )),
    }
}

fn check_range(id: u16, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(Ism8Error::encode(
            id,
            format!("{value} outside {min}..={max}"),
        ));
    }
    Ok(())
}

/// Decodes a KNX 2-byte float: sign and 11-bit two's-complement mantissa
/// in the low bits, 4-bit exponent in the high nibble, 0.01 resolution.
fn decode_float16(id: u16, raw: [u8; 2]) -> Result<f64> {
    let word = u16::from_be_bytes(raw);
    let mantissa = word & 0x07FF;
    // All mantissa bits set marks invalid data per the Wolf specification.
    if mantissa == 0x07FF {
        return Err(Ism8Error::decode(id, "invalid-data marker in KNX float"));
    }
    let exponent = (word >> 11) & 0x0F;
    let mantissa = if word & 0x8000 != 0 {
        i32::from(mantissa) - 0x0800
    } else {
        i32::from(mantissa)
    };
    Ok(0.01 * f64::from(mantissa) * f64::from(1u32 << exponent))
}

fn encode_float16(id: u16, value: f64) -> Result<[u8; 2]> {
    if !value.is_finite() || !(FLOAT16_MIN..=FLOAT16_MAX).contains(&value) {
        return Err(Ism8Error::encode(
            id,
            format!("{value} not representable as KNX float"),
        ));
    }
    let centi = (value * 100.0).round();
    let mut exponent = 0u16;
    while !(-2048.0..=2047.0).contains(&(centi / f64::from(1u32 << exponent)).round()) {
        exponent += 1;
    }
    let mut mantissa = (centi / f64::from(1u32 << exponent)).round() as i32;
    // Low 11 bits all ones would collide with the invalid-data marker;
    // move to the nearest neighbour that stays within one step.
    if mantissa == 2047 {
        if exponent < 15 {
            exponent += 1;
            mantissa = (centi / f64::from(1u32 << exponent)).round() as i32;
        } else {
            mantissa = 2046;
        }
    } else if mantissa == -1 {
        mantissa = -2;
    }
    let mut word = (exponent << 11) | ((mantissa as u16) & 0x07FF);
    // Sign follows the rounded mantissa: -0.004 rounds to plain zero.
    if mantissa < 0 {
        word |= 0x8000;
    }
    Ok(word.to_be_bytes())
}
