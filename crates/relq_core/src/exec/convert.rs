//! Scalar value conversion toward a declared field kind.

use relq_driver::{ScalarKind, ScalarValue};

use crate::error::{CoreError, CoreResult};

/// Converts `value` to `kind`.
///
/// Nulls collapse to the kind's default (0, 0.0, empty text, empty blob,
/// false). Exact matches pass through. Otherwise a best-effort primitive
/// conversion applies: integer and real interconvert, booleans map to 0/1,
/// and text parses to or formats from numbers and booleans. Blobs never
/// convert.
pub(crate) fn to_kind(value: ScalarValue, kind: ScalarKind) -> CoreResult<ScalarValue> {
    let Some(from) = value.kind() else {
        return Ok(ScalarValue::default_for(kind));
    };
    if from == kind {
        return Ok(value);
    }

    let converted = match (&value, kind) {
        (ScalarValue::Integer(i), ScalarKind::Real) => Some(ScalarValue::Real(*i as f64)),
        (ScalarValue::Real(r), ScalarKind::Integer) => Some(ScalarValue::Integer(*r as i64)),
        (ScalarValue::Bool(b), ScalarKind::Integer) => Some(ScalarValue::Integer(i64::from(*b))),
        (ScalarValue::Integer(i), ScalarKind::Bool) => Some(ScalarValue::Bool(*i != 0)),
        (ScalarValue::Integer(i), ScalarKind::Text) => Some(ScalarValue::Text(i.to_string())),
        (ScalarValue::Real(r), ScalarKind::Text) => Some(ScalarValue::Text(r.to_string())),
        (ScalarValue::Bool(b), ScalarKind::Text) => Some(ScalarValue::Text(b.to_string())),
        (ScalarValue::Text(t), ScalarKind::Integer) => {
            t.trim().parse::<i64>().ok().map(ScalarValue::Integer)
        }
        (ScalarValue::Text(t), ScalarKind::Real) => {
            t.trim().parse::<f64>().ok().map(ScalarValue::Real)
        }
        (ScalarValue::Text(t), ScalarKind::Bool) => match t.trim() {
            "1" => Some(ScalarValue::Bool(true)),
            "0" => Some(ScalarValue::Bool(false)),
            other => other.parse::<bool>().ok().map(ScalarValue::Bool),
        },
        _ => None,
    };

    converted.ok_or_else(|| CoreError::conversion(from.to_string(), kind.to_string()))
}
