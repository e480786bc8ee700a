//! Text rendering for decoded uniform lanes.
//!
//! Rendered values are plain comma separated scalars so they can be dropped
//! into a preprocessor definition and expanded inside an initializer list,
//! e.g. `float3(TINT_COLOR)`.

use bindconfig::{BoolStyle, LaneOrder};
use tracing::trace;

use crate::decode::{LaneValue, UniformSnapshot};
use crate::types::MAX_DIMENSION;

/// Separator placed between lanes.
pub const LANE_SEPARATOR: &str = ",";

/// Lane options used when rendering a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextFormat {
    pub lane_order: LaneOrder,
    pub bool_style: BoolStyle,
}

impl TextFormat {
    pub fn new(lane_order: LaneOrder, bool_style: BoolStyle) -> Self {
        Self {
            lane_order,
            bool_style,
        }
    }
}

/// Index into the lane store for matrix element (`row`, `column`).
pub fn lane_index(order: LaneOrder, row: u32, column: u32, columns: u32) -> usize {
    match order {
        LaneOrder::RowMajor => (row * columns + column) as usize,
        LaneOrder::ColumnMajor => (column * MAX_DIMENSION + row) as usize,
    }
}

/// Renders one lane.
pub fn format_lane(lane: LaneValue, bool_style: BoolStyle) -> String {
    match lane {
        LaneValue::Bool(value) => match (bool_style, value) {
            (BoolStyle::Numeric, true) => "1".to_string(),
            (BoolStyle::Numeric, false) => "0".to_string(),
            (BoolStyle::Words, true) => "true".to_string(),
            (BoolStyle::Words, false) => "false".to_string(),
        },
        LaneValue::Int(value) => value.to_string(),
        LaneValue::Uint(value) => value.to_string(),
        LaneValue::Float(value) => format_scientific(value),
        LaneValue::Unknown => "0".to_string(),
    }
}

/// Formats `value` like C's `%.8e`: one integral digit, eight fraction digits
/// and a signed exponent of at least two digits.
pub fn format_scientific(value: f32) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() {
            "-inf".to_string()
        } else {
            "inf".to_string()
        };
    }

    let rendered = format!("{value:.8e}");
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        return rendered;
    };
    let exponent: i32 = match exponent.parse() {
        Ok(exponent) => exponent,
        Err(_) => return rendered,
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

/// Renders every lane of `snapshot` joined by [`LANE_SEPARATOR`], rows outer
/// and columns inner.
pub fn render(snapshot: &UniformSnapshot, format: TextFormat) -> String {
    let shape = snapshot.shape();
    let mut lanes = Vec::with_capacity(shape.lane_count());
    for row in 0..shape.rows {
        for column in 0..shape.columns {
            let index = lane_index(format.lane_order, row, column, shape.columns);
            lanes.push(format_lane(snapshot.lane(index), format.bool_style));
        }
    }

    let text = lanes.join(LANE_SEPARATOR);
    trace!(rows = shape.rows, columns = shape.columns, %text, "rendered uniform lanes");
    text
}
