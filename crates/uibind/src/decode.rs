use tracing::trace;

use crate::types::{BaseType, ElementFormat, UniformShape, LANE_COUNT};

/// One decoded scalar of a uniform value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaneValue {
    Bool(bool),
    Int(i32),
    Uint(u32),
    Float(f32),
    /// The element format has no text rendering; formatted as a zero placeholder.
    Unknown,
}

/// Up to sixteen 32-bit lanes copied out of a uniform write.
///
/// The raw words are kept untyped, mirroring how the host hands over the
/// bytes; [`UniformSnapshot::lane`] reinterprets a word according to the
/// declared base type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSnapshot {
    words: [u32; LANE_COUNT],
    base_type: BaseType,
    shape: UniformShape,
}

impl UniformSnapshot {
    /// Copies at most `LANE_COUNT * 4` bytes of `bytes` into a zero-filled lane store.
    ///
    /// Returns `None` for array uniforms and for shapes that cannot be
    /// addressed within a single 4x4 snapshot.
    pub fn decode(format: ElementFormat, shape: UniformShape, bytes: &[u8]) -> Option<Self> {
        if shape.is_array() {
            trace!(array_length = shape.array_length, "array uniforms are not rebound");
            return None;
        }
        if !shape.fits_snapshot() {
            trace!(rows = shape.rows, columns = shape.columns, "uniform shape exceeds 4x4");
            return None;
        }

        let mut words = [0u32; LANE_COUNT];
        let storage = bytemuck::bytes_of_mut(&mut words);
        let copied = storage.len().min(bytes.len());
        storage[..copied].copy_from_slice(&bytes[..copied]);

        Some(Self {
            words,
            base_type: format.base_type(),
            shape,
        })
    }

    pub fn shape(&self) -> UniformShape {
        self.shape
    }

    /// Reads lane `index`; indices past the store read as zero.
    pub fn lane(&self, index: usize) -> LaneValue {
        let word = self.words.get(index).copied().unwrap_or(0);
        match self.base_type {
            BaseType::Bool => LaneValue::Bool(word != 0),
            BaseType::Int => LaneValue::Int(word as i32),
            BaseType::Uint => LaneValue::Uint(word),
            BaseType::Float => LaneValue::Float(f32::from_bits(word)),
            BaseType::Unknown => LaneValue::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|value| value.to_ne_bytes()).collect()
    }

    #[test]
    fn rejects_arrays() {
        let shape = UniformShape::new(1, 4).with_array_length(2);
        assert!(UniformSnapshot::decode(ElementFormat::Float, shape, &[0; 32]).is_none());
    }

    #[test]
    fn rejects_oversized_shapes() {
        let shape = UniformShape::new(1, 5);
        assert!(UniformSnapshot::decode(ElementFormat::Float, shape, &[0; 20]).is_none());
    }

    #[test]
    fn zero_fills_short_buffers() {
        let bytes = float_bytes(&[1.5]);
        let snapshot =
            UniformSnapshot::decode(ElementFormat::Float, UniformShape::new(1, 3), &bytes).unwrap();
        assert_eq!(snapshot.lane(0), LaneValue::Float(1.5));
        assert_eq!(snapshot.lane(1), LaneValue::Float(0.0));
        assert_eq!(snapshot.lane(2), LaneValue::Float(0.0));
    }

    #[test]
    fn ignores_bytes_past_sixteen_lanes() {
        let mut bytes = vec![0u8; 80];
        bytes[60..64].copy_from_slice(&7u32.to_ne_bytes());
        bytes[64..68].copy_from_slice(&9u32.to_ne_bytes());
        let snapshot =
            UniformSnapshot::decode(ElementFormat::Uint, UniformShape::new(4, 4), &bytes).unwrap();
        assert_eq!(snapshot.lane(15), LaneValue::Uint(7));
        assert_eq!(snapshot.lane(16), LaneValue::Uint(0));
    }

    #[test]
    fn reinterprets_words_per_base_type() {
        let bytes = (-3i32).to_ne_bytes();
        let shape = UniformShape::scalar();
        let int = UniformSnapshot::decode(ElementFormat::Min16Int, shape, &bytes).unwrap();
        assert_eq!(int.lane(0), LaneValue::Int(-3));
        let uint = UniformSnapshot::decode(ElementFormat::Uint, shape, &bytes).unwrap();
        assert_eq!(uint.lane(0), LaneValue::Uint(u32::MAX - 2));
        let flag = UniformSnapshot::decode(ElementFormat::Bool, shape, &bytes).unwrap();
        assert_eq!(flag.lane(0), LaneValue::Bool(true));
        let unknown = UniformSnapshot::decode(ElementFormat::Unknown, shape, &bytes).unwrap();
        assert_eq!(unknown.lane(0), LaneValue::Unknown);
    }
}
