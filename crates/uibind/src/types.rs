use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of 32-bit lanes a single uniform snapshot can hold (a 4x4 matrix).
pub const LANE_COUNT: usize = 16;

/// Byte width of every lane; min16 formats are stored at full 32-bit stride.
pub const LANE_STRIDE: usize = 4;

/// Largest row or column count addressable inside [`LANE_COUNT`] lanes.
pub const MAX_DIMENSION: u32 = 4;

/// Element format reported by the host for a uniform variable.
///
/// The names follow the effect language's scalar types; the aliases accept the
/// host's texture-format spelling for the same element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementFormat {
    #[serde(alias = "r32_typeless")]
    Bool,
    #[serde(alias = "r16_sint")]
    Min16Int,
    #[serde(alias = "r32_sint")]
    Int,
    #[serde(alias = "r16_uint")]
    Min16Uint,
    #[serde(alias = "r32_uint")]
    Uint,
    #[serde(alias = "r16_float")]
    Min16Float,
    #[serde(alias = "r32_float")]
    Float,
    #[default]
    Unknown,
}

/// Scalar type a lane is decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Bool,
    Int,
    Uint,
    Float,
    Unknown,
}

impl ElementFormat {
    pub fn base_type(self) -> BaseType {
        match self {
            ElementFormat::Bool => BaseType::Bool,
            ElementFormat::Min16Int | ElementFormat::Int => BaseType::Int,
            ElementFormat::Min16Uint | ElementFormat::Uint => BaseType::Uint,
            ElementFormat::Min16Float | ElementFormat::Float => BaseType::Float,
            ElementFormat::Unknown => BaseType::Unknown,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ElementFormat::Bool => "bool",
            ElementFormat::Min16Int => "min16int",
            ElementFormat::Int => "int",
            ElementFormat::Min16Uint => "min16uint",
            ElementFormat::Uint => "uint",
            ElementFormat::Min16Float => "min16float",
            ElementFormat::Float => "float",
            ElementFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ElementFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "bool" | "r32_typeless" => Ok(ElementFormat::Bool),
            "min16int" | "r16_sint" => Ok(ElementFormat::Min16Int),
            "int" | "r32_sint" => Ok(ElementFormat::Int),
            "min16uint" | "r16_uint" => Ok(ElementFormat::Min16Uint),
            "uint" | "r32_uint" => Ok(ElementFormat::Uint),
            "min16float" | "r16_float" => Ok(ElementFormat::Min16Float),
            "float" | "r32_float" => Ok(ElementFormat::Float),
            "unknown" => Ok(ElementFormat::Unknown),
            other => Err(format!(
                "unknown element format '{other}'; expected bool, int, uint, float or their min16 forms"
            )),
        }
    }
}

/// Rows, columns and array length of a uniform variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UniformShape {
    pub rows: u32,
    pub columns: u32,
    #[serde(default)]
    pub array_length: u32,
}

impl UniformShape {
    pub fn new(rows: u32, columns: u32) -> Self {
        Self {
            rows,
            columns,
            array_length: 0,
        }
    }

    pub fn scalar() -> Self {
        Self::new(1, 1)
    }

    pub fn with_array_length(mut self, array_length: u32) -> Self {
        self.array_length = array_length;
        self
    }

    pub fn is_array(&self) -> bool {
        self.array_length > 0
    }

    /// True when every lane of the shape fits in a single snapshot.
    pub fn fits_snapshot(&self) -> bool {
        self.rows <= MAX_DIMENSION && self.columns <= MAX_DIMENSION
    }

    pub fn lane_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min16_formats_share_base_type() {
        assert_eq!(ElementFormat::Min16Int.base_type(), BaseType::Int);
        assert_eq!(ElementFormat::Min16Uint.base_type(), BaseType::Uint);
        assert_eq!(ElementFormat::Min16Float.base_type(), BaseType::Float);
        assert_eq!(ElementFormat::Bool.base_type(), BaseType::Bool);
        assert_eq!(ElementFormat::Unknown.base_type(), BaseType::Unknown);
    }

    #[test]
    fn parses_host_format_names() {
        assert_eq!("r32_typeless".parse::<ElementFormat>().unwrap(), ElementFormat::Bool);
        assert_eq!(" Float ".parse::<ElementFormat>().unwrap(), ElementFormat::Float);
        assert_eq!("r16_sint".parse::<ElementFormat>().unwrap(), ElementFormat::Min16Int);
        assert!("double".parse::<ElementFormat>().is_err());
    }

    #[test]
    fn shape_limits() {
        assert!(UniformShape::new(4, 4).fits_snapshot());
        assert!(!UniformShape::new(5, 1).fits_snapshot());
        assert!(UniformShape::scalar().with_array_length(3).is_array());
        assert_eq!(UniformShape::new(3, 2).lane_count(), 6);
    }
}
