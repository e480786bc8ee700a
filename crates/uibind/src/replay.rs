//! Scripted uniform writes replayed against a [`MemoryRuntime`].
//!
//! A script declares the uniforms an effect exposes and the writes issued
//! during each frame. Replaying runs every write through the binding pipeline
//! and closes each frame with a flush, recording the definitions the host
//! would have received.

use std::collections::{BTreeMap, HashSet};

use bindconfig::BindOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::context::{ContextRegistry, FlushOutcome};
use crate::host::EffectRuntime;
use crate::memory::{DefinitionCall, MemoryRuntime, UniformDecl};
use crate::types::{BaseType, ElementFormat, UniformShape, LANE_COUNT, LANE_STRIDE};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to parse replay script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("variable '{0}' is declared more than once")]
    DuplicateVariable(String),
    #[error("a variable of effect '{effect}' has an empty name")]
    EmptyName { effect: String },
    #[error("frame {frame} writes undeclared variable '{name}'")]
    UnknownVariable { frame: usize, name: String },
    #[error("frame {frame} write to '{name}' needs exactly one of `values` or `bytes`")]
    MissingPayload { frame: usize, name: String },
    #[error("write to '{name}' carries {count} values; at most 16 fit in a uniform")]
    TooManyValues { name: String, count: usize },
    #[error("value {index} of write to '{name}' is not a valid {format}: {reason}")]
    InvalidValue {
        name: String,
        index: usize,
        format: ElementFormat,
        reason: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default = "default_effects_loaded")]
    pub effects_loaded: bool,
    #[serde(default)]
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub frames: Vec<FrameSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    #[serde(default)]
    pub effect: String,
    pub format: ElementFormat,
    #[serde(default = "default_dimension")]
    pub rows: u32,
    #[serde(default = "default_dimension")]
    pub columns: u32,
    #[serde(default)]
    pub array_length: u32,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameSpec {
    /// Overrides the loaded-effects state from this frame onwards.
    #[serde(default)]
    pub effects_loaded: Option<bool>,
    #[serde(default)]
    pub writes: Vec<WriteSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteSpec {
    pub variable: String,
    /// One value per lane, interpreted according to the declared format.
    #[serde(default)]
    pub values: Option<Vec<Value>>,
    /// Raw bytes handed over unchanged.
    #[serde(default)]
    pub bytes: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame: usize,
    pub writes: usize,
    /// Triples left queued because no effect was loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred: Option<usize>,
    pub applied: Vec<DefinitionCall>,
    #[serde(skip)]
    pub outcome: FlushOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub frames: Vec<FrameReport>,
    pub definitions: Vec<DefinitionCall>,
}

fn default_effects_loaded() -> bool {
    true
}

fn default_dimension() -> u32 {
    1
}

impl Script {
    pub fn from_json_str(input: &str) -> Result<Self, ReplayError> {
        let script: Script = serde_json::from_str(input)?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<(), ReplayError> {
        let mut seen = HashSet::new();
        for variable in &self.variables {
            if variable.name.trim().is_empty() {
                return Err(ReplayError::EmptyName {
                    effect: variable.effect.clone(),
                });
            }
            if !seen.insert(variable.name.as_str()) {
                return Err(ReplayError::DuplicateVariable(variable.name.clone()));
            }
        }

        for (frame, spec) in self.frames.iter().enumerate() {
            for write in &spec.writes {
                if !seen.contains(write.variable.as_str()) {
                    return Err(ReplayError::UnknownVariable {
                        frame,
                        name: write.variable.clone(),
                    });
                }
                if write.values.is_some() == write.bytes.is_some() {
                    return Err(ReplayError::MissingPayload {
                        frame,
                        name: write.variable.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl VariableSpec {
    fn to_decl(&self) -> UniformDecl {
        let shape = UniformShape::new(self.rows, self.columns).with_array_length(self.array_length);
        let mut decl = UniformDecl::new(&self.name, &self.effect, self.format, shape);
        decl.annotations = self.annotations.clone();
        decl
    }
}

impl WriteSpec {
    /// Bytes handed to the pipeline for this write.
    pub fn encode(&self, format: ElementFormat) -> Result<Vec<u8>, ReplayError> {
        if let Some(bytes) = &self.bytes {
            return Ok(bytes.clone());
        }
        let values = self.values.as_deref().unwrap_or_default();
        if values.len() > LANE_COUNT {
            return Err(ReplayError::TooManyValues {
                name: self.variable.clone(),
                count: values.len(),
            });
        }

        let mut bytes = Vec::with_capacity(values.len() * LANE_STRIDE);
        for (index, value) in values.iter().enumerate() {
            let word = encode_word(format, value).map_err(|reason| ReplayError::InvalidValue {
                name: self.variable.clone(),
                index,
                format,
                reason,
            })?;
            bytes.extend_from_slice(&word.to_ne_bytes());
        }
        Ok(bytes)
    }
}

fn encode_word(format: ElementFormat, value: &Value) -> Result<u32, String> {
    match format.base_type() {
        BaseType::Bool => match value {
            Value::Bool(flag) => Ok(u32::from(*flag)),
            Value::Number(number) => number
                .as_u64()
                .map(|raw| u32::from(raw != 0))
                .ok_or_else(|| format!("expected true/false or 0/1, got {number}")),
            other => Err(format!("expected true/false, got {other}")),
        },
        BaseType::Int => {
            let raw = value
                .as_i64()
                .ok_or_else(|| format!("expected an integer, got {value}"))?;
            i32::try_from(raw)
                .map(|signed| signed as u32)
                .map_err(|_| format!("{raw} is out of range"))
        }
        BaseType::Uint | BaseType::Unknown => {
            let raw = value
                .as_u64()
                .ok_or_else(|| format!("expected a non-negative integer, got {value}"))?;
            u32::try_from(raw).map_err(|_| format!("{raw} is out of range"))
        }
        BaseType::Float => value
            .as_f64()
            .map(|float| (float as f32).to_bits())
            .ok_or_else(|| format!("expected a number, got {value}")),
    }
}

const RUNTIME: u32 = 0;

/// Replays `script`, flushing at the end of every frame.
pub fn replay(script: &Script, options: BindOptions) -> Result<ReplayReport, ReplayError> {
    script.validate()?;

    let mut runtime = MemoryRuntime::new();
    runtime.set_effects_loaded(script.effects_loaded);
    for variable in &script.variables {
        runtime.declare(variable.to_decl());
    }

    let mut registry = ContextRegistry::new(options);
    registry.on_init(RUNTIME);

    let mut frames = Vec::with_capacity(script.frames.len());
    for (index, frame) in script.frames.iter().enumerate() {
        if let Some(loaded) = frame.effects_loaded {
            runtime.set_effects_loaded(loaded);
        }

        for write in &frame.writes {
            let id = runtime
                .find(&write.variable)
                .ok_or_else(|| ReplayError::UnknownVariable {
                    frame: index,
                    name: write.variable.clone(),
                })?;
            let (format, _) = runtime.uniform_type(id);
            let bytes = write.encode(format)?;
            registry.on_uniform_write(RUNTIME, &runtime, id, &bytes);
        }

        let outcome = registry.on_frame_boundary(RUNTIME, &mut runtime);
        let applied = runtime.take_calls();
        debug!(frame = index, writes = frame.writes.len(), ?outcome, "replayed frame");
        frames.push(FrameReport {
            frame: index,
            writes: frame.writes.len(),
            deferred: match outcome {
                FlushOutcome::SkippedNoEffects { pending } => Some(pending),
                _ => None,
            },
            applied,
            outcome,
        });
    }

    registry.on_destroy(RUNTIME);
    let definitions = runtime.definition_table();
    info!(
        frames = frames.len(),
        definitions = definitions.len(),
        "replay finished"
    );
    Ok(ReplayReport {
        frames,
        definitions,
    })
}
