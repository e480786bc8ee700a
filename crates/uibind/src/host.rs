use crate::types::{ElementFormat, UniformShape};

/// Services the overlay host exposes to the binding pipeline.
///
/// `Variable` is whatever handle the host uses to identify a uniform; it is
/// only ever passed back to the host.
pub trait EffectRuntime {
    type Variable: Copy;

    /// Annotation string attached to `variable` under `key`, if present.
    fn annotation(&self, variable: Self::Variable, key: &str) -> Option<String>;

    /// Element format and shape of `variable`.
    fn uniform_type(&self, variable: Self::Variable) -> (ElementFormat, UniformShape);

    /// Name of the effect that declares `variable`.
    fn effect_name(&self, variable: Self::Variable) -> String;

    /// Whether any effect is currently loaded and able to consume definitions.
    fn effects_loaded(&self) -> bool;

    /// Sets a preprocessor definition, scoped to an effect when `scope` is given.
    fn set_preprocessor_definition(&mut self, scope: Option<&str>, key: &str, value: &str);
}
