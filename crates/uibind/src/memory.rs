use std::collections::BTreeMap;

use serde::Serialize;

use crate::host::EffectRuntime;
use crate::types::{ElementFormat, UniformShape};

/// Handle of a uniform declared on a [`MemoryRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableId(usize);

/// A uniform variable as the host would describe it.
#[derive(Debug, Clone)]
pub struct UniformDecl {
    pub name: String,
    pub effect: String,
    pub format: ElementFormat,
    pub shape: UniformShape,
    pub annotations: BTreeMap<String, String>,
}

impl UniformDecl {
    pub fn new(
        name: impl Into<String>,
        effect: impl Into<String>,
        format: ElementFormat,
        shape: UniformShape,
    ) -> Self {
        Self {
            name: name.into(),
            effect: effect.into(),
            format,
            shape,
            annotations: BTreeMap::new(),
        }
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

/// One `set_preprocessor_definition` call received by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub key: String,
    pub value: String,
}

/// Host stand-in keeping declared uniforms and the definition table in memory.
#[derive(Debug)]
pub struct MemoryRuntime {
    variables: Vec<UniformDecl>,
    effects_loaded: bool,
    definitions: BTreeMap<(Option<String>, String), String>,
    calls: Vec<DefinitionCall>,
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            effects_loaded: true,
            definitions: BTreeMap::new(),
            calls: Vec::new(),
        }
    }
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, decl: UniformDecl) -> VariableId {
        self.variables.push(decl);
        VariableId(self.variables.len() - 1)
    }

    pub fn find(&self, name: &str) -> Option<VariableId> {
        self.variables
            .iter()
            .position(|decl| decl.name == name)
            .map(VariableId)
    }

    pub fn variable(&self, id: VariableId) -> Option<&UniformDecl> {
        self.variables.get(id.0)
    }

    pub fn set_effects_loaded(&mut self, loaded: bool) {
        self.effects_loaded = loaded;
    }

    /// Current value of a definition, as left by the last call for it.
    pub fn definition(&self, scope: Option<&str>, key: &str) -> Option<&str> {
        self.definitions
            .get(&(scope.map(str::to_string), key.to_string()))
            .map(String::as_str)
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Current definition table, ordered by scope then key.
    pub fn definition_table(&self) -> Vec<DefinitionCall> {
        self.definitions
            .iter()
            .map(|((scope, key), value)| DefinitionCall {
                scope: scope.clone(),
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }

    /// Every definition call received so far, oldest first.
    pub fn calls(&self) -> &[DefinitionCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DefinitionCall> {
        std::mem::take(&mut self.calls)
    }
}

impl EffectRuntime for MemoryRuntime {
    type Variable = VariableId;

    fn annotation(&self, variable: VariableId, key: &str) -> Option<String> {
        self.variable(variable)?.annotations.get(key).cloned()
    }

    fn uniform_type(&self, variable: VariableId) -> (ElementFormat, UniformShape) {
        self.variable(variable)
            .map(|decl| (decl.format, decl.shape))
            .unwrap_or_default()
    }

    fn effect_name(&self, variable: VariableId) -> String {
        self.variable(variable)
            .map(|decl| decl.effect.clone())
            .unwrap_or_default()
    }

    fn effects_loaded(&self) -> bool {
        self.effects_loaded
    }

    fn set_preprocessor_definition(&mut self, scope: Option<&str>, key: &str, value: &str) {
        let scope = scope.map(str::to_string);
        self.definitions
            .insert((scope.clone(), key.to_string()), value.to_string());
        self.calls.push(DefinitionCall {
            scope,
            key: key.to_string(),
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_declared_variables() {
        let mut runtime = MemoryRuntime::new();
        let id = runtime.declare(
            UniformDecl::new("Tint", "Tint.fx", ElementFormat::Float, UniformShape::new(1, 3))
                .with_annotation("ui_bind", "TINT"),
        );
        assert_eq!(runtime.find("Tint"), Some(id));
        assert_eq!(runtime.find("Other"), None);
        assert_eq!(runtime.annotation(id, "ui_bind").as_deref(), Some("TINT"));
        assert_eq!(runtime.annotation(id, "ui_label"), None);
        assert_eq!(runtime.effect_name(id), "Tint.fx");
        assert_eq!(
            runtime.uniform_type(id),
            (ElementFormat::Float, UniformShape::new(1, 3))
        );
    }

    #[test]
    fn later_definitions_replace_earlier_ones() {
        let mut runtime = MemoryRuntime::new();
        runtime.set_preprocessor_definition(Some("A.fx"), "KEY", "1");
        runtime.set_preprocessor_definition(Some("A.fx"), "KEY", "2");
        runtime.set_preprocessor_definition(None, "KEY", "3");
        assert_eq!(runtime.definition(Some("A.fx"), "KEY"), Some("2"));
        assert_eq!(runtime.definition(None, "KEY"), Some("3"));
        assert_eq!(runtime.definition_count(), 2);
        assert_eq!(runtime.calls().len(), 3);
        assert_eq!(runtime.take_calls().len(), 3);
        assert!(runtime.calls().is_empty());
    }
}
