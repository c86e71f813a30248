//! Named-slot operator registry
//!
//! Operators are invoked the way a training framework invokes them: inputs
//! and outputs are bound to named slots (`X`, `Scale`, `Y@GRAD`, ...) and
//! scalar settings travel as attributes. The registry is an ordinary value;
//! there is no process-wide instance.

use crate::{AnyTensor, Result, TensorError};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// Attribute values
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl AttrValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Bool(_) => "bool",
            AttrValue::String(_) => "string",
        }
    }
}

/// Attribute map passed to an operator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpAttrs {
    attrs: BTreeMap<String, AttrValue>,
}

impl OpAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: AttrValue) -> Self {
        self.attrs.insert(name.to_string(), value);
        self
    }

    pub fn insert(&mut self, name: &str, value: AttrValue) {
        self.attrs.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// Float attribute, `default` when absent, an error when of another type
    pub fn float_or(&self, operation: &str, name: &str, default: f64) -> Result<f64> {
        match self.attrs.get(name) {
            None => Ok(default),
            Some(AttrValue::Float(v)) => Ok(*v),
            Some(other) => Err(TensorError::invalid_argument(
                operation,
                format!(
                    "attribute '{name}' must be a float, got {}",
                    other.type_name()
                ),
            )),
        }
    }
}

/// Tensors bound to named slots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedTensors {
    slots: BTreeMap<String, AnyTensor>,
}

impl NamedTensors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: &str, tensor: impl Into<AnyTensor>) -> Self {
        self.insert(slot, tensor);
        self
    }

    pub fn insert(&mut self, slot: &str, tensor: impl Into<AnyTensor>) {
        self.slots.insert(slot.to_string(), tensor.into());
    }

    pub fn get(&self, slot: &str) -> Option<&AnyTensor> {
        self.slots.get(slot)
    }

    /// Look up a slot the operator cannot run without
    pub fn require(&self, operation: &str, slot: &str) -> Result<&AnyTensor> {
        self.slots.get(slot).ok_or_else(|| {
            TensorError::invalid_argument(operation, format!("missing required input '{slot}'"))
        })
    }

    pub fn remove(&mut self, slot: &str) -> Option<AnyTensor> {
        self.slots.remove(slot)
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    pub fn names(&self) -> Vec<&str> {
        self.slots.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Argument (slot) definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgDef {
    pub name: &'static str,
    pub doc: &'static str,
}

/// Attribute definition
#[derive(Debug, Clone, PartialEq)]
pub struct AttrDef {
    pub name: &'static str,
    pub default: Option<AttrValue>,
    pub doc: &'static str,
}

/// Kernel entry point bound to an operator
pub type OpKernel = fn(&NamedTensors, &OpAttrs) -> Result<NamedTensors>;

/// Metadata and kernel for an operator
#[derive(Debug, Clone)]
pub struct OpDef {
    pub name: &'static str,
    pub inputs: Vec<ArgDef>,
    pub outputs: Vec<ArgDef>,
    pub attrs: Vec<AttrDef>,
    /// Name of the gradient operator, if differentiable
    pub grad_op: Option<&'static str>,
    pub kernel: OpKernel,
}

impl OpDef {
    pub fn input_names(&self) -> Vec<&'static str> {
        self.inputs.iter().map(|a| a.name).collect()
    }

    pub fn output_names(&self) -> Vec<&'static str> {
        self.outputs.iter().map(|a| a.name).collect()
    }
}

/// Operator registry
#[derive(Debug, Clone, Default)]
pub struct OpRegistry {
    ops: HashMap<&'static str, OpDef>,
}

impl OpRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every operator this crate ships
    pub fn with_builtin_ops() -> Self {
        let mut registry = Self::new();
        for def in crate::ops::normalization::op::op_defs() {
            registry.ops.insert(def.name, def);
        }
        registry
    }

    pub fn register(&mut self, def: OpDef) -> Result<()> {
        if self.ops.contains_key(def.name) {
            return Err(TensorError::invalid_argument(
                "register_op",
                format!("operator '{}' is already registered", def.name),
            ));
        }
        self.ops.insert(def.name, def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OpDef> {
        self.ops.get(name)
    }

    /// Sorted operator names
    pub fn list_ops(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.ops.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Run an operator and return every output slot
    pub fn run(&self, name: &str, inputs: &NamedTensors, attrs: &OpAttrs) -> Result<NamedTensors> {
        self.run_with_no_grad(name, inputs, attrs, &[])
    }

    /// Run an operator, dropping the output slots listed in `no_grad`
    pub fn run_with_no_grad(
        &self,
        name: &str,
        inputs: &NamedTensors,
        attrs: &OpAttrs,
        no_grad: &[&str],
    ) -> Result<NamedTensors> {
        let def = self.ops.get(name).ok_or_else(|| {
            TensorError::invalid_argument(
                "run_op",
                format!("unknown operator '{name}', registered: {:?}", self.list_ops()),
            )
        })?;

        for arg in &def.inputs {
            inputs.require(def.name, arg.name)?;
        }
        for slot in no_grad {
            if !def.outputs.iter().any(|a| a.name == *slot) {
                return Err(TensorError::invalid_argument(
                    def.name,
                    format!(
                        "'{slot}' is not an output, expected one of {:?}",
                        def.output_names()
                    ),
                ));
            }
        }

        trace!(op = def.name, inputs = ?inputs.names(), "dispatching operator");
        let mut outputs = (def.kernel)(inputs, attrs)?;
        for slot in no_grad {
            outputs.remove(slot);
        }
        Ok(outputs)
    }
}
