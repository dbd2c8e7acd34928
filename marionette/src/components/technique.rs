use std::{collections::BTreeMap, rc::Rc};

use super::Shader;

/// A vertex and fragment shader pair
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub vertex_shader: Rc<Shader>,
    pub fragment_shader: Rc<Shader>,
    /// Attribute variable names the program expects
    pub attributes: Vec<String>,
}

/// Describes one input of a technique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechniqueParameter {
    /// GL type enum of the parameter, eg. 35676 for a `mat4`
    pub kind: u32,
    /// Built-in value the renderer should supply, eg. `JOINTMATRIX`
    pub semantic: Option<String>,
    /// Node whose transform feeds this parameter
    pub node: Option<String>,
    /// Array length for array parameters
    pub count: Option<usize>,
}

/// How to render a material: the program plus the mapping of shader variables to parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Technique {
    pub name: String,
    pub program: Rc<Program>,
    pub parameters: BTreeMap<String, TechniqueParameter>,
    /// Shader attribute name -> parameter name
    pub attributes: BTreeMap<String, String>,
    /// Shader uniform name -> parameter name
    pub uniforms: BTreeMap<String, String>,
}

impl Technique {
    /// Find the parameter carrying a built-in semantic
    pub fn parameter_with_semantic(&self, semantic: &str) -> Option<(&str, &TechniqueParameter)> {
        self.parameters
            .iter()
            .find(|(_, p)| p.semantic.as_deref() == Some(semantic))
            .map(|(name, p)| (name.as_str(), p))
    }
}
