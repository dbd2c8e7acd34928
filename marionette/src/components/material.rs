use std::{collections::BTreeMap, rc::Rc};

use super::{Technique, Texture};

/// A single material parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialValue {
    Number(f32),
    Vector(Vec<f32>),
    Bool(bool),
    Texture(Rc<Texture>),
}

/// A set of parameter values for a technique.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub technique: Option<Rc<Technique>>,
    pub values: BTreeMap<String, MaterialValue>,
}

impl Material {
    pub fn number(&self, key: &str) -> Option<f32> {
        match self.values.get(key)? {
            MaterialValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn texture(&self, key: &str) -> Option<&Rc<Texture>> {
        match self.values.get(key)? {
            MaterialValue::Texture(t) => Some(t),
            _ => None,
        }
    }
}
