/// Shader program trait and link-time reflection
///
/// Programs are linked once at creation. The backend fills a
/// [`ProgramReflection`] with every active uniform, uniform block and
/// attribute; lookups afterwards are plain hash-map reads. A miss is not an
/// error: it means the program has no such parameter.

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

/// Source text for one stage
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub stage: ShaderStage,
    pub source: String,
}

/// Descriptor for creating a shader program
#[derive(Debug, Clone)]
pub struct ShaderProgramDesc {
    /// Debug label, reported in compilation errors
    pub label: String,
    pub sources: Vec<ShaderSource>,
}

impl ShaderProgramDesc {
    /// Vertex + fragment program
    pub fn new(label: impl Into<String>, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sources: vec![
                ShaderSource { stage: ShaderStage::Vertex, source: vertex.into() },
                ShaderSource { stage: ShaderStage::Fragment, source: fragment.into() },
            ],
        }
    }

    /// Source of `stage`, if present
    pub fn source(&self, stage: ShaderStage) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.source.as_str())
    }
}

/// Location of a uniform inside a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// A value that can be written to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    /// True when every float component is finite
    pub fn is_finite(&self) -> bool {
        match self {
            UniformValue::Int(_) | UniformValue::UInt(_) => true,
            UniformValue::Float(v) => v.is_finite(),
            UniformValue::Vec2(v) => v.is_finite(),
            UniformValue::Vec3(v) => v.is_finite(),
            UniformValue::Vec4(v) => v.is_finite(),
            UniformValue::Mat3(m) => m.is_finite(),
            UniformValue::Mat4(m) => m.is_finite(),
        }
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self { UniformValue::Int(v) }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self { UniformValue::UInt(v) }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self { UniformValue::Float(v) }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self { UniformValue::Int(v as i32) }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self { UniformValue::Vec2(v) }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self { UniformValue::Vec3(v) }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self { UniformValue::Vec4(v) }
}

impl From<Mat3> for UniformValue {
    fn from(v: Mat3) -> Self { UniformValue::Mat3(v) }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self { UniformValue::Mat4(v) }
}

/// Name tables captured when a program is linked
#[derive(Debug, Clone, Default)]
pub struct ProgramReflection {
    uniforms: FxHashMap<String, UniformLocation>,
    uniform_blocks: FxHashMap<String, u32>,
    attributes: FxHashMap<String, u32>,
}

impl ProgramReflection {
    pub fn new(
        uniforms: FxHashMap<String, UniformLocation>,
        uniform_blocks: FxHashMap<String, u32>,
        attributes: FxHashMap<String, u32>,
    ) -> Self {
        Self { uniforms, uniform_blocks, attributes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Location of uniform `name` (array elements use `name[i]`)
    pub fn uniform(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    /// Index of uniform block `name`
    pub fn uniform_block(&self, name: &str) -> Option<u32> {
        self.uniform_blocks.get(name).copied()
    }

    /// Location of vertex attribute `name`
    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    /// Reverse lookup, for diagnostics
    pub fn uniform_name(&self, location: UniformLocation) -> Option<&str> {
        self.uniforms
            .iter()
            .find(|(_, loc)| **loc == location)
            .map(|(name, _)| name.as_str())
    }

    pub fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    pub fn uniform_block_count(&self) -> usize {
        self.uniform_blocks.len()
    }
}

/// Linked shader program
pub trait ShaderProgram: Send + Sync {
    /// Debug label
    fn label(&self) -> &str;

    /// Link-time reflection table
    fn reflection(&self) -> &ProgramReflection;
}
