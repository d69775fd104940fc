/// Surface description copied into every draw command
///
/// A material has four optional texture slots and three scalar/vector
/// parameters. Each slot is bound to the sampler unit equal to its index, and
/// the shader sees a `tTextureValid[i]` flag per slot. The scalar parameters
/// travel in the `Material` uniform block.

use std::fmt;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use crate::error::Result;
use crate::graphics_device::{Buffer, CommandList, ShaderProgram, Texture, UniformValue};

/// Binding point of the `Material` uniform block
pub const MATERIAL_BLOCK_BINDING: u32 = 2;

/// Name of the material uniform block
pub const MATERIAL_BLOCK_NAME: &str = "Material";

/// Texture slot of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    Diffuse,
    Specular,
    Normals,
    Emission,
}

impl MaterialSlot {
    pub const ALL: [MaterialSlot; 4] = [
        MaterialSlot::Diffuse,
        MaterialSlot::Specular,
        MaterialSlot::Normals,
        MaterialSlot::Emission,
    ];

    /// Slot index, also the sampler unit the texture is bound to
    pub const fn index(self) -> usize {
        match self {
            MaterialSlot::Diffuse => 0,
            MaterialSlot::Specular => 1,
            MaterialSlot::Normals => 2,
            MaterialSlot::Emission => 3,
        }
    }

    pub const fn sampler_name(self) -> &'static str {
        match self {
            MaterialSlot::Diffuse => "tDiffuse",
            MaterialSlot::Specular => "tSpecular",
            MaterialSlot::Normals => "tNormals",
            MaterialSlot::Emission => "tEmission",
        }
    }

    pub const fn valid_flag_name(self) -> &'static str {
        match self {
            MaterialSlot::Diffuse => "tTextureValid[0]",
            MaterialSlot::Specular => "tTextureValid[1]",
            MaterialSlot::Normals => "tTextureValid[2]",
            MaterialSlot::Emission => "tTextureValid[3]",
        }
    }
}

/// std140 image of the `Material` uniform block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialParameters {
    pub shininess: f32,
    pub emission: f32,
    pub _pad: [f32; 2],
    pub diffuse: [f32; 4],
}

impl From<&Material> for MaterialParameters {
    fn from(material: &Material) -> Self {
        Self {
            shininess: material.shininess,
            emission: material.emission,
            _pad: [0.0; 2],
            diffuse: material.diffuse.to_array(),
        }
    }
}

/// Material value
#[derive(Clone)]
pub struct Material {
    textures: [Option<Arc<dyn Texture>>; 4],
    pub shininess: f32,
    pub emission: f32,
    pub diffuse: Vec4,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            textures: [None, None, None, None],
            shininess: 0.2,
            emission: 0.0,
            diffuse: Vec4::ONE,
        }
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let textures: Vec<Option<&str>> = self
            .textures
            .iter()
            .map(|t| t.as_ref().map(|t| t.label()))
            .collect();
        f.debug_struct("Material")
            .field("textures", &textures)
            .field("shininess", &self.shininess)
            .field("emission", &self.emission)
            .field("diffuse", &self.diffuse)
            .finish()
    }
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture(mut self, slot: MaterialSlot, texture: Arc<dyn Texture>) -> Self {
        self.textures[slot.index()] = Some(texture);
        self
    }

    pub fn with_diffuse(mut self, diffuse: Vec4) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn with_emission(mut self, emission: f32) -> Self {
        self.emission = emission;
        self
    }

    pub fn set_texture(&mut self, slot: MaterialSlot, texture: Option<Arc<dyn Texture>>) {
        self.textures[slot.index()] = texture;
    }

    pub fn texture(&self, slot: MaterialSlot) -> Option<&Arc<dyn Texture>> {
        self.textures[slot.index()].as_ref()
    }

    /// Per-slot presence, in slot order
    pub fn texture_valid_flags(&self) -> [bool; 4] {
        [
            self.textures[0].is_some(),
            self.textures[1].is_some(),
            self.textures[2].is_some(),
            self.textures[3].is_some(),
        ]
    }

    /// Bind textures, validity flags and the parameter block for `program`
    ///
    /// `parameters` is the shared `Material` block buffer; it is rewritten in
    /// command order so consecutive draws see their own values.
    pub fn bind(
        &self,
        cmd: &mut dyn CommandList,
        program: &Arc<dyn ShaderProgram>,
        parameters: &Arc<dyn Buffer>,
    ) -> Result<()> {
        for slot in MaterialSlot::ALL {
            let texture = self.texture(slot);
            cmd.set_named_uniform(program, slot.valid_flag_name(), UniformValue::from(texture.is_some()))?;
            if let Some(texture) = texture {
                let unit = slot.index() as u32;
                cmd.set_named_uniform(program, slot.sampler_name(), UniformValue::Int(unit as i32))?;
                cmd.bind_texture(unit, texture)?;
            }
        }

        let block = MaterialParameters::from(self);
        cmd.write_buffer(parameters, 0, bytemuck::bytes_of(&block))?;
        cmd.bind_named_uniform_block(program, MATERIAL_BLOCK_NAME, MATERIAL_BLOCK_BINDING, parameters)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
