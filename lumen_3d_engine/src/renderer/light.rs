/// Light records accumulated per frame

use std::sync::Arc;
use glam::{Vec3, Vec4};
use crate::error::Result;
use crate::graphics_device::{CommandList, ShaderProgram, UniformValue};

/// Light kind; the numeric value is what the lighting shader sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum LightType {
    #[default]
    Disabled = 0,
    Directional = 1,
    Point = 2,
    Spot = 3,
}

/// One light
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightParameters {
    pub position: Vec3,
    pub direction: Vec3,
    pub radius: f32,
    /// Spot cone half-angle in radians
    pub cut_off: f32,
    /// RGB color, intensity in `w`
    pub color_intensity: Vec4,
    pub light_type: LightType,
}

impl LightParameters {
    pub fn point(position: Vec3, radius: f32, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            radius,
            color_intensity: color.extend(intensity),
            light_type: LightType::Point,
            ..Self::default()
        }
    }

    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction,
            radius: 1.0,
            color_intensity: color.extend(intensity),
            light_type: LightType::Directional,
            ..Self::default()
        }
    }

    pub fn spot(position: Vec3, direction: Vec3, radius: f32, cut_off: f32, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            direction,
            radius,
            cut_off,
            color_intensity: color.extend(intensity),
            light_type: LightType::Spot,
        }
    }

    pub fn color(&self) -> Vec3 {
        self.color_intensity.truncate()
    }

    pub fn intensity(&self) -> f32 {
        self.color_intensity.w
    }

    pub fn is_enabled(&self) -> bool {
        self.light_type != LightType::Disabled
    }

    /// Write the `uLight*` uniforms of the lighting program
    pub(crate) fn apply(&self, cmd: &mut dyn CommandList, program: &Arc<dyn ShaderProgram>) -> Result<()> {
        cmd.set_named_uniform(program, "uLightType", UniformValue::Int(self.light_type as i32))?;
        cmd.set_named_uniform(program, "uLightPosition", UniformValue::Vec3(self.position))?;
        cmd.set_named_uniform(program, "uLightDirection", UniformValue::Vec3(self.direction))?;
        cmd.set_named_uniform(program, "uLightRadius", UniformValue::Float(self.radius))?;
        cmd.set_named_uniform(program, "uLightCutOff", UniformValue::Float(self.cut_off))?;
        cmd.set_named_uniform(program, "uLightColorIntensity", UniformValue::Vec4(self.color_intensity))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
