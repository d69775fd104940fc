/// Full-screen post-process effect
///
/// A filter's program is the full-screen quad vertex stage plus a fragment
/// stage built from a fixed template: the template declares the standard
/// render-target samplers and calls `filterMain()`, which the effect body
/// defines.

use std::sync::Arc;
use glam::Vec2;
use crate::error::Result;
use crate::graphics_device::{BlendState, CommandList, GraphicsDevice, ShaderProgram, ShaderProgramDesc, UniformValue};
use crate::renderer::shaders::QUAD_VERTEX;

/// Placeholder replaced by the effect body
pub const FILTER_CODE_MARKER: &str = "[filter_code]";

/// Fragment template shared by every effect
pub const FILTER_FRAGMENT_TEMPLATE: &str = r#"#version 330 core
in vec2 uTexCoord;

uniform sampler2D rtDiffuse;
uniform sampler2D rtMaterial;
uniform sampler2D rtNormals;
uniform sampler2D rtPosition;
uniform sampler2D rtDepth;
uniform sampler2D rtRendered;

out vec4 color;

[filter_code]

void main() {
    color = filterMain();
}
"#;

const THRESHOLD_BODY: &str = r#"uniform float uThreshold;

vec4 filterMain() {
    vec3 rendered = texture(rtRendered, uTexCoord).rgb;
    float brightness = dot(rendered, vec3(0.2126, 0.7152, 0.0722));
    return brightness > uThreshold ? vec4(rendered, 1.0) : vec4(0.0, 0.0, 0.0, 1.0);
}
"#;

const BLUR_BODY: &str = r#"uniform vec2 uDirection;
uniform vec2 uResolution;

const float weights[5] = float[](0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);

vec4 filterMain() {
    vec2 texel = uDirection / uResolution;
    vec3 result = texture(rtRendered, uTexCoord).rgb * weights[0];
    for (int i = 1; i < 5; ++i) {
        result += texture(rtRendered, uTexCoord + texel * float(i)).rgb * weights[i];
        result += texture(rtRendered, uTexCoord - texel * float(i)).rgb * weights[i];
    }
    return vec4(result, 1.0);
}
"#;

const COMBINE_BODY: &str = r#"uniform sampler2D rtA;
uniform sampler2D rtB;

vec4 filterMain() {
    vec4 a = texture(rtA, uTexCoord);
    vec3 b = texture(rtB, uTexCoord).rgb;
    return vec4(a.rgb + b, a.a);
}
"#;

const GAMMA_CORRECT_BODY: &str = r#"uniform float uGamma;

vec4 filterMain() {
    vec3 hdr = texture(rtRendered, uTexCoord).rgb;
    vec3 mapped = hdr / (hdr + vec3(1.0));
    return vec4(pow(mapped, vec3(1.0 / uGamma)), 1.0);
}
"#;

const ERODE_BODY: &str = r#"uniform vec2 uResolution;

vec4 filterMain() {
    vec2 texel = 1.0 / uResolution;
    vec4 result = vec4(1.0e20);
    for (int x = -1; x <= 1; ++x) {
        for (int y = -1; y <= 1; ++y) {
            result = min(result, texture(rtRendered, uTexCoord + vec2(x, y) * texel));
        }
    }
    return result;
}
"#;

/// Standard sampler units declared by the template
const STANDARD_SAMPLERS: [(&str, i32); 6] = [
    ("rtDiffuse", 0),
    ("rtMaterial", 1),
    ("rtNormals", 2),
    ("rtPosition", 3),
    ("rtRendered", 4),
    ("rtDepth", 5),
];

/// How a filter's output is blended onto its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source-alpha blending
    #[default]
    Normal,
    /// One-one accumulation
    Additive,
}

impl BlendMode {
    pub const fn blend_state(self) -> BlendState {
        match self {
            BlendMode::Normal => BlendState::Alpha,
            BlendMode::Additive => BlendState::Additive,
        }
    }
}

/// The closed set of effects
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    /// Keep pixels brighter than `threshold`
    Threshold { threshold: f32 },
    /// Separable gaussian; alternates direction on every invocation
    Blur { resolution: Vec2, horizontal: bool },
    /// `A + B` with A's alpha; A at unit 0, B at unit 1
    Combine,
    /// Reinhard tone mapping followed by `1/gamma`
    GammaCorrect { gamma: f32 },
    /// 3x3 minimum
    Erode { resolution: Vec2 },
}

impl FilterKind {
    pub const fn name(&self) -> &'static str {
        match self {
            FilterKind::Threshold { .. } => "threshold",
            FilterKind::Blur { .. } => "blur",
            FilterKind::Combine => "combine",
            FilterKind::GammaCorrect { .. } => "gamma_correct",
            FilterKind::Erode { .. } => "erode",
        }
    }

    pub const fn fragment_body(&self) -> &'static str {
        match self {
            FilterKind::Threshold { .. } => THRESHOLD_BODY,
            FilterKind::Blur { .. } => BLUR_BODY,
            FilterKind::Combine => COMBINE_BODY,
            FilterKind::GammaCorrect { .. } => GAMMA_CORRECT_BODY,
            FilterKind::Erode { .. } => ERODE_BODY,
        }
    }
}

/// Expand the template with an effect body
pub fn build_fragment_source(body: &str) -> String {
    FILTER_FRAGMENT_TEMPLATE.replace(FILTER_CODE_MARKER, body)
}

/// A post-process effect and its program
pub struct Filter {
    kind: FilterKind,
    blend_mode: BlendMode,
    repeat_count: u32,
    program: Option<Arc<dyn ShaderProgram>>,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            blend_mode: BlendMode::Normal,
            repeat_count: 1,
            program: None,
        }
    }

    pub fn threshold(threshold: f32) -> Self {
        Self::new(FilterKind::Threshold { threshold })
    }

    /// Blur starting with the vertical direction
    pub fn blur(resolution: Vec2) -> Self {
        Self::new(FilterKind::Blur { resolution, horizontal: false })
    }

    pub fn combine() -> Self {
        Self::new(FilterKind::Combine)
    }

    pub fn gamma_correct(gamma: f32) -> Self {
        Self::new(FilterKind::GammaCorrect { gamma })
    }

    pub fn erode(resolution: Vec2) -> Self {
        Self::new(FilterKind::Erode { resolution })
    }

    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Update the texel resolution of a Blur or Erode filter
    ///
    /// Returns `false` for effects without a resolution.
    pub fn set_resolution(&mut self, value: Vec2) -> bool {
        match &mut self.kind {
            FilterKind::Blur { resolution, .. } | FilterKind::Erode { resolution } => {
                *resolution = value;
                true
            }
            _ => false,
        }
    }

    pub fn is_created(&self) -> bool {
        self.program.is_some()
    }

    pub fn program(&self) -> Option<&Arc<dyn ShaderProgram>> {
        self.program.as_ref()
    }

    /// Compile the program; no-op once created
    pub fn create(&mut self, device: &mut dyn GraphicsDevice, owner: &str) -> Result<()> {
        if self.program.is_some() {
            return Ok(());
        }
        let label = format!("{}.{}", owner, self.kind.name());
        let desc = ShaderProgramDesc::new(
            label.as_str(),
            QUAD_VERTEX,
            build_fragment_source(self.kind.fragment_body()),
        );
        let program = device.create_shader_program(&desc).map_err(|err| {
            crate::engine_error!("lumen3d::Filter", "Failed to build filter '{}': {}", label, err);
            err
        })?;
        self.program = Some(program);
        Ok(())
    }

    fn require_program(&self) -> Result<Arc<dyn ShaderProgram>> {
        match &self.program {
            Some(program) => Ok(Arc::clone(program)),
            None => Err(crate::engine_err!(
                "lumen3d::Filter",
                "Filter '{}' used before create()",
                self.kind.name()
            )),
        }
    }

    /// Make the filter's program current
    pub fn bind(&self, cmd: &mut dyn CommandList) -> Result<()> {
        let program = self.require_program()?;
        cmd.bind_program(&program)
    }

    /// Write the standard samplers, the effect uniforms and the blend state
    ///
    /// Must follow `bind`. A Blur filter flips its direction on every call.
    pub fn set_uniforms(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        let program = self.require_program()?;

        for (name, unit) in STANDARD_SAMPLERS {
            cmd.set_named_uniform(&program, name, UniformValue::Int(unit))?;
        }

        match &mut self.kind {
            FilterKind::Threshold { threshold } => {
                cmd.set_named_uniform(&program, "rtRendered", UniformValue::Int(0))?;
                cmd.set_named_uniform(&program, "uThreshold", UniformValue::Float(*threshold))?;
            }
            FilterKind::Blur { resolution, horizontal } => {
                let direction = if *horizontal { Vec2::X } else { Vec2::Y };
                cmd.set_named_uniform(&program, "rtRendered", UniformValue::Int(0))?;
                cmd.set_named_uniform(&program, "uDirection", UniformValue::Vec2(direction))?;
                cmd.set_named_uniform(&program, "uResolution", UniformValue::Vec2(*resolution))?;
                *horizontal = !*horizontal;
            }
            FilterKind::Combine => {
                cmd.set_named_uniform(&program, "rtA", UniformValue::Int(0))?;
                cmd.set_named_uniform(&program, "rtB", UniformValue::Int(1))?;
            }
            FilterKind::GammaCorrect { gamma } => {
                cmd.set_named_uniform(&program, "rtRendered", UniformValue::Int(0))?;
                cmd.set_named_uniform(&program, "uGamma", UniformValue::Float(*gamma))?;
            }
            FilterKind::Erode { resolution } => {
                cmd.set_named_uniform(&program, "rtRendered", UniformValue::Int(0))?;
                cmd.set_named_uniform(&program, "uResolution", UniformValue::Vec2(*resolution))?;
            }
        }

        cmd.set_blend_state(self.blend_mode.blend_state())
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
