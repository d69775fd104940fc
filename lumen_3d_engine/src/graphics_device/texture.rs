/// Texture trait and texture descriptor

use crate::error::Result;

/// Pixel formats used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    R8,
    RG8,
    RGB8,
    RGBA8,
    R32F,
    RG32F,
    RGB32F,
    RGBA32F,
    Depth24,
    Depth32F,
    Depth24Stencil8,
}

impl TextureFormat {
    /// Bytes per pixel
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::RG8 => 2,
            TextureFormat::RGB8 => 3,
            TextureFormat::RGBA8 => 4,
            TextureFormat::R32F => 4,
            TextureFormat::RG32F => 8,
            TextureFormat::RGB32F => 12,
            TextureFormat::RGBA32F => 16,
            TextureFormat::Depth24 => 4,
            TextureFormat::Depth32F => 4,
            TextureFormat::Depth24Stencil8 => 4,
        }
    }

    /// Number of color channels (0 for depth formats)
    pub const fn channel_count(self) -> u32 {
        match self {
            TextureFormat::R8 | TextureFormat::R32F => 1,
            TextureFormat::RG8 | TextureFormat::RG32F => 2,
            TextureFormat::RGB8 | TextureFormat::RGB32F => 3,
            TextureFormat::RGBA8 | TextureFormat::RGBA32F => 4,
            TextureFormat::Depth24 | TextureFormat::Depth32F | TextureFormat::Depth24Stencil8 => 0,
        }
    }

    pub const fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth24 | TextureFormat::Depth32F | TextureFormat::Depth24Stencil8
        )
    }

    pub const fn has_stencil(self) -> bool {
        matches!(self, TextureFormat::Depth24Stencil8)
    }

    pub const fn is_float(self) -> bool {
        matches!(
            self,
            TextureFormat::R32F
                | TextureFormat::RG32F
                | TextureFormat::RGB32F
                | TextureFormat::RGBA32F
                | TextureFormat::Depth32F
        )
    }
}

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureTarget {
    Texture2D,
    Texture2DArray,
    Texture2DMultisample,
}

/// Coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

/// Sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
    /// Trilinear; requires mipmaps
    LinearMipmapLinear,
}

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Debug label
    pub label: String,
    pub width: u32,
    pub height: u32,
    /// Layer count (1 unless `Texture2DArray`)
    pub layers: u32,
    pub format: TextureFormat,
    pub target: TextureTarget,
    pub wrap: TextureWrap,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    /// Initial pixel data, tightly packed
    pub data: Option<Vec<u8>>,
}

impl TextureDesc {
    /// Render-target texture with clamped edges and linear filtering
    pub fn attachment(label: impl Into<String>, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            layers: 1,
            format,
            target: TextureTarget::Texture2D,
            wrap: TextureWrap::ClampToEdge,
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            data: None,
        }
    }
}

/// Immutable texture properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub layers: u32,
    pub format: TextureFormat,
    pub target: TextureTarget,
}

/// Texture resource
pub trait Texture: Send + Sync {
    /// Debug label
    fn label(&self) -> &str;

    /// Size, format and target
    fn info(&self) -> &TextureInfo;

    /// Change the S/T wrap modes
    fn set_wrap(&self, wrap_s: TextureWrap, wrap_t: TextureWrap);

    /// Change the minification/magnification filters
    fn set_filter(&self, min: TextureFilter, mag: TextureFilter);

    /// Replace the pixels of the base level
    fn update(&self, data: &[u8]) -> Result<()>;
}
