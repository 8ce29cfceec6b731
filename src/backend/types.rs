//! Common types shared between allocators

use bitflags::bitflags;

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba16Float,
    Rgba32Float,
    R32Float,
    Rg32Float,
    Depth32Float,
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth32Float)
    }

    /// Whether compute/ray shaders may write this format as a storage texture.
    pub fn supports_storage(&self) -> bool {
        matches!(
            self,
            TextureFormat::Rgba8Unorm
                | TextureFormat::Rgba16Float
                | TextureFormat::Rgba32Float
                | TextureFormat::R32Float
                | TextureFormat::Rg32Float
        )
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Bgra8UnormSrgb
            | TextureFormat::Depth32Float
            | TextureFormat::R32Float => 4,
            TextureFormat::Rgba16Float | TextureFormat::Rg32Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }
}

bitflags! {
    /// Usage flags for render targets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Target can be copied from.
        const COPY_SRC = 1 << 0;
        /// Target can be copied to.
        const COPY_DST = 1 << 1;
        /// Target can be sampled in a shader.
        const TEXTURE_BINDING = 1 << 2;
        /// Target can be written as a storage texture.
        const STORAGE_BINDING = 1 << 3;
        /// Target can be used as a render attachment.
        const RENDER_ATTACHMENT = 1 << 4;
    }
}

/// Filter mode used when sampling a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Point,
    Bilinear,
}

/// Address mode used when sampling outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Clamp,
    Repeat,
    Mirror,
}

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureDimension {
    D2,
    D3,
}

/// Capability flags of a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetFlags {
    /// Shaders may write the target as a storage image.
    pub random_write: bool,
    /// Allocate a full mip chain.
    pub mipmaps: bool,
    /// Target participates in dynamic resolution scaling.
    pub dynamic_scale: bool,
}

/// Semantic description of a GPU render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub depth_or_layers: u32,
    pub format: TextureFormat,
    pub filter: FilterMode,
    pub wrap: WrapMode,
    pub dimension: TextureDimension,
    pub sample_count: u32,
    pub flags: TargetFlags,
}

impl RenderTargetDescriptor {
    /// Color output target: bilinear, clamped, random-write, single sample, no mips.
    pub fn color_output(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            depth_or_layers: 1,
            format,
            filter: FilterMode::Bilinear,
            wrap: WrapMode::Clamp,
            dimension: TextureDimension::D2,
            sample_count: 1,
            flags: TargetFlags {
                random_write: true,
                mipmaps: false,
                dynamic_scale: false,
            },
        }
    }

    /// Depth output target: 32-bit depth, point filtered, clamped, no random-write.
    pub fn depth_output(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth_or_layers: 1,
            format: TextureFormat::Depth32Float,
            filter: FilterMode::Point,
            wrap: WrapMode::Clamp,
            dimension: TextureDimension::D2,
            sample_count: 1,
            flags: TargetFlags::default(),
        }
    }

    /// Depth buffer bits, if this is a depth-only target.
    pub fn depth_bits(&self) -> Option<u32> {
        self.format.is_depth().then(|| self.format.bytes_per_pixel() * 8)
    }

    /// Number of mip levels implied by the mipmap flag.
    pub fn mip_level_count(&self) -> u32 {
        if self.flags.mipmaps {
            32 - self.width.max(self.height).max(1).leading_zeros()
        } else {
            1
        }
    }

    /// GPU usage flags implied by the descriptor.
    pub fn usage(&self) -> TextureUsage {
        let mut usage = TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_SRC;
        if self.flags.random_write {
            usage |= TextureUsage::STORAGE_BINDING;
        }
        if self.format.is_depth() {
            usage |= TextureUsage::RENDER_ATTACHMENT;
        }
        usage
    }

    /// Check allocation preconditions. Returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 || self.depth_or_layers == 0 {
            return Err(format!(
                "zero-sized target {}x{}x{}",
                self.width, self.height, self.depth_or_layers
            ));
        }
        if self.sample_count == 0 {
            return Err("sample count must be at least 1".into());
        }
        if self.flags.random_write && !self.format.supports_storage() {
            return Err(format!("{:?} cannot be used for random-write access", self.format));
        }
        if self.flags.random_write && self.sample_count > 1 {
            return Err("multisampled targets cannot be written randomly".into());
        }
        if self.format.is_depth() && self.dimension != TextureDimension::D2 {
            return Err("depth targets must be two-dimensional".into());
        }
        Ok(())
    }
}
