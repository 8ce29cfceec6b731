//! wgpu allocator implementation

use crate::backend::traits::*;
use crate::backend::types::*;
use std::collections::HashMap;

/// A render target living on a wgpu device
struct WgpuTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

/// wgpu allocator implementation
pub struct WgpuAllocator {
    device: wgpu::Device,
    queue: wgpu::Queue,

    targets: HashMap<u64, WgpuTarget>,
    next_texture_id: u64,
}

impl WgpuAllocator {
    fn convert_texture_format(format: TextureFormat) -> wgpu::TextureFormat {
        match format {
            TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
            TextureFormat::Bgra8UnormSrgb => wgpu::TextureFormat::Bgra8UnormSrgb,
            TextureFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
            TextureFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
            TextureFormat::R32Float => wgpu::TextureFormat::R32Float,
            TextureFormat::Rg32Float => wgpu::TextureFormat::Rg32Float,
            TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
        }
    }

    fn convert_texture_usage(usage: TextureUsage) -> wgpu::TextureUsages {
        let mut result = wgpu::TextureUsages::empty();
        if usage.contains(TextureUsage::COPY_SRC) {
            result |= wgpu::TextureUsages::COPY_SRC;
        }
        if usage.contains(TextureUsage::COPY_DST) {
            result |= wgpu::TextureUsages::COPY_DST;
        }
        if usage.contains(TextureUsage::TEXTURE_BINDING) {
            result |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        if usage.contains(TextureUsage::STORAGE_BINDING) {
            result |= wgpu::TextureUsages::STORAGE_BINDING;
        }
        if usage.contains(TextureUsage::RENDER_ATTACHMENT) {
            result |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        result
    }

    fn convert_filter_mode(filter: FilterMode) -> wgpu::FilterMode {
        match filter {
            FilterMode::Point => wgpu::FilterMode::Nearest,
            FilterMode::Bilinear => wgpu::FilterMode::Linear,
        }
    }

    fn convert_wrap_mode(wrap: WrapMode) -> wgpu::AddressMode {
        match wrap {
            WrapMode::Clamp => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::Mirror => wgpu::AddressMode::MirrorRepeat,
        }
    }

    fn convert_dimension(dimension: TextureDimension) -> wgpu::TextureDimension {
        match dimension {
            TextureDimension::D2 => wgpu::TextureDimension::D2,
            TextureDimension::D3 => wgpu::TextureDimension::D3,
        }
    }

    /// Wrap an existing device, e.g. the one owned by the host renderer.
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            targets: HashMap::new(),
            next_texture_id: 0,
        }
    }

    /// Create an allocator on a device without any surface (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new_headless() -> BackendResult<Self> {
        pollster::block_on(Self::new_headless_async())
    }

    /// Async device creation (required on web, optional on native)
    pub async fn new_headless_async() -> BackendResult<Self> {
        let backends = if std::env::var("WGPU_BACKEND").is_ok() {
            wgpu::util::backend_bits_from_env().unwrap_or(wgpu::Backends::all())
        } else {
            wgpu::Backends::all()
        };

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BackendError::InitializationFailed("No suitable adapter found".into()))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Ray Tracing Tutorials Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| BackendError::DeviceCreationFailed(e.to_string()))?;

        Ok(Self::from_device(device, queue))
    }

    /// Get reference to the wgpu device
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get reference to the wgpu queue
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Get the wgpu texture behind a handle
    pub fn texture(&self, handle: TextureHandle) -> Option<&wgpu::Texture> {
        self.targets.get(&handle.0).map(|t| &t.texture)
    }

    /// Get the default view of a target
    pub fn texture_view(&self, handle: TextureHandle) -> Option<&wgpu::TextureView> {
        self.targets.get(&handle.0).map(|t| &t.view)
    }

    /// Get the sampler matching the target's filter and wrap modes
    pub fn sampler(&self, handle: TextureHandle) -> Option<&wgpu::Sampler> {
        self.targets.get(&handle.0).map(|t| &t.sampler)
    }

    /// Number of targets currently alive
    pub fn live_count(&self) -> usize {
        self.targets.len()
    }
}

impl TextureAllocator for WgpuAllocator {
    fn allocate(&mut self, desc: &RenderTargetDescriptor) -> BackendResult<TextureHandle> {
        desc.validate().map_err(BackendError::InvalidDescriptor)?;

        let format = Self::convert_texture_format(desc.format);
        if desc.flags.random_write
            && !format
                .guaranteed_format_features(self.device.features())
                .allowed_usages
                .contains(wgpu::TextureUsages::STORAGE_BINDING)
        {
            return Err(BackendError::TextureCreationFailed(format!(
                "{:?} does not support storage binding on this device",
                desc.format
            )));
        }
        if desc.flags.dynamic_scale {
            log::trace!("WgpuAllocator: dynamic scaling is handled by the host, ignoring flag");
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: None,
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: desc.depth_or_layers,
            },
            mip_level_count: desc.mip_level_count(),
            sample_count: desc.sample_count,
            dimension: Self::convert_dimension(desc.dimension),
            format,
            usage: Self::convert_texture_usage(desc.usage()),
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let filter = Self::convert_filter_mode(desc.filter);
        let address_mode = Self::convert_wrap_mode(desc.wrap);
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: None,
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.targets.insert(
            id,
            WgpuTarget {
                texture,
                view,
                sampler,
            },
        );

        log::trace!(
            "WgpuAllocator: created target {} ({}x{} {:?})",
            id,
            desc.width,
            desc.height,
            desc.format
        );
        Ok(TextureHandle(id))
    }

    fn release(&mut self, handle: TextureHandle) {
        match self.targets.remove(&handle.0) {
            Some(target) => {
                target.texture.destroy();
                log::trace!("WgpuAllocator: released target {}", handle.0);
            }
            None => log::warn!(
                "WgpuAllocator: release of unknown or already released target {}",
                handle.0
            ),
        }
    }
}
