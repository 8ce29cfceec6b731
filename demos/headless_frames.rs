//! Render frames for several cameras without a window
//!
//! Run with:
//!   cargo run --example headless_frames
//!   cargo run --example headless_frames -- --cameras 4 --frames 120 --backend wgpu
//!   RUST_LOG=debug cargo run --example headless_frames -- --resize-every 10 --reallocate

use bevy_ecs::prelude::*;
use clap::Parser;
use glam::Vec3;
use raytracing_tutorials::{
    extract_cameras, init_logging,
    shader_globals,
    tutorial::{RenderCommand, ShaderAsset, ShaderLibrary},
    Camera, CommandRecorder, DepthConvention, FrameContext, HeadlessAllocator, PipelineContext,
    PrimaryRayTutorial, Projection, ResizePolicy, TextureAllocator, Transform, Tutorial,
    TutorialConfig,
};

/// Allocator used for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum CliBackend {
    /// Bookkeeping only, no GPU required.
    #[default]
    Headless,
    /// Real textures on the first available adapter.
    Wgpu,
}

#[derive(Parser, Debug)]
#[command(
    name = "headless_frames",
    about = "Render ray tracing technique frames for several cameras"
)]
struct Args {
    /// Camera output width in pixels.
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Camera output height in pixels.
    #[arg(long, default_value = "720")]
    height: u32,

    /// Number of frames to render.
    #[arg(long, default_value = "60")]
    frames: u64,

    /// Number of cameras in the scene.
    #[arg(long, default_value = "2")]
    cameras: u32,

    /// Allocator backend.
    #[arg(long, default_value = "headless", value_enum)]
    backend: CliBackend,

    /// Halve the first camera's size every N frames (0 disables).
    #[arg(long, default_value = "0")]
    resize_every: u64,

    /// Reallocate targets when a camera changes size.
    #[arg(long)]
    reallocate: bool,
}

fn spawn_cameras(world: &mut World, args: &Args) {
    let aspect = args.width as f32 / args.height.max(1) as f32;
    for i in 0..args.cameras {
        let angle = i as f32 / args.cameras.max(1) as f32 * std::f32::consts::TAU;
        let position = Vec3::new(angle.cos() * 10.0, 5.0, angle.sin() * 10.0);
        let mut camera = Camera::new(
            args.width,
            args.height,
            Projection::perspective(60.0, aspect, 0.1, 500.0),
        );
        camera.order = i as i32;
        world.spawn((camera, Transform::looking_at(position, Vec3::ZERO, Vec3::Y)));
    }
}

fn create_allocator(backend: CliBackend) -> Box<dyn TextureAllocator> {
    match backend {
        CliBackend::Headless => Box::new(HeadlessAllocator::new()),
        CliBackend::Wgpu => match raytracing_tutorials::WgpuAllocator::new_headless() {
            Ok(allocator) => Box::new(allocator),
            Err(e) => {
                log::warn!("wgpu allocator unavailable ({}), falling back to headless", e);
                Box::new(HeadlessAllocator::new())
            }
        },
    }
}

fn main() {
    init_logging();
    let args = Args::parse();

    let mut world = World::new();
    spawn_cameras(&mut world, &args);

    let pipeline = PipelineContext::new(
        DepthConvention::ZeroToOneReversed,
        ShaderLibrary::new().with(ShaderAsset::new(
            "primary_rays",
            include_str!("shaders/primary_rays.wgsl"),
        )),
    );
    let mut tutorial = PrimaryRayTutorial::new(TutorialConfig {
        shader: Some("primary_rays".into()),
        resize_policy: if args.reallocate {
            ResizePolicy::Reallocate
        } else {
            ResizePolicy::Retain
        },
        ..Default::default()
    });

    if let Err(e) = tutorial.init(&pipeline) {
        log::error!("Technique '{}' disabled: {}", tutorial.name(), e);
    }

    let mut allocator = create_allocator(args.backend);
    let mut commands = CommandRecorder::new();
    let mut dispatched = 0usize;

    for frame_index in 0..args.frames {
        if args.resize_every > 0 && frame_index > 0 && frame_index % args.resize_every == 0 {
            let mut query = world.query::<&mut Camera>();
            if let Some(mut camera) = query.iter_mut(&mut world).find(|c| c.order == 0) {
                let (w, h) = ((camera.pixel_width / 2).max(1), (camera.pixel_height / 2).max(1));
                log::info!("Frame {}: resizing camera 0 to {}x{}", frame_index, w, h);
                camera.set_pixel_size(w, h);
            }
        }

        let cameras = extract_cameras(&mut world);
        let mut frame = FrameContext::new(allocator.as_mut(), &mut commands, frame_index);
        for camera in &cameras {
            if let Err(e) = tutorial.render(&mut frame, camera) {
                log::error!("Frame {}: camera {:?} failed: {}", frame_index, camera.id, e);
            }
        }
        drop(frame);

        for command in commands.take() {
            let RenderCommand::DispatchRays(dispatch) = command;
            log::trace!(
                "Frame {}: {}x{} rays, far clip {:?}",
                frame_index,
                dispatch.width,
                dispatch.height,
                dispatch.globals.float(shader_globals::FAR_CLIP)
            );
            dispatched += 1;
        }
    }

    let cache = tutorial.core().cache();
    log::info!(
        "Rendered {} frames: {} dispatches, {} cached targets across {} cameras",
        args.frames,
        dispatched,
        cache.len(),
        cache.camera_count()
    );

    tutorial.dispose(allocator.as_mut());
    log::info!("Disposed technique '{}'", tutorial.name());
}
