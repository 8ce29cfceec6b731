//! Technique lifecycle integration tests.
//!
//! Scenarios run against every allocator backend using `rstest`. Backends that
//! are not available on the machine (no adapter for wgpu) are skipped.
//!
//! ```bash
//! cargo test --test tutorial_tests
//! cargo test --test tutorial_tests --no-default-features   # headless only
//! ```

mod common;

use bevy_ecs::prelude::*;
use glam::{Vec3, Vec4};
use rstest::rstest;

use common::{camera, config, pipeline, Backend, TestContext};
use raytracing_tutorials::{
    extract_cameras, shader_globals, tutorial::RenderCommand, Camera, CameraId, CommandRecorder,
    DepthConvention, FrameContext, PrimaryRayTutorial, Projection, ResizePolicy, TargetKind,
    Transform, Tutorial, TutorialConfig, TutorialError, TutorialState,
};

// ============================================================================
// Frame Rendering
// ============================================================================

/// A single camera rendered on two frames reuses its targets and publishes its
/// own parameters each time.
#[rstest]
#[case::headless(Backend::Headless)]
#[case::wgpu(Backend::Wgpu)]
fn test_camera_targets_persist_across_frames(#[case] backend: Backend) {
    let Some(mut ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let mut tutorial = PrimaryRayTutorial::new(config());
    tutorial
        .init(&pipeline(DepthConvention::ZeroToOneReversed))
        .unwrap();

    let view = camera(7, Vec3::new(0.0, 5.0, -10.0), 1920, 1080, 0.1, 500.0);
    let mut commands = CommandRecorder::new();
    let mut handles = Vec::new();

    for frame_index in 0..2 {
        let mut frame = FrameContext::new(ctx.allocator(), &mut commands, frame_index);
        tutorial.render(&mut frame, &view).unwrap();

        assert_eq!(frame.globals.float(shader_globals::FAR_CLIP), Some(500.0));
        assert_eq!(
            frame.globals.vector(shader_globals::CAMERA_WORLD_POSITION),
            Some(Vec4::new(0.0, 5.0, -10.0, 1.0))
        );
        drop(frame);

        let color = tutorial
            .core()
            .cache()
            .get(view.id, TargetKind::Color)
            .unwrap();
        assert_eq!((color.width, color.height), (1920, 1080));
        handles.push(color.handle);
    }

    assert_eq!(handles[0], handles[1]);
    assert_eq!(tutorial.core().cache().len(), 2);
    assert_eq!(ctx.live_count(), 2);
    assert_eq!(commands.len(), 2);

    tutorial.dispose(ctx.allocator());
    assert_eq!(ctx.live_count(), 0);
}

/// Two cameras get disjoint targets and their dispatches carry their own globals.
#[rstest]
#[case::headless(Backend::Headless)]
#[case::wgpu(Backend::Wgpu)]
fn test_cameras_do_not_share_targets(#[case] backend: Backend) {
    let Some(mut ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let mut tutorial = PrimaryRayTutorial::new(config());
    tutorial.init(&pipeline(DepthConvention::ZeroToOne)).unwrap();

    let near = camera(1, Vec3::new(0.0, 2.0, -4.0), 640, 360, 0.1, 100.0);
    let far = camera(2, Vec3::new(10.0, 2.0, 0.0), 320, 240, 0.5, 800.0);
    let mut commands = CommandRecorder::new();
    {
        let mut frame = FrameContext::new(ctx.allocator(), &mut commands, 0);
        tutorial.render(&mut frame, &near).unwrap();
        tutorial.render(&mut frame, &far).unwrap();
    }

    let dispatches: Vec<_> = commands
        .take()
        .into_iter()
        .map(|RenderCommand::DispatchRays(dispatch)| dispatch)
        .collect();
    assert_eq!(dispatches.len(), 2);
    assert_ne!(dispatches[0].color.handle, dispatches[1].color.handle);
    assert_eq!((dispatches[0].width, dispatches[0].height), (640, 360));
    assert_eq!((dispatches[1].width, dispatches[1].height), (320, 240));
    assert_eq!(
        dispatches[0].globals.float(shader_globals::FAR_CLIP),
        Some(100.0)
    );
    assert_eq!(
        dispatches[1].globals.float(shader_globals::FAR_CLIP),
        Some(800.0)
    );
    assert_eq!(ctx.live_count(), 4);

    tutorial.dispose(ctx.allocator());
}

/// Disposing releases every target exactly once; later calls are no-ops.
#[rstest]
#[case::headless(Backend::Headless)]
#[case::wgpu(Backend::Wgpu)]
fn test_dispose_releases_everything(#[case] backend: Backend) {
    let Some(mut ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let mut tutorial = PrimaryRayTutorial::new(config());
    tutorial
        .init(&pipeline(DepthConvention::ZeroToOneReversed))
        .unwrap();

    let mut commands = CommandRecorder::new();
    {
        let mut frame = FrameContext::new(ctx.allocator(), &mut commands, 0);
        for id in 1..=3 {
            let view = camera(id, Vec3::new(id as f32, 1.0, -5.0), 64, 64, 0.1, 50.0);
            tutorial.render(&mut frame, &view).unwrap();
        }
    }
    assert_eq!(ctx.live_count(), 6);

    tutorial.dispose(ctx.allocator());
    tutorial.dispose(ctx.allocator());
    assert_eq!(ctx.live_count(), 0);
    assert_eq!(tutorial.state(), TutorialState::Disposed);

    if let TestContext::Headless(allocator) = &ctx {
        assert_eq!(allocator.release_count(), 6);
    }

    // Rendering after dispose publishes and records nothing
    commands.take();
    let view = camera(1, Vec3::ZERO, 64, 64, 0.1, 50.0);
    let mut frame = FrameContext::new(ctx.allocator(), &mut commands, 1);
    tutorial.render(&mut frame, &view).unwrap();
    assert!(frame.globals.is_empty());
    drop(frame);
    assert!(commands.is_empty());
    assert_eq!(ctx.live_count(), 0);

    assert_eq!(
        tutorial.init(&pipeline(DepthConvention::ZeroToOneReversed)),
        Err(TutorialError::Disposed)
    );
}

/// With reallocation enabled a resized camera gets new targets and the old
/// ones are released.
#[rstest]
#[case::headless(Backend::Headless)]
#[case::wgpu(Backend::Wgpu)]
fn test_reallocate_on_resize(#[case] backend: Backend) {
    let Some(mut ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let mut tutorial = PrimaryRayTutorial::new(TutorialConfig {
        resize_policy: ResizePolicy::Reallocate,
        ..config()
    });
    tutorial
        .init(&pipeline(DepthConvention::ZeroToOneReversed))
        .unwrap();

    let mut commands = CommandRecorder::new();
    let large = camera(1, Vec3::new(0.0, 1.0, -3.0), 256, 128, 0.1, 50.0);
    let small = camera(1, Vec3::new(0.0, 1.0, -3.0), 128, 64, 0.1, 50.0);
    {
        let mut frame = FrameContext::new(ctx.allocator(), &mut commands, 0);
        tutorial.render(&mut frame, &large).unwrap();
        tutorial.render(&mut frame, &small).unwrap();
        assert_eq!(
            frame.globals.vector(shader_globals::OUTPUT_TARGET_SIZE),
            Some(Vec4::new(128.0, 64.0, 1.0 / 128.0, 1.0 / 64.0))
        );
    }

    let color = tutorial
        .core()
        .cache()
        .get(small.id, TargetKind::Color)
        .unwrap();
    assert_eq!((color.width, color.height), (128, 64));
    assert_eq!(ctx.live_count(), 2);

    tutorial.dispose(ctx.allocator());
    assert_eq!(ctx.live_count(), 0);
}

/// The default policy keeps the first size even when the camera shrinks.
#[test]
fn test_retain_ignores_resize() {
    let mut ctx = TestContext::new(Backend::Headless).unwrap();
    let mut tutorial = PrimaryRayTutorial::new(config());
    tutorial
        .init(&pipeline(DepthConvention::ZeroToOneReversed))
        .unwrap();

    let mut commands = CommandRecorder::new();
    {
        let mut frame = FrameContext::new(ctx.allocator(), &mut commands, 0);
        tutorial
            .render(&mut frame, &camera(1, Vec3::Z, 256, 128, 0.1, 50.0))
            .unwrap();
        tutorial
            .render(&mut frame, &camera(1, Vec3::Z, 128, 64, 0.1, 50.0))
            .unwrap();
    }

    let RenderCommand::DispatchRays(last) = &commands.commands()[1];
    assert_eq!((last.width, last.height), (256, 128));
    assert_eq!(
        last.globals.vector(shader_globals::OUTPUT_TARGET_SIZE),
        Some(Vec4::new(256.0, 128.0, 1.0 / 256.0, 1.0 / 128.0))
    );
    assert_eq!(ctx.live_count(), 2);
    tutorial.dispose(ctx.allocator());
}

/// Targets created through the wgpu allocator are real textures on the
/// allocator's device and queue.
#[cfg(feature = "wgpu-backend")]
#[test]
fn test_wgpu_targets_live_on_device() {
    let Some(TestContext::Wgpu(mut allocator)) = TestContext::new(Backend::Wgpu) else {
        eprintln!("Backend {:?} not available, skipping", Backend::Wgpu);
        return;
    };

    let mut tutorial = PrimaryRayTutorial::new(config());
    tutorial
        .init(&pipeline(DepthConvention::ZeroToOneReversed))
        .unwrap();
    let view = camera(1, Vec3::new(0.0, 1.0, -3.0), 96, 48, 0.1, 50.0);
    let mut commands = CommandRecorder::new();
    {
        let mut frame = FrameContext::new(&mut allocator, &mut commands, 0);
        tutorial.render(&mut frame, &view).unwrap();
    }

    let RenderCommand::DispatchRays(dispatch) = &commands.commands()[0];
    let texture = allocator.texture(dispatch.color.handle).unwrap();
    assert_eq!((texture.width(), texture.height()), (96, 48));
    assert!(texture.usage().contains(wgpu::TextureUsages::STORAGE_BINDING));
    let depth = allocator.texture(dispatch.depth.handle).unwrap();
    assert_eq!(depth.format(), wgpu::TextureFormat::Depth32Float);
    assert!(allocator.texture_view(dispatch.depth.handle).is_some());
    assert!(allocator.sampler(dispatch.color.handle).is_some());

    allocator
        .queue()
        .submit(std::iter::empty::<wgpu::CommandBuffer>());
    let _ = allocator.device().poll(wgpu::Maintain::Wait);

    tutorial.dispose(&mut allocator);
    assert_eq!(allocator.live_count(), 0);
}

// ============================================================================
// Depth Conventions
// ============================================================================

#[rstest]
#[case::gl(DepthConvention::NegativeOneToOne, false)]
#[case::zero_to_one(DepthConvention::ZeroToOne, false)]
#[case::reversed(DepthConvention::ZeroToOneReversed, true)]
fn test_z_buffer_params_follow_pipeline_convention(
    #[case] convention: DepthConvention,
    #[case] reversed: bool,
) {
    let mut ctx = TestContext::new(Backend::Headless).unwrap();
    let mut tutorial = PrimaryRayTutorial::new(config());
    tutorial.init(&pipeline(convention)).unwrap();

    let (near, far) = (0.1, 500.0);
    let view = camera(1, Vec3::new(0.0, 5.0, -10.0), 1920, 1080, near, far);
    let mut commands = CommandRecorder::new();
    let mut frame = FrameContext::new(ctx.allocator(), &mut commands, 0);
    tutorial.render(&mut frame, &view).unwrap();

    let params = frame
        .globals
        .vector(shader_globals::Z_BUFFER_PARAMS)
        .unwrap();
    let expected = if reversed {
        Vec4::new(-1.0 + far / near, 1.0, -1.0 / far + 1.0 / near, 1.0 / far)
    } else {
        Vec4::new(1.0 - far / near, far / near, 1.0 / far - 1.0 / near, 1.0 / near)
    };
    assert!(params.abs_diff_eq(expected, 1e-3), "{params} != {expected}");
    drop(frame);

    tutorial.dispose(ctx.allocator());
}

// ============================================================================
// ECS Extraction
// ============================================================================

/// Cameras extracted from a world keep separate targets, and a despawned
/// camera's targets can be released before its entity slot is reused.
#[test]
fn test_extracted_cameras_and_release() {
    let mut ctx = TestContext::new(Backend::Headless).unwrap();
    let mut world = World::new();
    let first = world
        .spawn((
            Camera::new(320, 180, Projection::perspective(60.0, 16.0 / 9.0, 0.1, 100.0)),
            Transform::from_position(Vec3::new(0.0, 1.0, -5.0)),
        ))
        .id();
    let mut second = Camera::new(
        160,
        90,
        Projection::perspective(45.0, 16.0 / 9.0, 0.1, 100.0),
    );
    second.order = -1;
    world.spawn((second, Transform::from_position(Vec3::new(3.0, 1.0, -5.0))));

    let mut tutorial = PrimaryRayTutorial::new(config());
    tutorial
        .init(&pipeline(DepthConvention::ZeroToOneReversed))
        .unwrap();

    let cameras = extract_cameras(&mut world);
    assert_eq!(cameras.len(), 2);
    assert_eq!(cameras[0].pixel_size(), (160, 90));

    let mut commands = CommandRecorder::new();
    {
        let mut frame = FrameContext::new(ctx.allocator(), &mut commands, 0);
        for view in &cameras {
            tutorial.render(&mut frame, view).unwrap();
        }
    }
    assert_eq!(tutorial.core().cache().camera_count(), 2);
    assert_eq!(ctx.live_count(), 4);

    world.despawn(first);
    let released = tutorial
        .core_mut()
        .release_camera(ctx.allocator(), first.into());
    assert_eq!(released, 2);
    assert_eq!(tutorial.core().cache().camera_count(), 1);
    assert_eq!(ctx.live_count(), 2);

    // A new camera may reuse the entity index but not the identity
    let replacement = world.spawn((Camera::default(), Transform::default())).id();
    assert_ne!(CameraId::from(replacement), CameraId::from(first));

    tutorial.dispose(ctx.allocator());
    assert_eq!(ctx.live_count(), 0);
}
