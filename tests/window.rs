#![cfg(feature = "headless")]

extern crate gpu2d;

use gpu2d::prelude::*;

fn headless() -> RendererId {
    RendererId::new(RendererFamily::Headless, 1, 0)
}

fn setup() -> (GpuSystem, TargetHandle) {
    let mut gpu = GpuSystem::new();
    gpu.set_renderer_order(&[headless()]);
    let screen = gpu.init(640, 480, WindowFlags::empty()).unwrap();
    (gpu, screen)
}

fn window_of(gpu: &mut GpuSystem, target: TargetHandle) -> u32 {
    gpu.target_info(target).unwrap().context.unwrap().window_id
}

#[test]
fn mappings() {
    let (mut gpu, screen) = setup();
    assert_eq!(gpu.window_target(1), Some(screen));
    assert_eq!(gpu.window_target(0), None);

    let second = gpu.create_target_from_window(0).unwrap();
    assert_ne!(second, screen);
    assert_eq!(window_of(&mut gpu, second), 2);
    assert_eq!(gpu.window_target(2), Some(second));

    // The first context stays current.
    assert_eq!(gpu.context_target(), Some(screen));
    assert_eq!(gpu.num_errors(), 0);
}

#[test]
fn conflicting_mapping() {
    let (mut gpu, screen) = setup();
    let second = gpu.create_target_from_window(0).unwrap();

    gpu.make_current(second, 1);
    let err = gpu.pop_error();
    assert_eq!(err.code, ErrorCode::Data);
    assert_eq!(&*err.function, "make_current");
    assert_eq!(gpu.window_target(1), Some(screen));

    // The rejected target keeps its window and stays in the background.
    assert_eq!(window_of(&mut gpu, second), 2);
    assert_eq!(gpu.window_target(2), Some(second));
    assert_eq!(gpu.context_target(), Some(screen));

    // Rebinding to a fresh window is fine.
    gpu.make_current(second, 5);
    assert_eq!(gpu.num_errors(), 0);
    assert_eq!(gpu.window_target(5), Some(second));
    assert_eq!(gpu.window_target(2), None);
    assert_eq!(gpu.context_target(), Some(second));
}

#[test]
fn remove_mappings() {
    let (mut gpu, screen) = setup();

    gpu.remove_window_mapping(1);
    assert_eq!(gpu.window_target(1), None);
    assert_eq!(window_of(&mut gpu, screen), 0);

    // Removing an unknown window does nothing.
    gpu.remove_window_mapping(42);
    assert_eq!(gpu.num_errors(), 0);

    gpu.make_current(screen, 3);
    assert_eq!(gpu.window_target(3), Some(screen));
    gpu.remove_window_mapping_by_target(screen);
    assert_eq!(gpu.window_target(3), None);
    assert_eq!(window_of(&mut gpu, screen), 0);

    let second = gpu.create_target_from_window(0).unwrap();
    let id = window_of(&mut gpu, second);
    assert_eq!(gpu.window_target(id), Some(second));
    gpu.free_target(second);
    assert_eq!(gpu.window_target(id), None);
    assert_eq!(gpu.num_errors(), 0);
}

#[test]
fn closed_renderer_unmaps() {
    let (mut gpu, screen) = setup();
    let second = gpu.create_target_from_window(0).unwrap();
    assert_eq!(gpu.window_target(2), Some(second));

    gpu.close_current_renderer();
    assert_eq!(gpu.window_target(1), None);
    assert_eq!(gpu.window_target(2), None);

    // The next renderer hands out the same handles and window ids.
    assert_eq!(gpu.init(640, 480, WindowFlags::empty()), Some(screen));
    let image = gpu.create_image(16, 16, ImageFormat::RGBA).unwrap();
    gpu.load_target(image).unwrap();

    let third = gpu.create_target_from_window(0).unwrap();
    assert_eq!(window_of(&mut gpu, third), 2);
    assert_eq!(gpu.window_target(2), Some(third));
    assert_eq!(gpu.num_errors(), 0);
}

#[test]
fn several_renderers() {
    let (mut gpu, first) = setup();
    gpu.set_init_window(5);
    let second = gpu
        .init_renderer_by_id(headless(), 320, 240, WindowFlags::empty())
        .unwrap();

    // Each renderer numbers its own targets.
    assert_eq!(first, second);
    assert_eq!(gpu.window_target(1), Some(first));
    assert_eq!(gpu.window_target(5), Some(second));
    assert_eq!(gpu.num_errors(), 0);

    // Window 1 belongs to the context of the first renderer.
    gpu.make_current(second, 1);
    let err = gpu.pop_error();
    assert_eq!(err.code, ErrorCode::Data);
    assert_eq!(&*err.function, "make_current");
    assert_eq!(window_of(&mut gpu, second), 5);

    // Unmapping detaches the context of the renderer owning the window.
    gpu.remove_window_mapping(1);
    assert_eq!(window_of(&mut gpu, second), 5);

    gpu.close_current_renderer();
    assert_eq!(gpu.window_target(5), None);

    gpu.set_current_renderer(headless());
    assert_eq!(gpu.context_target(), Some(first));
    assert_eq!(window_of(&mut gpu, first), 0);
    assert_eq!(gpu.num_errors(), 0);
}

#[test]
fn conflicting_init() {
    let (mut gpu, first) = setup();

    // Both renderers open window 1.
    let second = gpu.init_renderer_by_id(headless(), 320, 240, WindowFlags::empty());
    assert!(second.is_some());

    let err = gpu.pop_error();
    assert_eq!(err.code, ErrorCode::Data);
    assert_eq!(&*err.function, "init_renderer_by_id");
    assert_eq!(gpu.window_target(1), Some(first));
}

#[test]
fn add_mapping() {
    let (mut gpu, screen) = setup();
    gpu.remove_window_mapping(1);

    // The context has been detached from its window.
    gpu.add_window_mapping(screen);
    assert_eq!(gpu.window_target(1), None);

    gpu.make_current(screen, 1);
    gpu.remove_window_mapping_by_target(screen);
    gpu.make_current(screen, 1);
    gpu.add_window_mapping(screen);
    assert_eq!(gpu.window_target(1), Some(screen));
    assert_eq!(gpu.num_errors(), 0);
}

#[test]
fn virtual_resolution() {
    let (mut gpu, screen) = setup();
    assert_eq!(gpu.virtual_coords(screen, 100.0, 100.0), Some((100.0, 100.0)));

    gpu.set_virtual_resolution(screen, 320, 240);
    assert_eq!(gpu.virtual_coords(screen, 100.0, 100.0), Some((50.0, 50.0)));

    let target = gpu.target_info(screen).unwrap();
    assert_eq!((target.w, target.h), (320, 240));
    assert_eq!((target.base_w, target.base_h), (640, 480));

    gpu.unset_virtual_resolution(screen);
    assert_eq!(gpu.virtual_coords(screen, 100.0, 100.0), Some((100.0, 100.0)));

    gpu.set_virtual_resolution(screen, 0, 240);
    assert_eq!(gpu.pop_error().code, ErrorCode::User);
}

#[test]
fn window_resolution() {
    let (mut gpu, screen) = setup();
    gpu.set_window_resolution(800, 600);

    let target = gpu.target_info(screen).unwrap();
    assert_eq!((target.w, target.h), (800, 600));

    assert_eq!(gpu.fullscreen(), Some(false));
    assert_eq!(gpu.set_fullscreen(true, false), Some(true));
    assert_eq!(gpu.fullscreen(), Some(true));
}

#[test]
fn camera() {
    let (mut gpu, screen) = setup();
    assert_eq!(gpu.camera(screen), Some(GpuSystem::default_camera()));

    let camera = Camera {
        x: 10.0,
        y: 20.0,
        angle: 45.0,
        zoom: 2.0,
        ..Camera::default()
    };

    let previous = gpu.set_camera(screen, Some(camera));
    assert_eq!(previous, Some(Camera::default()));
    assert_eq!(gpu.camera(screen), Some(camera));

    assert_eq!(gpu.set_camera(screen, None), Some(camera));
    assert_eq!(gpu.camera(screen).unwrap().zoom, 1.0);
}
