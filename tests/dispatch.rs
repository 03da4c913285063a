#![cfg(feature = "headless")]

extern crate gpu2d;

use std::env;
use std::fs;
use std::process;

use gpu2d::backends::headless::HeadlessFactory;
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

const RED: [u8; 4] = [255, 0, 0, 255];

#[test]
fn images() {
    let (mut gpu, _) = setup();
    let image = gpu.create_image(4, 4, ImageFormat::RGBA).unwrap();

    let info = gpu.image_info(image).unwrap();
    assert_eq!((info.w, info.h), (4, 4));
    assert_eq!(info.bytes_per_pixel, 4);
    assert_eq!(info.renderer, headless().with_index(0));

    // A 2x2 red square at (1, 1).
    let mut bytes = Vec::new();
    for _ in 0..4 {
        bytes.extend_from_slice(&RED);
    }

    gpu.update_image_bytes(image, Some(Rect::new(1.0, 1.0, 2.0, 2.0)), &bytes, 8);
    assert_eq!(gpu.num_errors(), 0);

    let surface = gpu.copy_surface_from_image(image).unwrap();
    assert_eq!((surface.w, surface.h, surface.channels), (4, 4, 4));
    assert_eq!(surface.pixel(0, 0), Some(&[0, 0, 0, 0][..]));
    assert_eq!(surface.pixel(2, 2), Some(&RED[..]));
    assert_eq!(surface.pixel(3, 3), Some(&[0, 0, 0, 0][..]));

    // Copies own their pixels.
    let copy = gpu.copy_image(image).unwrap();
    gpu.update_image(image, &Surface::filled(4, 4, &[0, 0, 255, 255]).unwrap());
    let surface = gpu.copy_surface_from_image(copy).unwrap();
    assert_eq!(surface.pixel(1, 1), Some(&RED[..]));

    gpu.update_image_bytes(image, None, &bytes, 16);
    assert_eq!(gpu.pop_error().code, ErrorCode::Data);
}

#[test]
fn render_targets() {
    let (mut gpu, screen) = setup();
    let image = gpu.create_image(8, 8, ImageFormat::RGBA).unwrap();

    let target = gpu.load_target(image).unwrap();
    assert_eq!(gpu.load_target(image), Some(target));
    assert_eq!(gpu.image_info(image).unwrap().target, Some(target));

    gpu.clear_rgba(target, 0, 255, 0, 128);
    assert_eq!(gpu.get_pixel(target, 3, 3), Some(Color::rgba(0, 255, 0, 128)));
    assert_eq!(gpu.get_pixel(target, 8, 0), Some(Color::TRANSPARENT));
    assert_eq!(gpu.get_pixel(target, -1, 0), Some(Color::TRANSPARENT));

    gpu.clear_rgb(screen, 10, 20, 30);
    assert_eq!(gpu.get_pixel(screen, 100, 100), Some(Color::rgb(10, 20, 30)));
    gpu.clear(screen);
    assert_eq!(gpu.get_pixel(screen, 100, 100), Some(Color::TRANSPARENT));

    let surface = gpu.copy_surface_from_target(target).unwrap();
    assert_eq!(surface.pixel(7, 7), Some(&[0, 255, 0, 128][..]));

    // Freeing the image takes its target along.
    gpu.free_image(image);
    assert_eq!(gpu.target_info(target), None);
    assert_eq!(gpu.pop_error().code, ErrorCode::Data);
}

#[test]
fn files() {
    let (mut gpu, _) = setup();
    let image = gpu.create_image(3, 2, ImageFormat::RGBA).unwrap();
    gpu.update_image_bytes(image, Some(Rect::new(0.0, 0.0, 1.0, 1.0)), &RED, 4);

    let path = env::temp_dir().join(format!("gpu2d-{}-files.png", process::id()));
    let path = path.to_str().unwrap().to_owned();

    assert!(gpu.save_image(image, &path, FileFormat::Auto));

    let loaded = gpu.load_image(&path).unwrap();
    let info = gpu.image_info(loaded).unwrap();
    assert_eq!((info.w, info.h), (3, 2));

    let expected = gpu.copy_surface_from_image(image).unwrap();
    let surface = gpu.load_surface(&path).unwrap();
    assert_eq!(surface, expected);

    fs::remove_file(&path).unwrap();

    assert_eq!(gpu.load_image(&path), None);
    let err = gpu.pop_error();
    assert_eq!(err.code, ErrorCode::FileNotFound);
    assert_eq!(&*err.function, "load_image");

    assert!(!gpu.save_image(image, "gpu2d-unknown.format", FileFormat::Auto));
    assert_eq!(gpu.pop_error().code, ErrorCode::Data);
}

#[test]
fn default_programs() {
    let (mut gpu, _) = setup();
    assert!(gpu.is_feature_enabled(Features::BASIC_SHADERS));

    // Two shaders and a program each.
    assert_eq!(gpu.current_shader_program(), 3);
    assert!(gpu.is_default_shader_program(3));
    assert!(gpu.is_default_shader_program(6));
    assert!(!gpu.is_default_shader_program(1));

    assert_eq!(gpu.attribute_location(3, "gpu_Vertex"), Some(0));
    assert_eq!(gpu.uniform_location(3, "gpu_ModelViewProjectionMatrix"), Some(3));
    assert_eq!(gpu.uniform_location(3, "missing"), Some(-1));

    let block = gpu.load_shader_block(3, &ShaderBlockNames::default()).unwrap();
    assert_eq!(block.position_loc, 0);
    assert_eq!(block.color_loc, 2);
}

#[test]
fn user_programs() {
    let (mut gpu, _) = setup();

    let vs = gpu
        .compile_shader(
            ShaderType::Vertex,
            "attribute vec2 position; uniform float time;",
        )
        .unwrap();
    let fs = gpu
        .compile_shader(ShaderType::Fragment, "uniform vec4 tint;")
        .unwrap();

    let program = gpu.link_shaders(vs, fs).unwrap();
    assert!(!gpu.is_default_shader_program(program));
    assert_eq!(gpu.attribute_location(program, "position"), Some(0));
    assert_eq!(gpu.uniform_location(program, "time"), Some(1));
    assert_eq!(gpu.uniform_location(program, "tint"), Some(2));

    gpu.activate_shader_program(program, None);
    assert_eq!(gpu.current_shader_program(), program);

    gpu.set_uniformf(1, 0.5);
    gpu.set_uniformfv(2, 4, &[1.0, 0.0, 0.0, 1.0]);
    assert_eq!(gpu.uniformfv(program, 1), Some(vec![0.5]));
    assert_eq!(gpu.uniformfv(program, 2), Some(vec![1.0, 0.0, 0.0, 1.0]));

    // Unknown locations are ignored.
    gpu.set_uniformi(-1, 7);
    assert_eq!(gpu.num_errors(), 0);

    gpu.deactivate_shader_program();
    assert_eq!(gpu.current_shader_program(), 3);

    gpu.free_shader_program(program);
    assert_eq!(gpu.uniform_location(program, "time"), None);
    assert_eq!(gpu.pop_error().code, ErrorCode::Data);
}

#[test]
fn link_failure() {
    let (mut gpu, _) = setup();
    let vs = gpu
        .compile_shader(ShaderType::Vertex, "attribute vec2 position;")
        .unwrap();

    let program = gpu.create_shader_program().unwrap();
    gpu.attach_shader(program, vs);
    assert!(!gpu.link_shader_program(program));
    assert!(gpu.shader_message().starts_with("Failed to link"));
    gpu.pop_error();

    assert_eq!(gpu.link_shaders(vs, vs), None);
    assert_eq!(gpu.pop_error().code, ErrorCode::Backend);

    // The program created for the failed link is gone.
    assert_eq!(gpu.uniform_location(program + 1, "position"), None);
    assert_eq!(gpu.pop_error().code, ErrorCode::Data);

    assert_eq!(gpu.compile_shader(ShaderType::Fragment, "  "), None);
    assert!(gpu.shader_message().contains("empty source"));

    assert_eq!(gpu.load_shader(ShaderType::Vertex, "does/not/exist.vert"), None);
    let err = gpu.pop_error();
    assert_eq!(err.code, ErrorCode::FileNotFound);
    assert!(err.details.contains("does/not/exist.vert"));
}

#[test]
fn unsupported() {
    let gl1 = RendererId::new(RendererFamily::OpenGL1, 1, 1);
    let mut registry = RendererRegistry::new();
    registry.register(Box::new(HeadlessFactory::impersonate(gl1)));

    let mut gpu = GpuSystem::with_registry(registry);
    gpu.set_renderer_order(&[gl1]);
    gpu.init(320, 240, WindowFlags::empty()).unwrap();

    assert!(!gpu.is_feature_enabled(Features::BASIC_SHADERS));
    assert!(gpu.is_feature_enabled(Features::RENDER_TARGETS));
    assert_eq!(gpu.current_shader_program(), 0);

    assert_eq!(gpu.compile_shader(ShaderType::Vertex, "attribute vec2 v;"), None);
    assert_eq!(gpu.pop_error().code, ErrorCode::UnsupportedFunction);

    assert_eq!(gpu.link_shaders(1, 2), None);
    let err = gpu.pop_error();
    assert_eq!(err.code, ErrorCode::UnsupportedFunction);
    assert_eq!(&*err.function, "link_shaders");

    let image = gpu.create_image(4, 4, ImageFormat::RGBA).unwrap();
    gpu.set_shader_image(image, 0, 1);
    assert_eq!(gpu.pop_error().code, ErrorCode::UnsupportedFunction);

    gpu.set_wrap_mode(image, WrapMode::Mirrored, WrapMode::Repeat);
    assert_eq!(gpu.num_errors(), 0);
}

#[test]
fn image_state() {
    let (mut gpu, screen) = setup();
    let image = gpu.create_image(4, 4, ImageFormat::RGBA).unwrap();

    gpu.set_rgba(image, 1, 2, 3, 4);
    assert_eq!(gpu.image_info(image).unwrap().color, Color::rgba(1, 2, 3, 4));
    gpu.unset_color(image);
    assert_eq!(gpu.image_info(image).unwrap().color, Color::WHITE);

    gpu.set_blend_mode(image, BlendPreset::Add);
    let mode = gpu.image_info(image).unwrap().blend_mode;
    assert_eq!(mode.dest_color, BlendFunc::One);
    assert_eq!(mode.color_equation, BlendEq::Add);

    gpu.set_blend_equation(image, BlendEq::Subtract, BlendEq::ReverseSubtract);
    let mode = gpu.image_info(image).unwrap().blend_mode;
    assert_eq!(mode.alpha_equation, BlendEq::ReverseSubtract);
    assert_eq!(mode.source_color, BlendFunc::SrcAlpha);

    assert_eq!(gpu.blending(image), Some(true));
    gpu.set_blending(image, false);
    assert_eq!(gpu.blending(image), Some(false));

    gpu.set_snap_mode(image, SnapMode::None);
    assert_eq!(gpu.snap_mode(image), Some(SnapMode::None));

    gpu.set_image_filter(image, FilterMode::Nearest);
    assert_eq!(gpu.image_info(image).unwrap().filter_mode, FilterMode::Nearest);

    gpu.set_shape_blend_mode(BlendPreset::Multiply);
    let ctx = gpu.target_info(screen).unwrap().context.unwrap();
    assert_eq!(ctx.shapes_blend_mode, BlendMode::from_preset(BlendPreset::Multiply));

    assert_eq!(gpu.num_errors(), 0);
}

#[test]
fn target_state() {
    let (mut gpu, screen) = setup();

    gpu.set_target_rgb(screen, 255, 0, 0);
    let target = gpu.target_info(screen).unwrap();
    assert!(target.use_color);
    assert_eq!(target.color, Color::rgb(255, 0, 0));

    gpu.set_target_color(screen, Color::WHITE);
    assert!(!gpu.target_info(screen).unwrap().use_color);

    let clip = gpu.set_clip(screen, 10, 10, 100, 50).unwrap();
    assert_eq!(clip, Rect::new(10.0, 10.0, 100.0, 50.0));
    assert!(gpu.target_info(screen).unwrap().use_clip_rect);
    gpu.unset_clip(screen);
    assert!(!gpu.target_info(screen).unwrap().use_clip_rect);

    gpu.set_viewport(screen, Rect::new(0.0, 0.0, 320.0, 240.0));
    assert_eq!(gpu.target_info(screen).unwrap().viewport.w, 320.0);
}

#[test]
fn blits() {
    let factory = HeadlessFactory::new();
    let journal = factory.journal();
    let mut registry = RendererRegistry::new();
    registry.register(Box::new(factory));

    let mut gpu = GpuSystem::with_registry(registry);
    gpu.set_renderer_order(&[headless()]);
    let screen = gpu.init(640, 480, WindowFlags::empty()).unwrap();
    let image = gpu.create_image(16, 16, ImageFormat::RGBA).unwrap();
    journal.clear();

    gpu.blit(image, None, screen, 1.0, 2.0);
    gpu.blit_rotate(image, None, screen, 1.0, 2.0, 90.0);
    gpu.blit_scale(image, None, screen, 1.0, 2.0, 2.0, 2.0);
    gpu.blit_transform(image, None, screen, 1.0, 2.0, 90.0, 2.0, 2.0);
    gpu.blit_transform_x(image, None, screen, 1.0, 2.0, 8.0, 8.0, 90.0, 2.0, 2.0);
    gpu.flush_blit_buffer();
    gpu.flip(screen);

    assert_eq!(gpu.num_errors(), 0);
    assert_eq!(journal.len(), 7);
}
