#![cfg(feature = "headless")]

extern crate env_logger;
extern crate gpu2d;

use gpu2d::backends::headless::{Call, HeadlessFactory, Journal};
use gpu2d::prelude::*;

fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn gl3() -> RendererId {
    RendererId::new(RendererFamily::OpenGL3, 3, 0)
}

fn gl2() -> RendererId {
    RendererId::new(RendererFamily::OpenGL2, 2, 0)
}

fn headless() -> RendererId {
    RendererId::new(RendererFamily::Headless, 1, 0)
}

/// OpenGL 3 fails to create its window, OpenGL 2 fails to create at all and
/// only the headless renderer works.
fn system(journal: &Journal) -> GpuSystem {
    let mut registry = RendererRegistry::new();
    registry.register(Box::new(
        HeadlessFactory::impersonate(gl3())
            .failing()
            .with_journal(journal.clone()),
    ));
    registry.register(Box::new(
        HeadlessFactory::impersonate(gl2())
            .refusing()
            .with_journal(journal.clone()),
    ));
    registry.register(Box::new(HeadlessFactory::new().with_journal(journal.clone())));

    let mut gpu = GpuSystem::with_registry(registry);
    gpu.set_debug_level(DebugLevel::Level1);
    gpu
}

fn family_of(call: &Call) -> Option<(&'static str, RendererFamily)> {
    match *call {
        Call::Create(v) => Some(("create", v.family)),
        Call::Destroy(v) => Some(("destroy", v.family)),
        Call::Init(v) => Some(("init", v.family)),
        Call::Quit(v) => Some(("quit", v.family)),
        _ => None,
    }
}

#[test]
fn first_working_candidate() {
    setup();

    let journal = Journal::new();
    let mut gpu = system(&journal);
    gpu.set_renderer_order(&[gl3(), gl2(), headless()]);

    let screen = gpu.init(640, 480, WindowFlags::empty()).unwrap();
    assert_eq!(gpu.num_errors(), 0);

    assert_eq!(gpu.num_active_renderers(), 1);
    assert_eq!(gpu.active_renderers(), vec![headless().with_index(0)]);
    assert_eq!(gpu.current_renderer(), Some(headless().with_index(0)));
    assert_eq!(gpu.context_target(), Some(screen));
    assert_eq!(gpu.window_target(1), Some(screen));

    let lifecycle: Vec<_> = journal.calls().iter().filter_map(family_of).collect();
    assert_eq!(
        lifecycle,
        vec![
            ("create", RendererFamily::OpenGL3),
            ("quit", RendererFamily::OpenGL3),
            ("destroy", RendererFamily::OpenGL3),
            ("create", RendererFamily::Headless),
            ("init", RendererFamily::Headless),
        ]
    );

    gpu.quit();
    assert_eq!(gpu.num_active_renderers(), 0);
    assert_eq!(gpu.current_renderer(), None);
    assert_eq!(gpu.window_target(1), None);
    assert_eq!(
        journal.count(|v| *v == Call::Destroy(headless().with_index(0))),
        1
    );
}

#[test]
fn no_working_candidate() {
    setup();

    let journal = Journal::new();
    let mut gpu = system(&journal);
    gpu.set_renderer_order(&[gl3(), gl2(), RendererId::new(RendererFamily::GLES3, 3, 0)]);

    assert_eq!(gpu.init(640, 480, WindowFlags::empty()), None);
    assert_eq!(gpu.num_active_renderers(), 0);
    assert_eq!(gpu.current_renderer(), None);

    // Single candidates only log, the exhaustion is reported once.
    assert_eq!(gpu.num_errors(), 1);
    let err = gpu.pop_error();
    assert_eq!(err.code, ErrorCode::Backend);
    assert_eq!(&*err.function, "init");
    assert!(err.details.starts_with("No renderer out of 3"));
    assert!(err.details.contains("OpenGL 3 3.0"));
    assert!(err.details.contains("OpenGLES 3 3.0"));

    let created = journal.count(|v| match *v {
        Call::Create(_) => true,
        _ => false,
    });
    let destroyed = journal.count(|v| match *v {
        Call::Destroy(_) => true,
        _ => false,
    });
    assert_eq!(created, destroyed);
}

#[test]
fn frozen_order() {
    setup();

    let journal = Journal::new();
    let mut gpu = system(&journal);
    gpu.set_renderer_order(&[headless()]);
    gpu.init(320, 240, WindowFlags::empty()).unwrap();

    gpu.set_renderer_order(&[gl3()]);
    assert_eq!(gpu.renderer_order(), &[headless()]);

    let err = gpu.pop_error();
    assert_eq!(err.code, ErrorCode::User);
    assert_eq!(&*err.function, "set_renderer_order");
}

#[test]
fn init_renderer() {
    setup();

    let journal = Journal::new();
    let mut gpu = system(&journal);

    assert_eq!(gpu.init_renderer(RendererFamily::OpenGL4, 320, 240, WindowFlags::empty()), None);
    assert_eq!(gpu.pop_error().code, ErrorCode::Backend);

    assert_eq!(gpu.init_renderer_by_id(gl3(), 320, 240, WindowFlags::empty()), None);
    let err = gpu.pop_error();
    assert_eq!(&*err.function, "init_renderer_by_id");
    assert_eq!(gpu.num_active_renderers(), 0);

    let screen = gpu.init_renderer(RendererFamily::Headless, 320, 240, WindowFlags::empty());
    assert!(screen.is_some());
    assert_eq!(gpu.renderer_id(RendererFamily::Headless), Some(headless()));
}

#[test]
fn several_renderers() {
    setup();

    let mut gpu = GpuSystem::new();
    let first = gpu.init_renderer_by_id(headless(), 320, 240, WindowFlags::empty()).unwrap();
    gpu.set_init_window(2);
    gpu.init_renderer_by_id(headless(), 640, 480, WindowFlags::empty()).unwrap();
    assert_eq!(gpu.num_active_renderers(), 2);
    assert_eq!(gpu.num_errors(), 0);
    assert_eq!(gpu.current_renderer(), Some(headless().with_index(1)));

    // Lookups match on family and version, so the first instance wins.
    gpu.set_current_renderer(headless());
    assert_eq!(gpu.current_renderer(), Some(headless().with_index(0)));
    assert_eq!(gpu.context_target(), Some(first));

    gpu.close_current_renderer();
    assert_eq!(gpu.current_renderer(), None);
    assert_eq!(gpu.num_active_renderers(), 1);

    gpu.set_current_renderer(gl3());
    assert_eq!(gpu.current_renderer(), None);
}

#[test]
fn required_features() {
    setup();

    let mut registry = RendererRegistry::new();
    registry.register(Box::new(HeadlessFactory::impersonate(
        RendererId::new(RendererFamily::OpenGL1, 1, 1),
    )));
    registry.register(Box::new(HeadlessFactory::new()));

    let mut gpu = GpuSystem::with_registry(registry);
    gpu.set_renderer_order(&[
        RendererId::new(RendererFamily::OpenGL1, 1, 1),
        headless(),
    ]);
    gpu.set_required_features(Features::BASIC_SHADERS);

    gpu.init(320, 240, WindowFlags::empty()).unwrap();
    assert_eq!(gpu.current_renderer().unwrap().family, RendererFamily::Headless);
    assert!(gpu.is_feature_enabled(Features::BASIC_SHADERS));
}

#[test]
fn init_window() {
    setup();

    let mut gpu = GpuSystem::new();
    gpu.set_init_window(7);
    let screen = gpu.init(320, 240, WindowFlags::empty()).unwrap();

    assert_eq!(gpu.init_window(), 0);
    assert_eq!(gpu.window_target(7), Some(screen));
    assert_eq!(gpu.target_info(screen).unwrap().context.unwrap().window_id, 7);
}

#[test]
fn settings() {
    setup();

    let settings = Settings::from_json(
        r#"{
            "renderer_order": [{ "family": "Headless", "major_version": 1, "minor_version": 0 }],
            "debug_level": 1,
            "window": { "width": 320, "height": 200 }
        }"#,
    )
    .unwrap();

    let mut gpu = GpuSystem::from_settings(settings);
    assert_eq!(gpu.debug_level(), DebugLevel::Level1);
    assert_eq!(gpu.renderer_order(), &[headless()]);

    let screen = gpu.init_with_settings().unwrap();
    let target = gpu.target_info(screen).unwrap();
    assert_eq!((target.w, target.h), (320, 200));
}
