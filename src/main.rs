#[macro_use]
extern crate slog;

use clap::clap_app;
use handscene_rs::*;
use slog::Drain;
use tracker::HandTrackerEvent;
use winit::{
    dpi::{LogicalSize, Size},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

fn grid_arg_legal(val: String) -> Result<(), String> {
    match val.parse::<usize>() {
        Ok(side) if side >= 2 => Ok(()),
        Ok(_) => Err(String::from("grid side must be at least 2")),
        Err(_) => Err(String::from("could not parse grid side")),
    }
}

fn new_drain(level: slog::Level) -> slog::Fuse<slog::LevelFilter<slog::Fuse<slog_async::Async>>> {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    drain.filter_level(level).fuse()
}

fn main() {
    let info_drain = new_drain(slog::Level::Info);
    let drain = slog_atomic::AtomicSwitch::new(info_drain);
    let ctrl = drain.ctrl();
    let log = slog::Logger::root(drain.fuse(), o!());
    let mut trace_mode = false;

    let matches = clap_app!(handscene_rs =>
        (version: "1.0")
        (author: "Eric F. <eric1221bday@gmail.com>")
        (about: "Hand tracking mesh visualization")
        (@arg grid: -g --grid default_value("16") validator(grid_arg_legal) "Vertices per side of the synthetic hand grid")
        (@arg steady: --steady "Disable simulated tracking loss")
    )
    .get_matches();

    let side = matches.value_of("grid").unwrap().parse::<usize>().unwrap();
    let simulate_loss = !matches.is_present("steady");

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("handscene-rs")
        .with_inner_size(Size::Logical(LogicalSize::new(1280.0, 720.0)))
        .build(&event_loop)
        .unwrap();

    let mut viewer = futures::executor::block_on(viewer::Viewer::new(&log, &window)).unwrap();
    let mut tracker = tracker::SyntheticHandTracker::new(&log, side, simulate_loss);
    let mut pipeline = handscene::HandScenePipeline::new(&log);

    // The window stands in for the opaque rendering surface the tracking
    // subsystem hands us on attach.
    pipeline.on_attach(window.id(), &mut viewer);

    let mut last_update = std::time::Instant::now();
    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                WindowEvent::KeyboardInput { input, .. } => match input {
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(VirtualKeyCode::Escape),
                        ..
                    } => *control_flow = ControlFlow::Exit,
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(VirtualKeyCode::T),
                        ..
                    } => {
                        if trace_mode {
                            info!(log, "setting log level to info");
                            ctrl.set(new_drain(slog::Level::Info));
                        } else {
                            info!(log, "setting log level to trace");
                            ctrl.set(new_drain(slog::Level::Trace));
                        }
                        trace_mode = !trace_mode;
                    }
                    _ => {}
                },
                WindowEvent::Resized(physical_size) => {
                    viewer.resize(*physical_size);
                }
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    // new_inner_size is &mut so w have to dereference it twice
                    viewer.resize(**new_inner_size);
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let now = std::time::Instant::now();
                let dt = (now - last_update).as_secs_f32();
                last_update = now;

                for tracker_event in tracker.poll(dt) {
                    match tracker_event {
                        HandTrackerEvent::TopologyLoaded(topology) => {
                            pipeline.on_topology_loaded(topology, &mut viewer)
                        }
                        HandTrackerEvent::HandFound(detection) => {
                            pipeline.on_hand_found(&detection)
                        }
                        HandTrackerEvent::HandUpdated(detection) => {
                            pipeline.on_hand_updated(&detection)
                        }
                        HandTrackerEvent::HandLost => pipeline.on_hand_lost(),
                    }
                }

                viewer.render();
            }
            Event::MainEventsCleared => {
                // RedrawRequested will only trigger once, unless we manually
                // request it.
                window.request_redraw();
            }
            _ => {}
        }
    });
}
