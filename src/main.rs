use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use winit::{
    dpi::PhysicalSize,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, WindowBuilder},
};
use wgpu_offscreen_viewer::{config::ViewerConfig, State};

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = ViewerConfig::parse();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .build(&event_loop)
        .context("failed to create window")?;

    let mut state = State::new(window, config)?;
    let mut mouse_captured = false;

    event_loop.run(move |event, window_target| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if key_code == KeyCode::Escape {
                    if pressed {
                        mouse_captured = false;
                        if let Err(e) = state.window().set_cursor_grab(CursorGrabMode::None) {
                            log::warn!("Failed to release cursor: {e}");
                        }
                        state.window().set_cursor_visible(true);
                    }
                } else {
                    state.scene.process_keyboard(key_code, pressed);
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let window = state.window();
                match window
                    .set_cursor_grab(CursorGrabMode::Confined)
                    .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
                {
                    Ok(()) => {
                        mouse_captured = true;
                        window.set_cursor_visible(false);
                    }
                    Err(e) => log::warn!("Failed to grab cursor: {e}"),
                }
            }
            WindowEvent::CloseRequested => window_target.exit(),
            WindowEvent::Resized(new_size) => {
                state.resize(new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => match state.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::debug!("Surface lost or outdated, reconfiguring");
                    state.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of GPU memory, exiting");
                    window_target.exit();
                }
                Err(e) => log::warn!("Skipping frame: {e}"),
            },
            _ => {}
        },
        Event::DeviceEvent {
            event: DeviceEvent::MouseMotion { delta },
            ..
        } if mouse_captured => {
            state.scene.process_mouse(delta.0 as f32, delta.1 as f32);
        }
        Event::AboutToWait => {
            state.update();
            if !state.is_minimized() {
                state.window().request_redraw();
            }
        }
        _ => {}
    })?;

    Ok(())
}
