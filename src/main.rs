// What you SEE:
// • Left: a sidebar. Center: a striped "native" control embedded in the window.
// • An orange popup sits in the layered pane above it; the native control is
//   masked so the popup shows through.
// • Hold Left Mouse on the popup and drag: capture mode starts, the overlay
//   fakes the stacking while the popup moves, release restores real masking.
// • O toggles region outlines, S saves the current overlay snapshot, ESC quits.

use peer_shape::draw::{draw_crosshair, draw_region_outline, draw_text_5x7, Drawer};
use peer_shape::platform::{ComponentId, CursorIcon, Hierarchy};
use peer_shape::scene::Scene;
use peer_shape::{EmbedOptions, Embedding, Error, FrameBuffer, PeerHandle, Point, Rect, Region, Size};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const WIDTH: i32 = 640;
const HEIGHT: i32 = 400;
const SNAPSHOT_PATH: &str = "overlay-snapshot.png";

struct Frame {
    screen: FrameBuffer,
    visible: Region,
    surface_origin: Option<Point>,
    overlay: Option<Rect>,
    capturing: bool,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    /* --- Scene: window, sidebar, proxy for the native control, popup above it --- */
    let mut scene = Scene::new(Size::new(WIDTH, HEIGHT));
    let (_window, layered) = scene.add_window(Rect::new(0, 0, WIDTH, HEIGHT), 0x0030_3640);
    let content = scene.add_container(layered, Rect::new(0, 0, WIDTH, HEIGHT));
    scene.add_panel(content, Rect::new(0, 0, 140, HEIGHT), 0x0050_5a6e);
    let proxy = scene.add_proxy(content, Rect::new(160, 40, 440, 320));
    let popup = scene.add_panel(layered, Rect::new(430, 220, 180, 120), 0x00F0_8C28);
    scene.set_component_cursor(popup, CursorIcon::Move);
    let native = scene.add_native(0x0028_B478);

    let embedding = Embedding::spawn(scene, proxy, native, EmbedOptions::default())?;
    let peer = embedding.handle();
    peer.attach()?;

    let mut drawer = Drawer::new("Peer Shape - drag the popup", WIDTH as usize, HEIGHT as usize)?;

    let mut show_outlines = true;
    let mut drag_from: Option<Point> = None;
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let mouse = drawer.mouse_pos();

        /* 1) Drag handling: press on popup starts capture, release stops it. */
        match (drawer.left_mouse_down(), drag_from, mouse) {
            (true, None, Some(at)) => {
                // The overlay copies the cursor under the pointer, so the scene needs to know where it is.
                let hit = peer.with(move |p| {
                    p.host_mut().set_pointer(at);
                    p.host().component_at(at)
                })?;
                if hit == Some(popup) {
                    if let Err(e) = peer.start_capture() {
                        tracing::warn!(error = %e, "dragging without capture overlay");
                    }
                    drag_from = Some(at);
                }
            }
            (true, Some(from), Some(at)) if at != from => {
                move_popup(&peer, popup, at - from)?;
                drag_from = Some(at);
            }
            (false, Some(_), _) => {
                peer.stop_capture()?;
                drag_from = None;
            }
            _ => {}
        }

        if drawer.o_pressed_once() {
            show_outlines = !show_outlines;
        }
        if drawer.s_pressed_once() {
            save_snapshot(&peer)?;
        }

        /* 2) Composite the scene on the UI thread and grab what we need for the HUD. */
        let mut frame = peer.with(|p| {
            p.host_mut().tick();
            Frame {
                screen: p.host().render(),
                visible: p.visible_region().clone(),
                surface_origin: p.surface_id().map(|s| p.host().location_on_screen(s)),
                overlay: p.overlay().map(|o| p.host().bounds(o.id).with_origin(p.host().location_on_screen(o.id))),
                capturing: p.is_capturing(),
            }
        })?;

        /* 3) Outlines, crosshair, HUD */
        if show_outlines {
            if let Some(origin) = frame.surface_origin {
                draw_region_outline(&mut frame.screen, &frame.visible, origin, 0x00FF_FFFF);
            }
            if let Some(overlay) = frame.overlay {
                draw_region_outline(&mut frame.screen, &Region::from_rects([overlay]), Point::ORIGIN, 0x00FF_3366);
            }
        }
        if let Some(at) = mouse {
            draw_crosshair(&mut frame.screen, at.x, at.y, 8, 0x00FF_CC33);
        }
        let status = if frame.capturing { "CAPTURING" } else { "IDLE" };
        let hud = format!("{} | RECTS: {}", status, frame.visible.len());
        draw_text_5x7(&mut frame.screen, 8, 8, &hud, 0x00FF_FFFF);

        drawer.present(&frame.screen)?;

        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / now.duration_since(last_fps_time).as_secs_f32();
            tracing::debug!(fps = format!("{fps:.1}"), "frame rate");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    peer.destroy()?;
    embedding.shutdown()?;
    Ok(())
}

/// Siblings moving don't raise hierarchy events on the proxy, so ask for a recompute.
fn move_popup(peer: &PeerHandle<Scene>, popup: ComponentId, delta: Point) -> Result<(), Error> {
    peer.with(move |p| p.host_mut().move_by(popup, delta.x, delta.y))?;
    peer.schedule_shape_update();
    Ok(())
}

fn save_snapshot(peer: &PeerHandle<Scene>) -> Result<(), Error> {
    let Some(snapshot) = peer.with(|p| p.overlay().map(|o| o.snapshot.clone()))? else {
        tracing::info!("no capture overlay to save");
        return Ok(());
    };
    match snapshot.to_rgb_image().save(SNAPSHOT_PATH) {
        Ok(()) => tracing::info!(path = SNAPSHOT_PATH, "overlay snapshot saved"),
        Err(e) => tracing::warn!(error = %e, "could not save overlay snapshot"),
    }
    Ok(())
}
