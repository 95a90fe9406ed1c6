// End-to-end: engine on its UI thread, driven through the handle against the reference scene.

use peer_shape::platform::{ComponentId, CursorIcon, Hierarchy, HierarchyEvent, Masking};
use peer_shape::scene::Scene;
use peer_shape::{CaptureError, EmbedOptions, Embedding, Error, Filiation, PeerHandle, Point, Rect, Region, Size};
use std::sync::mpsc;

const SIBLING: u32 = 0x00FF_0000;

struct Ids {
    group: ComponentId,
    proxy: ComponentId,
    sibling: ComponentId,
    native: ComponentId,
}

/// Window at (10,20) 300x200. Inside the content pane a group holds the proxy
/// (0,0,200,100) and an opaque sibling (150,0,100,100) stacked above it.
fn build() -> (Scene, Ids) {
    let mut scene = Scene::new(Size::new(400, 300));
    let (_window, layered) = scene.add_window(Rect::new(10, 20, 300, 200), 0x0011_1111);
    let content = scene.add_container(layered, Rect::new(0, 0, 300, 200));
    let group = scene.add_container(content, Rect::new(0, 0, 260, 150));
    let proxy = scene.add_proxy(group, Rect::new(0, 0, 200, 100));
    let sibling = scene.add_panel(group, Rect::new(150, 0, 100, 100), SIBLING);
    let native = scene.add_native(0x0000_FF00);
    (scene, Ids { group, proxy, sibling, native })
}

fn spawn(options: EmbedOptions) -> (Embedding<Scene>, PeerHandle<Scene>, Ids) {
    let (scene, ids) = build();
    let embedding = Embedding::spawn(scene, ids.proxy, ids.native, options).unwrap();
    let handle = embedding.handle();
    handle.attach().unwrap();
    (embedding, handle, ids)
}

fn region(rects: &[Rect]) -> Region {
    Region::from_rects(rects.iter().copied())
}

fn surface_of(handle: &PeerHandle<Scene>) -> ComponentId {
    handle.with(|p| p.surface_id()).unwrap().unwrap()
}

/// Park the UI thread until the returned sender is dropped or used.
fn block_ui(handle: &PeerHandle<Scene>) -> mpsc::Sender<()> {
    let (tx, rx) = mpsc::channel::<()>();
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let blocker = handle.clone();
    std::thread::spawn(move || {
        let _ = blocker.with(move |_| {
            let _ = started_tx.send(());
            let _ = rx.recv();
        });
    });
    started_rx.recv().unwrap();
    tx
}

#[test]
fn capture_scenario_from_start_to_stop() {
    let (embedding, handle, _) = spawn(EmbedOptions::default());
    let surface = surface_of(&handle);
    assert_eq!(handle.visible_region().unwrap(), region(&[Rect::new(0, 0, 150, 100)]));

    handle.start_capture().unwrap();
    assert!(handle.is_capturing().unwrap());
    let (captures, native_mask, overlays) = handle
        .with(move |p| (p.host().captures().to_vec(), p.host().mask_of(surface).cloned(), p.host().overlays()))
        .unwrap();
    assert_eq!(captures, vec![Rect::new(160, 20, 50, 100)]);
    assert_eq!(native_mask, None);
    assert_eq!(overlays.len(), 1);

    handle.stop_capture().unwrap();
    let (native_mask, overlays) = handle.with(move |p| (p.host().mask_of(surface).cloned(), p.host().overlays())).unwrap();
    assert_eq!(native_mask, Some(region(&[Rect::new(0, 0, 150, 100)])));
    assert!(overlays.is_empty());

    // Second stop is a no-op.
    let log_len = handle.with(|p| p.host().mask_log().len()).unwrap();
    handle.stop_capture().unwrap();
    assert_eq!(handle.with(|p| p.host().mask_log().len()).unwrap(), log_len);

    embedding.shutdown().unwrap();
}

#[test]
fn no_occlusion_means_no_overlay_but_cleared_mask() {
    let (embedding, handle, ids) = spawn(EmbedOptions::default());
    let surface = surface_of(&handle);
    let sibling = ids.sibling;
    handle.with(move |p| p.host_mut().move_to(sibling, Rect::new(0, 120, 50, 20))).unwrap();
    handle.schedule_shape_update();
    assert_eq!(handle.visible_region().unwrap(), region(&[Rect::new(0, 0, 200, 100)]));

    handle.start_capture().unwrap();
    let (overlay, captures, last) = handle
        .with(move |p| (p.overlay().cloned(), p.host().captures().len(), p.host().mask_log().last().cloned()))
        .unwrap();
    assert!(overlay.is_none());
    assert_eq!(captures, 0);
    assert_eq!(last, Some((surface, None)));
    assert!(handle.is_capturing().unwrap());

    embedding.shutdown().unwrap();
}

#[test]
fn moving_the_surface_under_capture_moves_only_the_overlay_mask() {
    let (embedding, handle, ids) = spawn(EmbedOptions::default());
    handle.start_capture().unwrap();
    let before = handle.with(|p| p.overlay().cloned()).unwrap().unwrap();
    assert_eq!(
        handle.with(move |p| p.host().mask_of(before.id).cloned()).unwrap(),
        Some(region(&[Rect::new(0, 0, 50, 100)]))
    );

    // Moving the group drags proxy and sibling together; the surface follows, the overlay stays.
    let group = ids.group;
    handle.with(move |p| p.host_mut().move_by(group, 20, 10)).unwrap();
    let overlay_id = before.id;
    let (visible, overlay, overlay_mask, captures) = handle
        .with(move |p| {
            (
                p.visible_region().clone(),
                p.overlay().cloned(),
                p.host().mask_of(overlay_id).cloned(),
                p.host().captures().len(),
            )
        })
        .unwrap();

    assert_eq!(visible, region(&[Rect::new(0, 0, 150, 100)]));
    assert_eq!(overlay_mask, Some(region(&[Rect::new(0, 0, 50, 10), Rect::new(20, 10, 30, 90)])));
    let overlay = overlay.unwrap();
    assert_eq!(overlay.snapshot, before.snapshot);
    assert!(overlay.snapshot.pixels.iter().all(|px| *px == SIBLING));
    assert_eq!(captures, 1);

    embedding.shutdown().unwrap();
}

#[test]
fn triggers_are_coalesced_into_one_recompute() {
    let (embedding, handle, ids) = spawn(EmbedOptions::default());
    let surface = surface_of(&handle);
    let updates_before = handle.with(move |p| p.host().mask_updates(surface)).unwrap();

    let release = block_ui(&handle);
    assert!(handle.schedule_shape_update());
    for _ in 0..10 {
        handle.notify(HierarchyEvent::AncestorResized);
        assert!(!handle.schedule_shape_update());
    }
    drop(release);

    // The single queued recompute found nothing to change; the next one does.
    let sibling = ids.sibling;
    handle.with(move |p| p.host_mut().move_by(sibling, 10, 0)).unwrap();
    assert!(handle.schedule_shape_update());

    let (visible, updates) = handle.with(move |p| (p.visible_region().clone(), p.host().mask_updates(surface))).unwrap();
    assert_eq!(visible, region(&[Rect::new(0, 0, 160, 100)]));
    assert_eq!(updates, updates_before + 1);

    embedding.shutdown().unwrap();
}

#[test]
fn window_moves_are_ignored() {
    let (embedding, handle, _) = spawn(EmbedOptions::default());
    let release = block_ui(&handle);
    handle.notify(HierarchyEvent::AncestorMoved { changed_is_window: true });
    assert!(handle.schedule_shape_update(), "a window move must not queue a recompute");
    drop(release);
    embedding.shutdown().unwrap();
}

#[test]
fn settled_region_matches_final_geometry() {
    let (embedding, handle, ids) = spawn(EmbedOptions::default());
    let (group, proxy, sibling) = (ids.group, ids.proxy, ids.sibling);
    handle
        .with(move |p| {
            let host = p.host_mut();
            host.move_by(group, 5, 3);
            host.move_to(proxy, Rect::new(10, 10, 220, 120));
            host.move_by(group, -2, 0);
            host.move_to(sibling, Rect::new(100, 50, 40, 40));
        })
        .unwrap();
    handle.schedule_shape_update();

    let (settled, direct, log_len, again, log_after) = handle
        .with(|p| {
            let settled = p.visible_region().clone();
            let direct = p.compute_peer_shape();
            let log_len = p.host().mask_log().len();
            let again = p.adjust_peer_shape();
            (settled, direct, log_len, again, p.host().mask_log().len())
        })
        .unwrap();
    assert_eq!(settled, direct);
    assert!(!again);
    assert_eq!(log_len, log_after);

    embedding.shutdown().unwrap();
}

#[test]
fn capture_failure_rolls_back_to_idle() {
    let (embedding, handle, _) = spawn(EmbedOptions::default().filiation(Filiation::Direct));
    let surface = surface_of(&handle);
    handle.with(|p| p.host_mut().deny_capture(Some("screen recording not permitted"))).unwrap();

    let err = handle.start_capture().unwrap_err();
    assert!(matches!(err, Error::Capture(CaptureError::Denied(_))));
    assert!(!handle.is_capturing().unwrap());
    let (overlays, mask) = handle.with(move |p| (p.host().overlays(), p.host().mask_of(surface).cloned())).unwrap();
    assert!(overlays.is_empty());
    assert_eq!(mask, Some(region(&[Rect::new(0, 0, 150, 100)])));

    // Unrelated work carries on.
    handle.with(|p| p.host_mut().deny_capture(None)).unwrap();
    handle.start_capture().unwrap();
    assert!(handle.is_capturing().unwrap());

    embedding.shutdown().unwrap();
}

#[test]
fn press_on_native_selects_enclosing_internal_frame() {
    let mut scene = Scene::new(Size::new(400, 300));
    let (window, layered) = scene.add_window(Rect::new(0, 0, 400, 300), 0);
    let frame = scene.add_internal_frame(layered, Rect::new(20, 20, 300, 200), 0x0044_4444);
    let proxy = scene.add_proxy(frame, Rect::new(10, 10, 100, 80));
    let native = scene.add_native(0x0000_FF00);
    let embedding = Embedding::spawn(scene, proxy, native, EmbedOptions::default().filiation(Filiation::Direct)).unwrap();
    let handle = embedding.handle();
    handle.attach().unwrap();

    let hit = handle.with(|p| p.host_mut().press_primary(Point::new(50, 50))).unwrap();
    assert_eq!(hit, Some(native));
    let (selected, selections, focusable) = handle
        .with(move |p| {
            use peer_shape::platform::FocusRouting;
            (p.host().is_frame_selected(frame), p.host().selections().to_vec(), p.host().focusable_window_state(window))
        })
        .unwrap();
    assert!(selected);
    assert_eq!(selections, vec![(frame, false)]);
    assert!(focusable);

    embedding.shutdown().unwrap();
}

#[test]
fn vetoed_selection_still_restores_window_focusability() {
    let mut scene = Scene::new(Size::new(400, 300));
    let (window, layered) = scene.add_window(Rect::new(0, 0, 400, 300), 0);
    let frame = scene.add_internal_frame(layered, Rect::new(20, 20, 300, 200), 0x0044_4444);
    scene.set_frame_veto(frame, true);
    let proxy = scene.add_proxy(frame, Rect::new(10, 10, 100, 80));
    let native = scene.add_native(0x0000_FF00);
    let embedding = Embedding::spawn(scene, proxy, native, EmbedOptions::default()).unwrap();
    let handle = embedding.handle();
    handle.attach().unwrap();

    handle.with(|p| p.host_mut().press_primary(Point::new(50, 50))).unwrap();
    let (selected, focusable) = handle
        .with(move |p| {
            use peer_shape::platform::FocusRouting;
            (p.host().is_frame_selected(frame), p.host().focusable_window_state(window))
        })
        .unwrap();
    assert!(!selected);
    assert!(focusable);

    embedding.shutdown().unwrap();
}

#[test]
fn proxy_focus_moves_to_native() {
    let (embedding, handle, ids) = spawn(EmbedOptions::default());
    let proxy = ids.proxy;
    handle.with(move |p| p.host_mut().focus(proxy)).unwrap();
    assert_eq!(handle.with(|p| p.host().focused()).unwrap(), Some(ids.native));
    embedding.shutdown().unwrap();
}

#[test]
fn destroy_tears_everything_down() {
    let (embedding, handle, ids) = spawn(EmbedOptions::default());
    let surface = surface_of(&handle);
    handle.start_capture().unwrap();
    handle.destroy().unwrap();
    handle.destroy().unwrap();

    let peer = embedding.shutdown().unwrap();
    let host = peer.host();
    assert!(!host.exists(surface));
    assert!(host.overlays().is_empty());
    assert_eq!(host.listener_count(), 0);
    assert_eq!(host.parent(ids.native), None);
    assert!(!peer.is_capturing());
}

#[test]
fn configuration_errors_surface_through_the_handle() {
    let mut scene = Scene::new(Size::new(100, 100));
    let window = scene.add_plain_window(Rect::new(0, 0, 100, 100), 0);
    let proxy = scene.add_proxy(window, Rect::new(0, 0, 50, 50));
    let native = scene.add_native(0);
    let embedding = Embedding::spawn(scene, proxy, native, EmbedOptions::default()).unwrap();
    assert!(matches!(embedding.handle().attach(), Err(Error::Configuration(_))));
    embedding.shutdown().unwrap();
}

#[test]
fn reattach_after_destroy_masks_the_new_surface() {
    let (embedding, handle, _) = spawn(EmbedOptions::default());
    handle.destroy().unwrap();
    handle.attach().unwrap();

    let surface = surface_of(&handle);
    let (visible, mask, shown, over_sibling) = handle
        .with(move |p| {
            let screen = p.host().render();
            // (180,70) on screen is inside the sibling, over the right part of the proxy.
            let px = screen.pixels[70 * screen.width + 180];
            (p.visible_region().clone(), p.host().mask_of(surface).cloned(), p.host().is_visible(surface), px)
        })
        .unwrap();
    assert_eq!(visible, region(&[Rect::new(0, 0, 150, 100)]));
    assert_eq!(mask, Some(visible));
    assert!(shown);
    assert_eq!(over_sibling, SIBLING);

    embedding.shutdown().unwrap();
}

#[test]
fn overlay_takes_the_cursor_under_the_pointer() {
    let (embedding, handle, ids) = spawn(EmbedOptions::default());
    let sibling = ids.sibling;
    handle
        .with(move |p| {
            let host = p.host_mut();
            host.set_component_cursor(sibling, CursorIcon::Move);
            // Screen point inside the sibling: window (10,20) + sibling (150,0) + (40,30).
            host.set_pointer(Point::new(200, 50));
        })
        .unwrap();

    handle.start_capture().unwrap();
    let (cursor, image, snapshot) = handle
        .with(|p| {
            let overlay = p.overlay().cloned().unwrap();
            (p.host().cursor_of(overlay.id), p.host().overlay_image(overlay.id).cloned(), overlay.snapshot)
        })
        .unwrap();
    assert_eq!(cursor, CursorIcon::Move);
    assert_eq!(image, Some(snapshot));

    embedding.shutdown().unwrap();
}

#[test]
fn pointer_outside_the_window_leaves_the_default_cursor() {
    let (embedding, handle, ids) = spawn(EmbedOptions::default());
    let sibling = ids.sibling;
    handle
        .with(move |p| {
            p.host_mut().set_component_cursor(sibling, CursorIcon::Move);
            p.host_mut().set_pointer(Point::new(390, 290));
        })
        .unwrap();

    handle.start_capture().unwrap();
    let cursor = handle.with(|p| p.overlay().map(|o| p.host().cursor_of(o.id))).unwrap();
    assert_eq!(cursor, Some(CursorIcon::Default));

    embedding.shutdown().unwrap();
}

#[test]
fn capture_is_clipped_to_the_window() {
    // The proxy runs 100px past the window's right edge; the sibling straddles it.
    let mut scene = Scene::new(Size::new(400, 300));
    let (_window, layered) = scene.add_window(Rect::new(10, 20, 300, 200), 0x0011_1111);
    let content = scene.add_container(layered, Rect::new(0, 0, 300, 200));
    let proxy = scene.add_proxy(content, Rect::new(200, 0, 200, 100));
    scene.add_panel(content, Rect::new(250, 0, 100, 100), SIBLING);
    let native = scene.add_native(0x0000_FF00);
    let embedding = Embedding::spawn(scene, proxy, native, EmbedOptions::default()).unwrap();
    let handle = embedding.handle();
    handle.attach().unwrap();
    assert_eq!(handle.visible_region().unwrap(), region(&[Rect::new(0, 0, 50, 100)]));

    handle.start_capture().unwrap();
    let surface = surface_of(&handle);
    let (captures, overlay, stacking, overlay_mask) = handle
        .with(move |p| {
            let overlay = p.overlay().cloned().unwrap();
            let parent = p.host().parent(surface).unwrap();
            let mask = p.host().mask_of(overlay.id).cloned();
            (p.host().captures().to_vec(), overlay, p.host().children(parent), mask)
        })
        .unwrap();

    // Occluded bounds (50,0,150,100) at screen (260,20) are cut at the window edge x=310.
    assert_eq!(captures, vec![Rect::new(260, 20, 50, 100)]);
    assert_eq!(overlay.bounds, Rect::new(250, 0, 50, 100));
    assert_eq!((overlay.snapshot.width, overlay.snapshot.height), (50, 100));
    assert_eq!(overlay_mask, Some(region(&[Rect::new(0, 0, 50, 100)])));

    // Stacked directly above the surface in the same parent.
    let at = |id: ComponentId| stacking.iter().position(|c| *c == id).unwrap();
    assert_eq!(at(overlay.id) + 1, at(surface));

    embedding.shutdown().unwrap();
}
