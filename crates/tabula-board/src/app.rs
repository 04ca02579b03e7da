//! The whiteboard application: input dispatch, board state, and the
//! per-frame render sequence.

use std::path::PathBuf;

use anyhow::Result;

use tabula_engine::core::{App, AppControl, FrameCtx};
use tabula_engine::coords::{Vec2, Viewport};
use tabula_engine::input::{
    InputEvent, Key, KeyState, MouseButton, MouseButtonState, MouseWheelDelta,
    PointerButtonEvent, PointerMoveEvent,
};
use tabula_engine::paint::Color;

use crate::batch::Batch;
use crate::camera::{Camera, WHEEL_LINE_PX};
use crate::picture::{self, Pixels};
use crate::pipeline::{self, CameraBinding, PictureVertex, StrokeVertex};
use crate::renderer::{PassLoad, Renderer};
use crate::stroke::{RibbonQuad, StrokeBuilder};

/// Stroke half-width in screen pixels.
const STROKE_HALF_WIDTH_PX: f32 = 5.0;

/// Stroke batch capacity. Quads use 4 vertices per 6 indices, so index
/// capacity is sized at 1.5× the vertex capacity.
const STROKE_MAX_VERTICES: u64 = 1 << 16;
const STROKE_MAX_INDICES: u64 = STROKE_MAX_VERTICES / 2 * 3;

/// Active pointer gesture. Pan and draw are mutually exclusive.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Gesture {
    Idle,
    Draw,
    Pan,
}

/// What an input event asks the app to do, beyond mutating board state.
///
/// Geometry comes out as plain floats so state transitions stay testable
/// without a GPU.
#[derive(Debug, PartialEq)]
enum Action {
    None,
    /// A ribbon quad in world coordinates, ready for the stroke batch.
    StrokeQuad([f32; 8]),
    PlaceFile(PathBuf),
    PlaceClipboard,
}

/// Explicit board state shared by all input handlers.
struct BoardState {
    camera: Camera,
    camera_dirty: bool,
    stroke: StrokeBuilder,
    gesture: Gesture,
    /// Last known pointer position in logical pixels.
    pointer: Option<Vec2>,
    space_down: bool,
}

impl BoardState {
    fn new() -> Self {
        Self {
            camera: Camera::new(),
            camera_dirty: true, // initial matrix needs one upload
            stroke: StrokeBuilder::new(STROKE_HALF_WIDTH_PX),
            gesture: Gesture::Idle,
            pointer: None,
            space_down: false,
        }
    }

    /// Applies one input event, returning the action it triggers.
    fn apply(&mut self, ev: &InputEvent, viewport: Viewport) -> Action {
        match ev {
            InputEvent::Key { key: Key::Space, state, .. } => {
                self.space_down = *state == KeyState::Pressed;
                Action::None
            }

            InputEvent::Key {
                key: Key::V,
                state: KeyState::Pressed,
                repeat: false,
                ..
            } => Action::PlaceClipboard,

            InputEvent::FileDropped(path) => Action::PlaceFile(path.clone()),

            InputEvent::PointerButton(ev) => self.pointer_button(ev),

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_moved(Vec2::new(*x, *y), viewport)
            }

            InputEvent::MouseWheel { delta, .. } => {
                // Zoom is locked out mid-draw: the ribbon's carried edge is
                // converted to world space through the camera, and moving the
                // camera between two drag points would tear the seam.
                if self.gesture == Gesture::Draw {
                    return Action::None;
                }
                let dy = match delta {
                    MouseWheelDelta::Line { y, .. } => y * WHEEL_LINE_PX,
                    MouseWheelDelta::Pixel { y, .. } => *y,
                };
                let anchor = self.pointer.unwrap_or(viewport_center(viewport));
                self.camera.zoom_at(viewport.px_to_ndc(anchor), dy);
                self.camera_dirty = true;
                Action::None
            }

            InputEvent::PointerLeft => {
                self.pointer = None;
                Action::None
            }

            InputEvent::Focused(false) => {
                // The Space release never arrives once focus is gone.
                self.space_down = false;
                self.end_stroke();
                Action::None
            }

            _ => Action::None,
        }
    }

    fn pointer_button(&mut self, ev: &PointerButtonEvent) -> Action {
        let pos = Vec2::new(ev.x, ev.y);
        self.pointer = Some(pos);

        match (ev.button, ev.state) {
            (MouseButton::Left, MouseButtonState::Pressed) => {
                if self.space_down {
                    self.gesture = Gesture::Pan;
                } else {
                    self.gesture = Gesture::Draw;
                    self.stroke.reset();
                    self.stroke.feed(pos);
                }
            }

            (MouseButton::Right, MouseButtonState::Pressed) => {
                self.gesture = Gesture::Pan;
            }

            (MouseButton::Left, MouseButtonState::Released)
            | (MouseButton::Right, MouseButtonState::Released) => {
                self.end_stroke();
            }

            _ => {}
        }

        Action::None
    }

    fn pointer_moved(&mut self, pos: Vec2, viewport: Viewport) -> Action {
        let last = self.pointer.replace(pos);

        match self.gesture {
            Gesture::Pan => {
                if let Some(last) = last {
                    self.camera.pan(viewport.px_delta_to_ndc(pos - last));
                    self.camera_dirty = true;
                }
                Action::None
            }

            Gesture::Draw => match self.stroke.feed(pos) {
                Some(quad) => Action::StrokeQuad(self.quad_to_world(&quad, viewport)),
                None => Action::None,
            },

            Gesture::Idle => Action::None,
        }
    }

    /// Converts an emitted pixel-space quad into world coordinates.
    ///
    /// The camera cannot move mid-stroke (panning is a separate gesture and
    /// wheel zoom is ignored while drawing), so shared ribbon edges stay
    /// shared after conversion.
    fn quad_to_world(&self, quad: &RibbonQuad, viewport: Viewport) -> [f32; 8] {
        let mut out = [0.0f32; 8];
        for (i, corner) in quad.corners.iter().enumerate() {
            let w = self.camera.screen_to_world(*corner, viewport);
            out[i * 2] = w.x;
            out[i * 2 + 1] = w.y;
        }
        out
    }

    fn end_stroke(&mut self) {
        self.stroke.reset();
        self.gesture = Gesture::Idle;
    }
}

fn viewport_center(viewport: Viewport) -> Vec2 {
    Vec2::new(viewport.width / 2.0, viewport.height / 2.0)
}

/// GPU-side resources, created on the first frame once a device exists.
struct Gfx {
    camera: CameraBinding,
    picture_layout: wgpu::BindGroupLayout,
    strokes: Renderer,
    pictures: Renderer,
}

impl Gfx {
    fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let camera = CameraBinding::new(device);
        let picture_layout = pipeline::picture_texture_layout(device);

        let mut strokes = Renderer::new(
            "tabula stroke pass",
            pipeline::stroke_pipeline(device, surface_format, &camera.layout),
            PassLoad::Clear(Color::from_srgb_u8(0xf4, 0xf2, 0xec, 0xff)),
        );

        strokes.add_group(
            None,
            Batch::new(
                device,
                "tabula strokes",
                StrokeVertex::FLOATS,
                STROKE_MAX_VERTICES,
                STROKE_MAX_INDICES,
            ),
        );

        let pictures = Renderer::new(
            "tabula picture pass",
            pipeline::picture_pipeline(device, surface_format, &camera.layout, &picture_layout),
            PassLoad::Load,
        );

        Self {
            camera,
            picture_layout,
            strokes,
            pictures,
        }
    }

    /// Allocates a texture + batch pair for one picture and stages its quad.
    fn place_picture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &Pixels,
        top_left: Vec2,
        bottom_right: Vec2,
    ) {
        let bind_group = picture::upload_texture(device, queue, &self.picture_layout, pixels);
        let batch = Batch::new(device, "tabula picture", PictureVertex::FLOATS, 4, 6);

        let id = self.pictures.add_group(Some(bind_group), batch);
        let (vertices, indices) = picture::picture_quad(top_left, bottom_right);
        self.pictures.group_mut(id).batch.append(&vertices, &indices);

        log::info!(
            "placed {}x{} picture (group {})",
            pixels.width,
            pixels.height,
            id
        );
    }
}

pub struct BoardApp {
    state: BoardState,
    gfx: Option<Gfx>,
}

impl BoardApp {
    pub fn new() -> Self {
        Self {
            state: BoardState::new(),
            gfx: None,
        }
    }

    fn frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        let viewport = ctx.window.viewport();
        if !viewport.is_valid() {
            return Ok(AppControl::Continue);
        }

        if self.gfx.is_none() {
            self.gfx = Some(Gfx::new(ctx.gpu.device(), ctx.gpu.surface_format()));
            log::info!("renderers ready ({:?})", ctx.gpu.surface_format());
        }
        let Some(gfx) = self.gfx.as_mut() else {
            return Ok(AppControl::Continue);
        };

        for ev in &ctx.input_frame.events {
            match self.state.apply(ev, viewport) {
                Action::None => {}

                Action::StrokeQuad(vertices) => {
                    gfx.strokes
                        .group_mut(0)
                        .batch
                        .append(&vertices, &RibbonQuad::INDICES);
                }

                Action::PlaceFile(path) => match picture::decode_file(&path) {
                    Ok(pixels) => {
                        let (tl, br) = self.state.picture_corners(&pixels, viewport);
                        gfx.place_picture(ctx.gpu.device(), ctx.gpu.queue(), &pixels, tl, br);
                    }
                    Err(e) => log::warn!("dropped file ignored: {e:#}"),
                },

                Action::PlaceClipboard => match picture::decode_clipboard() {
                    Ok(pixels) => {
                        let (tl, br) = self.state.picture_corners(&pixels, viewport);
                        gfx.place_picture(ctx.gpu.device(), ctx.gpu.queue(), &pixels, tl, br);
                    }
                    Err(e) => log::warn!("clipboard paste ignored: {e:#}"),
                },
            }
        }

        if self.state.camera_dirty {
            gfx.camera.upload(ctx.gpu.queue(), self.state.camera.view());
            self.state.camera_dirty = false;
        }

        ctx.render(|rctx, target| {
            gfx.strokes.render(rctx, target, &gfx.camera.bind_group)?;
            gfx.pictures.render(rctx, target, &gfx.camera.bind_group)?;
            Ok(())
        })
    }
}

impl BoardState {
    /// World-space corners for a picture anchored at the pointer (or the
    /// viewport center), sized to its pixel dimensions at the current zoom.
    fn picture_corners(&self, pixels: &Pixels, viewport: Viewport) -> (Vec2, Vec2) {
        let anchor = self.pointer.unwrap_or(viewport_center(viewport));
        let extent = Vec2::new(pixels.width as f32, pixels.height as f32);

        let tl = self.camera.screen_to_world(anchor, viewport);
        let br = self.camera.screen_to_world(anchor + extent, viewport);
        (tl, br)
    }
}

impl App for BoardApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        match self.frame(ctx) {
            Ok(control) => control,
            Err(e) => {
                log::error!("frame failed: {e:#}");
                AppControl::Exit
            }
        }
    }
}

impl Default for BoardApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_engine::input::Modifiers;

    const VP: Viewport = Viewport {
        width: 200.0,
        height: 200.0,
    };

    fn button(btn: MouseButton, state: MouseButtonState, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button: btn,
            state,
            x,
            y,
            modifiers: Modifiers::default(),
        })
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    fn key(k: Key, state: KeyState) -> InputEvent {
        InputEvent::Key {
            key: k,
            state,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    // ── drawing ──────────────────────────────────────────────────────────

    #[test]
    fn left_drag_emits_stroke_quads() {
        let mut s = BoardState::new();

        s.apply(&button(MouseButton::Left, MouseButtonState::Pressed, 100.0, 100.0), VP);
        assert_eq!(s.gesture, Gesture::Draw);

        let action = s.apply(&moved(110.0, 100.0), VP);
        assert!(matches!(action, Action::StrokeQuad(_)));
    }

    #[test]
    fn drag_quad_is_world_converted() {
        let mut s = BoardState::new();
        s.apply(&button(MouseButton::Left, MouseButtonState::Pressed, 100.0, 100.0), VP);

        let Action::StrokeQuad(v) = s.apply(&moved(110.0, 100.0), VP) else {
            panic!("expected a quad");
        };

        // Identity camera on a 200x200 viewport: world == NDC. The pixel-space
        // y-extent [95, 105] lands symmetric about y = 0 in NDC.
        let ys = [v[1], v[3], v[5], v[7]];
        let max = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        assert!((max - 0.05).abs() < 1e-5);
        assert!((min + 0.05).abs() < 1e-5);
    }

    #[test]
    fn release_ends_the_stroke() {
        let mut s = BoardState::new();
        s.apply(&button(MouseButton::Left, MouseButtonState::Pressed, 0.0, 0.0), VP);
        s.apply(&moved(10.0, 0.0), VP);
        s.apply(&button(MouseButton::Left, MouseButtonState::Released, 10.0, 0.0), VP);

        assert_eq!(s.gesture, Gesture::Idle);
        assert!(!s.stroke.is_active());

        // Moving without a button down draws nothing.
        assert_eq!(s.apply(&moved(50.0, 50.0), VP), Action::None);
    }

    // ── panning ──────────────────────────────────────────────────────────

    #[test]
    fn right_drag_pans_without_geometry() {
        let mut s = BoardState::new();
        s.apply(&button(MouseButton::Right, MouseButtonState::Pressed, 100.0, 100.0), VP);
        assert_eq!(s.gesture, Gesture::Pan);

        let action = s.apply(&moved(120.0, 100.0), VP);
        assert_eq!(action, Action::None);
        assert!(s.camera_dirty);

        // 20 px on a 200 px viewport is 0.2 NDC.
        assert!((s.camera.view().cols[2][0] - 0.2).abs() < 1e-5);
    }

    #[test]
    fn focus_loss_releases_the_space_pan_modifier() {
        let mut s = BoardState::new();
        s.apply(&key(Key::Space, KeyState::Pressed), VP);
        s.apply(&InputEvent::Focused(false), VP);

        // Back in focus, a plain left-drag draws again.
        s.apply(&button(MouseButton::Left, MouseButtonState::Pressed, 0.0, 0.0), VP);
        assert_eq!(s.gesture, Gesture::Draw);
    }

    #[test]
    fn space_turns_left_drag_into_pan() {
        let mut s = BoardState::new();
        s.apply(&key(Key::Space, KeyState::Pressed), VP);
        s.apply(&button(MouseButton::Left, MouseButtonState::Pressed, 0.0, 0.0), VP);
        assert_eq!(s.gesture, Gesture::Pan);

        assert_eq!(s.apply(&moved(10.0, 10.0), VP), Action::None);
    }

    // ── zoom / placement triggers ────────────────────────────────────────

    #[test]
    fn mid_stroke_wheel_keeps_the_ribbon_seamless() {
        let mut s = BoardState::new();
        s.apply(&button(MouseButton::Left, MouseButtonState::Pressed, 100.0, 100.0), VP);

        let Action::StrokeQuad(q1) = s.apply(&moved(110.0, 100.0), VP) else {
            panic!("expected a quad");
        };

        // Wheel input between two drag points must not move the camera.
        s.apply(
            &InputEvent::MouseWheel {
                delta: MouseWheelDelta::Line { x: 0.0, y: 3.0 },
                modifiers: Modifiers::default(),
            },
            VP,
        );
        assert_eq!(s.camera.zoom(), 1.0);

        let Action::StrokeQuad(q2) = s.apply(&moved(120.0, 100.0), VP) else {
            panic!("expected a quad");
        };

        // Quad 1's leading edge is quad 2's trailing edge, in world space.
        assert_eq!(&q1[4..8], &q2[0..4]);
    }

    #[test]
    fn wheel_zooms_at_cursor() {
        let mut s = BoardState::new();
        s.apply(&moved(100.0, 100.0), VP);
        s.apply(
            &InputEvent::MouseWheel {
                delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 },
                modifiers: Modifiers::default(),
            },
            VP,
        );

        assert!(s.camera.zoom() > 1.0);
        assert!(s.camera_dirty);
    }

    #[test]
    fn paste_key_and_file_drop_request_placement() {
        let mut s = BoardState::new();

        assert_eq!(s.apply(&key(Key::V, KeyState::Pressed), VP), Action::PlaceClipboard);

        let path = PathBuf::from("/tmp/cat.png");
        assert_eq!(
            s.apply(&InputEvent::FileDropped(path.clone()), VP),
            Action::PlaceFile(path)
        );
    }

    #[test]
    fn picture_anchors_at_pointer() {
        let mut s = BoardState::new();
        s.apply(&moved(100.0, 100.0), VP);

        let pixels = Pixels {
            width: 100,
            height: 50,
            data: Vec::new(),
        };
        let (tl, br) = s.picture_corners(&pixels, VP);

        // Identity camera: pointer at the viewport center is world origin.
        assert!((tl.x - 0.0).abs() < 1e-5 && (tl.y - 0.0).abs() < 1e-5);
        // 100x50 px extends right and down (down is -Y in NDC).
        assert!((br.x - 1.0).abs() < 1e-5);
        assert!((br.y + 0.5).abs() < 1e-5);
    }
}
