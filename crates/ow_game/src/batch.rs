//! Turns a drawn `Canvas` into one vertex/index mesh plus texture-batched draw calls.

use crate::canvas::{Canvas, Quad, SCREEN_HEIGHT, SCREEN_WIDTH};
use ow_render::SpriteVertex;
use std::sync::Arc;

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct SpriteMesh {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
    /// Texture keys that were requested but have no GPU texture, deduplicated.
    pub missing: Vec<String>,
}

impl SpriteMesh {
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

/// Quads keep their canvas order. Quads whose texture is unknown are skipped.
pub fn build_mesh(canvas: &Canvas, has_texture: impl Fn(&str) -> bool) -> SpriteMesh {
    let mut mesh = SpriteMesh {
        vertices: Vec::with_capacity(canvas.quads.len() * 4),
        indices: Vec::with_capacity(canvas.quads.len() * 6),
        draw_calls: Vec::with_capacity(16),
        missing: Vec::new(),
    };
    for quad in &canvas.quads {
        if !has_texture(&quad.texture) {
            if !mesh.missing.contains(&quad.texture) {
                mesh.missing.push(quad.texture.clone());
            }
            continue;
        }
        add_quad(&mut mesh, quad);
    }
    mesh
}

fn add_quad(mesh: &mut SpriteMesh, quad: &Quad) {
    let half_w = quad.size.0 * 0.5;
    let half_h = quad.size.1 * 0.5;
    let (cx, cy) = quad.center;
    let [mut u0, v0, mut u1, v1] = quad.uv;
    if quad.flip_x {
        std::mem::swap(&mut u0, &mut u1);
    }

    // y-down: the first corner is the top-left, which samples (u0, v0).
    let corners = [
        ([cx - half_w, cy - half_h], [u0, v0]),
        ([cx + half_w, cy - half_h], [u1, v0]),
        ([cx + half_w, cy + half_h], [u1, v1]),
        ([cx - half_w, cy + half_h], [u0, v1]),
    ];
    let base_index = mesh.vertices.len() as u32;
    for (position, tex_coords) in corners {
        mesh.vertices.push(SpriteVertex {
            position,
            tex_coords,
            color: quad.color,
        });
    }

    let draw_start = mesh.indices.len() as u32;
    mesh.indices.extend_from_slice(&[
        base_index,
        base_index + 1,
        base_index + 2,
        base_index,
        base_index + 2,
        base_index + 3,
    ]);
    push_draw_call(&mut mesh.draw_calls, &quad.texture, draw_start, 6);
}

/// Append a draw call, merging with the previous one when the texture matches
/// and indices are contiguous.
fn push_draw_call(
    draw_calls: &mut Vec<DrawCall>,
    texture_key: &str,
    index_start: u32,
    index_count: u32,
) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.index_start + last.index_count == index_start;
        if &*last.texture_key == texture_key && contiguous {
            last.index_count += index_count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture_key: Arc::from(texture_key),
        index_start,
        index_count,
    });
}

pub fn count_texture_binds(draw_calls: &[DrawCall]) -> usize {
    let mut binds = 0usize;
    let mut current: Option<&str> = None;
    for draw in draw_calls {
        let key: &str = &draw.texture_key;
        if current != Some(key) {
            current = Some(key);
            binds += 1;
        }
    }
    binds
}

/// Scale that fits the 1280x720 virtual screen inside `viewport`.
pub fn fit_scale(viewport: (u32, u32)) -> f32 {
    let sx = viewport.0 as f32 / SCREEN_WIDTH;
    let sy = viewport.1 as f32 / SCREEN_HEIGHT;
    sx.min(sy).max(f32::EPSILON)
}

/// Camera centre and zoom for this frame. Without a scene camera the virtual
/// screen is shown letterboxed.
pub fn view_for(canvas: &Canvas, viewport: (u32, u32)) -> ((f32, f32), f32) {
    let fit = fit_scale(viewport);
    match canvas.camera {
        Some(view) => (view.center, view.zoom * fit),
        None => ((SCREEN_WIDTH * 0.5, SCREEN_HEIGHT * 0.5), fit),
    }
}

/// World position to physical pixels under the given view.
pub fn world_to_screen(
    point: (f32, f32),
    center: (f32, f32),
    zoom: f32,
    viewport: (u32, u32),
) -> (f32, f32) {
    (
        (point.0 - center.0) * zoom + viewport.0 as f32 * 0.5,
        (point.1 - center.1) * zoom + viewport.1 as f32 * 0.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{rgb_hex, CIRCLE_TEXTURE, WHITE_TEXTURE};

    fn any_texture(_: &str) -> bool {
        true
    }

    #[test]
    fn same_texture_quads_merge_into_one_draw_call() {
        let mut canvas = Canvas::new();
        canvas.rect(0.0, 0.0, 10.0, 10.0, rgb_hex(0xFFFFFF));
        canvas.rect(20.0, 0.0, 10.0, 10.0, rgb_hex(0xFFFFFF));
        canvas.circle(50.0, 50.0, 5.0, rgb_hex(0xFFFFFF));
        canvas.rect(0.0, 40.0, 10.0, 10.0, rgb_hex(0xFFFFFF));

        let mesh = build_mesh(&canvas, any_texture);
        assert_eq!(mesh.quad_count(), 4);
        let keys: Vec<&str> = mesh.draw_calls.iter().map(|d| &*d.texture_key).collect();
        assert_eq!(keys, vec![WHITE_TEXTURE, CIRCLE_TEXTURE, WHITE_TEXTURE]);
        assert_eq!(mesh.draw_calls[0].index_count, 12);
        assert_eq!(mesh.draw_calls[2].index_start, 18);
        assert_eq!(count_texture_binds(&mesh.draw_calls), 3);
    }

    #[test]
    fn top_left_corner_samples_top_left_texel() {
        let mut canvas = Canvas::new();
        canvas.sprite("hero", (100.0, 100.0), (20.0, 40.0), [0.25, 0.0, 0.5, 1.0], false);
        let mesh = build_mesh(&canvas, any_texture);
        assert_eq!(mesh.vertices[0].position, [90.0, 80.0]);
        assert_eq!(mesh.vertices[0].tex_coords, [0.25, 0.0]);
        assert_eq!(mesh.vertices[2].position, [110.0, 120.0]);
        assert_eq!(mesh.vertices[2].tex_coords, [0.5, 1.0]);
    }

    #[test]
    fn flip_x_mirrors_u() {
        let mut canvas = Canvas::new();
        canvas.sprite("hero", (0.0, 0.0), (2.0, 2.0), [0.0, 0.0, 1.0, 1.0], true);
        let mesh = build_mesh(&canvas, any_texture);
        assert_eq!(mesh.vertices[0].tex_coords, [1.0, 0.0]);
        assert_eq!(mesh.vertices[1].tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn unknown_textures_are_skipped_and_reported_once() {
        let mut canvas = Canvas::new();
        canvas.sprite("hero", (0.0, 0.0), (2.0, 2.0), [0.0, 0.0, 1.0, 1.0], false);
        canvas.rect(0.0, 0.0, 1.0, 1.0, [1.0; 4]);
        canvas.sprite("hero", (5.0, 0.0), (2.0, 2.0), [0.0, 0.0, 1.0, 1.0], false);
        let mesh = build_mesh(&canvas, |key| key == WHITE_TEXTURE);
        assert_eq!(mesh.quad_count(), 1);
        assert_eq!(mesh.missing, vec!["hero".to_string()]);
    }

    #[test]
    fn screen_space_view_letterboxes_virtual_screen() {
        let canvas = Canvas::new();
        let (center, zoom) = view_for(&canvas, (2560, 1600));
        assert_eq!(center, (640.0, 360.0));
        assert_eq!(zoom, 2.0);
        let (x, y) = world_to_screen((0.0, 0.0), center, zoom, (2560, 1600));
        assert_eq!((x, y), (0.0, 80.0));
    }

    #[test]
    fn world_view_scales_scene_zoom_by_window_fit() {
        let mut canvas = Canvas::new();
        canvas.set_camera((300.0, 200.0), 1.5);
        let (center, zoom) = view_for(&canvas, (640, 360));
        assert_eq!(center, (300.0, 200.0));
        assert!((zoom - 0.75).abs() < 1e-6);
    }
}
