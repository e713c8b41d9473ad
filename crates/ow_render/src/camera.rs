use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Orthographic camera over a y-down world: +x right, +y down, the same
/// convention as screen pixels and Tiled maps.
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::new(viewport_width as f32 * 0.5, viewport_height as f32 * 0.5),
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    /// Half extents of the visible world region.
    pub fn half_extents(&self) -> Vec2 {
        let zoom = self.zoom.max(f32::EPSILON);
        Vec2::new(
            self.viewport.0 as f32 / (2.0 * zoom),
            self.viewport.1 as f32 / (2.0 * zoom),
        )
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let half = self.half_extents();

        // bottom/top are swapped relative to a y-up projection.
        let proj = Mat4::orthographic_rh(
            self.position.x - half.x,
            self.position.x + half.x,
            self.position.y + half.y,
            self.position.y - half.y,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn project(camera: &Camera2D, x: f32, y: f32) -> Vec4 {
        let m = Mat4::from_cols_array_2d(&camera.build_uniform().view_proj);
        m * Vec4::new(x, y, 0.0, 1.0)
    }

    #[test]
    fn camera_centre_maps_to_clip_origin() {
        let mut camera = Camera2D::new(1280, 720);
        camera.position = Vec2::new(300.0, 200.0);
        let clip = project(&camera, 300.0, 200.0);
        assert!(clip.x.abs() < 1e-5);
        assert!(clip.y.abs() < 1e-5);
    }

    #[test]
    fn world_down_is_clip_down() {
        let camera = Camera2D::new(1280, 720);
        let top = project(&camera, 640.0, 0.0);
        let bottom = project(&camera, 640.0, 720.0);
        assert!((top.y - 1.0).abs() < 1e-5);
        assert!((bottom.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn zoom_shrinks_visible_region() {
        let mut camera = Camera2D::new(1280, 720);
        camera.zoom = 2.0;
        let half = camera.half_extents();
        assert_eq!(half, Vec2::new(320.0, 180.0));
    }
}
