use crate::config::CameraSection;

/// Gameplay camera state: a smoothed follow target and a clamped zoom.
/// The renderer copies `position`/`zoom` into its GPU camera each frame.
#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    pub position: (f32, f32),
    pub zoom: f32,
    settings: CameraSection,
}

impl CameraRig {
    pub fn new(settings: CameraSection, target: (f32, f32)) -> Self {
        Self {
            position: target,
            zoom: settings.zoom.clamp(settings.min_zoom, settings.max_zoom),
            settings,
        }
    }

    /// Move a `follow_lerp` fraction of the remaining distance to `target`.
    pub fn follow(&mut self, target: (f32, f32)) {
        let t = self.settings.follow_lerp;
        self.position.0 += (target.0 - self.position.0) * t;
        self.position.1 += (target.1 - self.position.1) * t;
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_zoom(self.zoom + self.settings.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_zoom(self.zoom - self.settings.zoom_step)
    }

    fn set_zoom(&mut self, zoom: f32) -> f32 {
        let clamped = zoom.clamp(self.settings.min_zoom, self.settings.max_zoom);
        if clamped != self.zoom {
            log::info!("Camera zoom {:.2}", clamped);
        }
        self.zoom = clamped;
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_target_at_configured_zoom() {
        let rig = CameraRig::new(CameraSection::default(), (640.0, 360.0));
        assert_eq!(rig.position, (640.0, 360.0));
        assert_eq!(rig.zoom, 1.5);
    }

    #[test]
    fn follow_closes_half_the_gap_per_step() {
        let mut rig = CameraRig::new(CameraSection::default(), (0.0, 0.0));
        rig.follow((100.0, -40.0));
        assert_eq!(rig.position, (50.0, -20.0));
        rig.follow((100.0, -40.0));
        assert_eq!(rig.position, (75.0, -30.0));
    }

    #[test]
    fn zoom_steps_by_quarter_and_clamps() {
        let mut rig = CameraRig::new(CameraSection::default(), (0.0, 0.0));
        assert_eq!(rig.zoom_in(), 1.75);
        for _ in 0..20 {
            rig.zoom_in();
        }
        assert_eq!(rig.zoom, 4.0);
        for _ in 0..40 {
            rig.zoom_out();
        }
        assert_eq!(rig.zoom, 0.5);
    }
}
