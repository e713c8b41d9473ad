//! Per-frame draw list. Scenes describe what to show here; the renderer turns
//! it into vertex data once per frame. This is the only hand-off point
//! between simulation state and presentation.

/// 1x1 white texture used for flat rectangles.
pub const WHITE_TEXTURE: &str = "__white";
/// Generated anti-aliased disc used for circles.
pub const CIRCLE_TEXTURE: &str = "__circle";

/// Virtual screen size for frames drawn without a world camera. The renderer
/// letterboxes this into the real window.
pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

const FULL_UV: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub center: (f32, f32),
    pub zoom: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    pub texture: String,
    pub center: (f32, f32),
    pub size: (f32, f32),
    /// Linear RGBA tint.
    pub color: [f32; 4],
    pub uv: [f32; 4],
    pub flip_x: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    /// Centre of the text in the canvas coordinate space.
    pub position: (f32, f32),
    pub size: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub clear_color: [f32; 4],
    /// `None` draws in virtual screen space.
    pub camera: Option<CameraView>,
    pub quads: Vec<Quad>,
    pub labels: Vec<Label>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            clear_color: rgb_hex(0x000000),
            camera: None,
            quads: Vec::new(),
            labels: Vec::new(),
        }
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self, color: u32) {
        self.clear_color = rgb_hex(color);
        self.camera = None;
        self.quads.clear();
        self.labels.clear();
    }

    pub fn set_camera(&mut self, center: (f32, f32), zoom: f32) {
        self.camera = Some(CameraView { center, zoom });
    }

    /// Axis-aligned rectangle from its top-left corner.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) {
        self.quads.push(Quad {
            texture: WHITE_TEXTURE.to_string(),
            center: (x + width * 0.5, y + height * 0.5),
            size: (width, height),
            color,
            uv: FULL_UV,
            flip_x: false,
        });
    }

    pub fn circle(&mut self, x: f32, y: f32, radius: f32, color: [f32; 4]) {
        self.quads.push(Quad {
            texture: CIRCLE_TEXTURE.to_string(),
            center: (x, y),
            size: (radius * 2.0, radius * 2.0),
            color,
            uv: FULL_UV,
            flip_x: false,
        });
    }

    pub fn sprite(
        &mut self,
        texture: &str,
        center: (f32, f32),
        size: (f32, f32),
        uv: [f32; 4],
        flip_x: bool,
    ) {
        self.quads.push(Quad {
            texture: texture.to_string(),
            center,
            size,
            color: [1.0; 4],
            uv,
            flip_x,
        });
    }

    pub fn label(&mut self, text: &str, position: (f32, f32), size: f32, color: [f32; 4]) {
        self.labels.push(Label {
            text: text.to_string(),
            position,
            size,
            color,
        });
    }
}

/// `0xRRGGBB` sRGB to linear RGBA. The surface is sRGB, so vertex colours
/// must be linear to come out as authored.
pub fn rgb_hex(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xFF) as f32 / 255.0);
    [channel(16), channel(8), channel(0), 1.0]
}

pub fn with_alpha(mut color: [f32; 4], alpha: f32) -> [f32; 4] {
    color[3] = alpha;
    color
}

/// White disc on a transparent square, used as the `CIRCLE_TEXTURE` image.
/// The outermost pixel ring is anti-aliased by coverage.
pub fn circle_rgba(diameter: u32) -> Vec<u8> {
    let radius = diameter as f32 * 0.5;
    let mut rgba = Vec::with_capacity((diameter * diameter * 4) as usize);
    for y in 0..diameter {
        for x in 0..diameter {
            let dx = x as f32 + 0.5 - radius;
            let dy = y as f32 + 0.5 - radius;
            let coverage = (radius - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
            rgba.extend_from_slice(&[255, 255, 255, (coverage * 255.0).round() as u8]);
        }
    }
    rgba
}

/// Back to 8-bit sRGB with straight alpha, for egui text.
pub fn to_srgba8(color: [f32; 4]) -> [u8; 4] {
    let encode = |c: f32| (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0).round() as u8;
    [
        encode(color[0]),
        encode(color[1]),
        encode(color[2]),
        (color[3].clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
