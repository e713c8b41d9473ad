use std::sync::Arc;
use winit::dpi::LogicalSize;
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

/// Smallest window the letterboxed 16:9 view still reads well in.
const MIN_WINDOW_SIZE: (u32, u32) = (320, 180);

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Dragon Quest Adventure".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, OsError> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(
            config.width.max(MIN_WINDOW_SIZE.0),
            config.height.max(MIN_WINDOW_SIZE.1),
        ))
        .with_min_inner_size(LogicalSize::new(MIN_WINDOW_SIZE.0, MIN_WINDOW_SIZE.1));

    let window = event_loop.create_window(attrs)?;
    log::debug!("Window '{}' created", config.title);
    Ok(Arc::new(window))
}
