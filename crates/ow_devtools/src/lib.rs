pub mod debug_overlay;
pub mod shell;

pub use debug_overlay::{DebugOverlay, OverlayStats, ScreenLabel, UiFrame};
pub use shell::{HudStats, ShellActions, ShellView, UiShell};
