mod dashboard;
pub mod snapshot;
pub mod style_tree;
mod theme;
pub mod view_state;

pub use dashboard::{render as render_dashboard, DashboardState, RenderContext};
pub use snapshot::{CaptureDeferral, CaptureOutcome};
pub use style_tree::StyleTree;
pub use theme::{apply_theme, ClassPalette};
pub use view_state::{DashboardView, Notice, NoticeKind, ViewAction};
