//! Utility modules
//!
//! Utility functions shared by the render stages: slug generation, fence
//! and raw HTML tracking for line scanners, HTML attribute helpers and front
//! matter handling.

pub mod fence;
pub mod front_matter;
pub mod html;
pub mod slug;

pub use fence::FenceTracker;
pub use front_matter::strip_front_matter;
pub use html::HtmlBlockTracker;
pub use slug::slugify;
