mod render;

pub use render::{render_weird_gradient, Color};
