//! Source image decoding and slice rasterization.

mod renderer;
mod source;

pub use renderer::render_region;
pub use source::SourceImage;
