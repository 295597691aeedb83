mod color;

use platform::{graphics::PixelBuffer, memory::Allocator};

pub use color::Color;

/// Fills `buffer` with the animated blue/green gradient.
///
/// Blue follows `x + x_offset`, green follows `y + y_offset`, both wrapping
/// at 256; red stays zero. Rows are walked by stride.
pub fn render_weird_gradient<A: Allocator>(buffer: &mut PixelBuffer<A>, x_offset: u32, y_offset: u32) {
    for (y, row) in buffer.rows_mut().enumerate() {
        let green = (y as u32).wrapping_add(y_offset) as u8;
        for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
            let blue = (x as u32).wrapping_add(x_offset) as u8;
            pixel.copy_from_slice(&Color::rgb8(0, green, blue).to_le_bytes());
        }
    }
}
