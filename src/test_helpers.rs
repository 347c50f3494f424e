//! Shared test utilities for the retouch test suite.
//!
//! Provides deterministic pixel buffers so filter and geometry tests can
//! assert on exact output without image fixtures on disk.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let src = noise_buffer(8, 6, 42);
//! assert_eq!(src.dimensions(), (8, 6));
//!
//! let ramp = gradient_buffer(16, 4);
//! assert_eq!(ramp.pixel(0, 0), [0, 0, 0]);
//! ```

use crate::imaging::PixelBuffer;

/// Pseudo-random RGB buffer. The same `seed` always yields the same pixels.
pub fn noise_buffer(width: u32, height: u32, seed: u64) -> PixelBuffer {
    // xorshift64*; zero is a fixed point so nudge the seed away from it
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let mut next = move || {
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        (state.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 56) as u8
    };
    PixelBuffer::from_fn(width, height, |_, _| [next(), next(), next()]).unwrap()
}

/// Gray horizontal ramp from black at `x = 0` to white at `x = width - 1`.
pub fn gradient_buffer(width: u32, height: u32) -> PixelBuffer {
    let span = width.saturating_sub(1).max(1);
    PixelBuffer::from_fn(width, height, |x, _| {
        let v = (x * 255 / span) as u8;
        [v, v, v]
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic() {
        assert_eq!(noise_buffer(5, 5, 7), noise_buffer(5, 5, 7));
        assert_ne!(noise_buffer(5, 5, 7), noise_buffer(5, 5, 8));
    }

    #[test]
    fn gradient_spans_full_range() {
        let g = gradient_buffer(16, 2);
        assert_eq!(g.pixel(0, 1), [0, 0, 0]);
        assert_eq!(g.pixel(15, 1), [255, 255, 255]);
    }
}
