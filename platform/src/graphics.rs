use std::{ptr::NonNull, slice};
use tracing::debug;
use crate::{
    error::Error,
    memory::{Allocator, DefaultAllocator},
};

pub const BYTES_PER_PIXEL: i32 = 4;

struct Region {
    ptr: NonNull<u8>,
    size: usize,
}

/// CPU side 32-bit pixel surface, `0x00RRGGBB` per pixel, rows top to bottom.
///
/// The owned region is always exactly `height * stride` bytes. Resizing
/// throws the old region away before asking for a new one.
pub struct PixelBuffer<A: Allocator = DefaultAllocator> {
    region: Option<Region>,
    width: i32,
    height: i32,
    stride: i32,
    allocator: A,
}

impl PixelBuffer {
    pub fn with_dimensions(width: i32, height: i32) -> Result<Self, Error> {
        Self::with_allocator(DefaultAllocator::default(), width, height)
    }
}

impl<A: Allocator> PixelBuffer<A> {
    pub fn with_allocator(allocator: A, width: i32, height: i32) -> Result<Self, Error> {
        let mut buffer = Self {
            region: None,
            width: 0,
            height: 0,
            stride: 0,
            allocator,
        };
        buffer.resize(width, height)?;
        Ok(buffer)
    }

    /// Discards the current region and allocates a zeroed one for `width` x `height` pixels.
    ///
    /// Negative dimensions are rejected up front; any other failure leaves the buffer empty.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<(), Error> {
        if width < 0 || height < 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let layout = width
            .checked_mul(BYTES_PER_PIXEL)
            .and_then(|stride| Some((stride, (stride as usize).checked_mul(height as usize)?)));

        self.release();

        let (stride, size) = layout.ok_or(Error::Allocation { width, height })?;

        if size > 0 {
            let ptr = self.allocator.allocate(size)
                .ok_or(Error::Allocation { width, height })?;
            self.region = Some(Region { ptr, size });
        }
        self.width = width;
        self.height = height;
        self.stride = stride;
        debug!(width, height, size, "pixel buffer resized");

        Ok(())
    }

    fn release(&mut self) {
        if let Some(region) = self.region.take() {
            unsafe { self.allocator.deallocate(region.ptr, region.size) };
        }
        self.width = 0;
        self.height = 0;
        self.stride = 0;
    }

    #[inline(always)] pub fn width(&self) -> i32 { self.width }
    #[inline(always)] pub fn height(&self) -> i32 { self.height }
    #[inline(always)] pub fn stride(&self) -> i32 { self.stride }
    #[inline(always)] pub fn bytes_per_pixel(&self) -> i32 { BYTES_PER_PIXEL }
    #[inline(always)] pub fn dim(&self) -> (i32, i32) { (self.width, self.height) }
    #[inline(always)] pub fn allocator(&self) -> &A { &self.allocator }

    /// Size of the owned region in bytes.
    pub fn size(&self) -> usize {
        self.region.as_ref().map_or(0, |region| region.size)
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_none()
    }

    /// Start of the region, null when the buffer is empty.
    pub fn as_ptr(&self) -> *const u8 {
        self.region.as_ref().map_or(std::ptr::null(), |region| region.ptr.as_ptr() as *const u8)
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.region {
            Some(region) => unsafe { slice::from_raw_parts(region.ptr.as_ptr(), region.size) },
            None => &[],
        }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.region {
            Some(region) => unsafe { slice::from_raw_parts_mut(region.ptr.as_ptr(), region.size) },
            None => &mut [],
        }
    }

    /// Visible bytes of every row, walking the region by stride.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let stride = self.stride.max(1) as usize;
        let row_len = (self.width * BYTES_PER_PIXEL) as usize;
        self.as_bytes_mut()
            .chunks_exact_mut(stride)
            .map(move |row| &mut row[..row_len])
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride as usize + x as usize * BYTES_PER_PIXEL as usize;
        let bytes = self.as_bytes().get(offset..offset + BYTES_PER_PIXEL as usize)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl<A: Allocator> Drop for PixelBuffer<A> {
    fn drop(&mut self) {
        self.release();
    }
}
