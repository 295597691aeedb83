use std::{
    alloc::{alloc_zeroed, dealloc, Layout},
    mem::align_of,
    ptr::NonNull,
};

/// Alignment of every pixel region, enough for `u32` pixels.
pub const PIXEL_ALIGN: usize = align_of::<u32>();

/// Backing store for pixel regions.
///
/// Blocks handed out by `allocate` are zero-initialised and aligned to
/// [`PIXEL_ALIGN`]. Zero-sized requests never reach an allocator.
pub trait Allocator {
    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>>;

    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator with the same `size`
    /// and must not be used afterwards.
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, size: usize);
}

#[derive(Default, Debug, Clone, Copy)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        debug_assert!(size > 0);
        let layout = Layout::from_size_align(size, PIXEL_ALIGN).ok()?;
        NonNull::new(unsafe { alloc_zeroed(layout) })
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, size: usize) {
        let layout = Layout::from_size_align_unchecked(size, PIXEL_ALIGN);
        dealloc(ptr.as_ptr(), layout);
    }
}

/// Whole pages straight from the virtual memory manager. Committed pages come back zeroed.
#[cfg(windows)]
#[derive(Default, Debug, Clone, Copy)]
pub struct PageAllocator;

#[cfg(windows)]
impl Allocator for PageAllocator {
    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        use winapi::um::{
            memoryapi::VirtualAlloc,
            winnt::{MEM_COMMIT, MEM_RESERVE, PAGE_READWRITE},
        };

        let ptr = unsafe {
            VirtualAlloc(std::ptr::null_mut(), size, MEM_RESERVE | MEM_COMMIT, PAGE_READWRITE)
        };
        if ptr.is_null() {
            tracing::error!(size, error = %crate::debug::last_os_error(), "VirtualAlloc failed");
        }
        NonNull::new(ptr as *mut u8)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, _size: usize) {
        use winapi::um::{memoryapi::VirtualFree, winnt::MEM_RELEASE};

        // NOTE: size must be 0 with MEM_RELEASE, the whole reservation is released
        if VirtualFree(ptr.as_ptr() as *mut _, 0, MEM_RELEASE) == 0 {
            tracing::warn!(error = %crate::debug::last_os_error(), "VirtualFree failed");
        }
    }
}

#[cfg(windows)]
pub type DefaultAllocator = PageAllocator;
#[cfg(not(windows))]
pub type DefaultAllocator = SystemAllocator;

#[cfg(test)]
pub(crate) mod tracking {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {
        Allocate { id: usize, size: usize },
        Release { id: usize, size: usize },
    }

    /// Records every allocation and release, in order.
    #[derive(Default)]
    pub struct TrackingAllocator {
        inner: SystemAllocator,
        live: Vec<(usize, NonNull<u8>)>,
        next_id: usize,
        pub log: Rc<RefCell<Vec<Event>>>,
        pub fail_next: bool,
    }

    impl TrackingAllocator {
        pub fn live_count(&self) -> usize {
            self.live.len()
        }

        pub fn events(&self) -> Vec<Event> {
            self.log.borrow().clone()
        }
    }

    impl Allocator for TrackingAllocator {
        fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
            if std::mem::take(&mut self.fail_next) {
                return None;
            }
            let ptr = self.inner.allocate(size)?;
            let id = self.next_id;
            self.next_id += 1;
            self.live.push((id, ptr));
            self.log.borrow_mut().push(Event::Allocate { id, size });
            Some(ptr)
        }

        unsafe fn deallocate(&mut self, ptr: NonNull<u8>, size: usize) {
            let index = self.live.iter().position(|&(_, p)| p == ptr)
                .expect("released a block that is not live");
            let (id, _) = self.live.swap_remove(index);
            self.log.borrow_mut().push(Event::Release { id, size });
            self.inner.deallocate(ptr, size);
        }
    }
}
