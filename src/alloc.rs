use crate::error::{DecodeError, Result};

/// Where the working buffers of a decode call come from.
///
/// One decode call acquires a handful of buffers (color tables, the pixel
/// index buffer, the LZW table and its unwind stack) and gives every one of
/// them back before returning, whatever the outcome. Embedders with their
/// own memory discipline can provide an implementation; everyone else gets
/// [`HeapAllocator`].
pub trait Allocator {
    /// Hand out a zeroed buffer of `len` elements, or `None` when the
    /// memory cannot be obtained.
    fn acquire<T: Copy + Default>(&self, len : usize) -> Option<Vec<T>>;

    /// Take back a buffer previously handed out by `acquire`.
    fn release<T>(&self, buf : Vec<T>);
}

/// The default [`Allocator`], delegating to the global heap.
pub struct HeapAllocator;

impl Allocator for HeapAllocator {
    fn acquire<T: Copy + Default>(&self, len : usize) -> Option<Vec<T>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len).ok()?;
        buf.resize(len, T::default());
        Some(buf)
    }

    fn release<T>(&self, buf : Vec<T>) {
        drop(buf);
    }
}

/// `Allocator::acquire` with the failure already mapped to a `DecodeError`.
pub(crate) fn acquire<T: Copy + Default, A: Allocator>(
    allocator : &A,
    len : usize
) -> Result<Vec<T>> {
    allocator
        .acquire(len)
        .ok_or(DecodeError::AllocationFailed { len })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn heap_allocator_zeroes_its_buffers() {
        let buf : Vec<u8> = HeapAllocator.acquire(16).unwrap();
        assert_eq!(buf, vec![0; 16]);
        HeapAllocator.release(buf);
    }

    #[test]
    fn acquire_maps_failure() {
        struct NoMemory;
        impl Allocator for NoMemory {
            fn acquire<T: Copy + Default>(&self, _len : usize) -> Option<Vec<T>> {
                None
            }
            fn release<T>(&self, _buf : Vec<T>) {}
        }
        assert_eq!(
            acquire::<u8, _>(&NoMemory, 64),
            Err(DecodeError::AllocationFailed { len: 64 })
        );
    }
}
