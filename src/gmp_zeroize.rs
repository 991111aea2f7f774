//! Wipe GMP memory on release.
//!
//! Every [`BigNumber`](libpaillier::unknown_order::BigNumber) in this crate is
//! backed by GMP limbs allocated through `malloc`. Witnesses and proof masks
//! (`y`, `ρ`, `α`, `λ`, `φ(N)`, ...) pass through many temporary GMP buffers
//! that Rust never sees, so zeroizing the Rust-side values is not enough. GMP
//! lets the application replace its `realloc`/`free` functions; we install
//! wrappers that overwrite a buffer before handing it back to the allocator.

use gmp_mpfr_sys::gmp::{
    allocate_function, free_function, get_memory_functions, reallocate_function,
    set_memory_functions,
};
use std::{ffi::c_void, ptr::addr_of_mut, slice, sync::Once};
use zeroize::Zeroize;

static INSTALL: Once = Once::new();

static mut GMP_ALLOC: allocate_function = None;
static mut GMP_REALLOC: reallocate_function = None;
static mut GMP_FREE: free_function = None;

/// Enable zeroization of GMP memory allocations.
///
/// Call this once at startup, before producing or verifying proofs. Repeated
/// calls are no-ops.
pub fn enable_zeroize() {
    INSTALL.call_once(install_hooks);
}

fn install_hooks() {
    unsafe {
        // SAFETY: Calling a C API documented here: https://gmplib.org/manual/Custom-Allocation
        get_memory_functions(
            addr_of_mut!(GMP_ALLOC),
            addr_of_mut!(GMP_REALLOC),
            addr_of_mut!(GMP_FREE),
        );

        // SAFETY: There are no documented error conditions.
        assert!(
            GMP_ALLOC.and(GMP_REALLOC).and(GMP_FREE).is_some(),
            "GMP should return its memory functions."
        );

        // The allocation function is kept; only release paths are wrapped.
        set_memory_functions(None, Some(wiping_realloc), Some(wiping_free));
    }
}

extern "C" fn wiping_realloc(old_ptr: *mut c_void, old_size: usize, new_size: usize) -> *mut c_void {
    // The system realloc would take ownership of the old buffer before we get
    // a chance to wipe it, so copy into a fresh allocation instead.
    unsafe {
        // SAFETY: hooks are installed only after GMP_ALLOC is set.
        let new_ptr = GMP_ALLOC.unwrap()(new_size);

        // SAFETY: per the GMP docs, `old_ptr` is a live block of `old_size` bytes.
        let kept = old_size.min(new_size);
        slice::from_raw_parts_mut(new_ptr as *mut u8, kept)
            .copy_from_slice(slice::from_raw_parts(old_ptr as *const u8, kept));

        wiping_free(old_ptr, old_size);
        new_ptr
    }
}

extern "C" fn wiping_free(ptr: *mut c_void, size: usize) {
    unsafe {
        // SAFETY: per the GMP docs, `ptr` is a live block of `size` bytes.
        slice::from_raw_parts_mut(ptr as *mut u8, size).zeroize();

        // SAFETY: hooks are installed only after GMP_FREE is set.
        GMP_FREE.unwrap()(ptr, size);
    }
}
