//! Global memory allocator configuration.
//!
//! Registers `mimalloc` as the global allocator in place of the system
//! default. Encryption runs allocate and free a pair of chunk buffers per
//! file at a steady rhythm, which mimalloc serves with less fragmentation
//! than the system allocator.

use mimalloc::MiMalloc;

/// The global allocator instance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
