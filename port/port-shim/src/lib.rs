//! # Platform shim for the embedded network stack
//!
//! The third-party network stack runs unmodified on top of a small, fixed
//! callback contract: monotonic time, a cooperative-yield hook, mutual
//! exclusion, and zero-initializing allocation/free. [`StackPort`] is that
//! contract, bound to a concrete platform through the [`Host`] trait.
//!
//! The protocol logic itself, the kernel's capability and IPC machinery,
//! and the timer driver all live elsewhere; this crate only adapts between
//! them and the stack. The one substantial piece underneath is the
//! fixed-capacity pool in [`port_alloc`] that backs `zalloc`/`zfree`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod host;
mod port;

pub use host::Host;
pub use port::{StackGuard, StackPort};
