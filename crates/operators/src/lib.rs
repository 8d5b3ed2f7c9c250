//! `operators` crate — execution descriptors attached to every task.
//!
//! A descriptor says *what* a task does when the external platform runs it
//! (a no-op placeholder, or a container pod).  The graph and integrity
//! crates carry it opaquely and never interpret it.

pub mod descriptor;
pub mod pod;

pub use descriptor::ExecutionDescriptor;
pub use pod::PodSpec;
