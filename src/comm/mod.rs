//! TCP wire transport (SPEC_FULL.md §4.2). Every node in the line is
//! single-threaded and owns its sockets outright, so unlike the reference
//! PLC crate's [`Comm`] trait this layer needs no synchronization: each
//! connection is a plain, directly-owned `TcpStream`.

pub mod listener;
pub mod tcp;
