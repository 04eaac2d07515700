//! Fingerprint dispatch.
//!
//! Takes the output of a port scan and a domain scan, derives one probe target per
//! `(address, port)`, prunes it, fans the survivors out to the fingerprint engine
//! under a bounded worker pool and appends every identified product back onto the
//! scan result it came from.
//!
//! The entry point is [`dispatch::FingerprintHub`].

pub mod blacklist;
pub mod dispatch;
pub mod engine;
pub mod enumerate;
pub mod filter;
pub mod merge;
pub mod optimization;

#[cfg(test)]
mod log_capture;
