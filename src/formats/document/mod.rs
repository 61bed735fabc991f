//! Office documents and PDF.

pub mod ole;
pub mod ooxml;
pub mod pdf;
