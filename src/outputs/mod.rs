//! Output generation.
//!
//! - [`markdown`]: renders a [`crate::models::GeneratedPost`] as a Jekyll post
//!   and writes it to the posts directory
//!
//! # Output Structure
//!
//! ```text
//! _posts/
//! ├── 2026-10-18-biofundamentals-the-endocrine-control-of-the-ovula.md
//! └── 2026-10-19-dietary-calcium-and-medullary-bone-in-laying-hens.md
//! ```

pub mod markdown;
