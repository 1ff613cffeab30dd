//! Writing aggregated feeds to disk.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 08-00-00.json
//!     └── 14-30-12.json
//! ```

pub mod json;
