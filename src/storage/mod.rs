//!  Storage is organized through [store_file::JsonFileStore].
//!  The basic idea is:
//!   - There is a single JSON document holding every project.
//!   - The document is read once per invocation and rewritten as a whole after every change.
//!   - Nothing guards against two processes writing at the same time; the last writer wins.

pub mod entities;
pub mod errors;
pub mod store_file;
