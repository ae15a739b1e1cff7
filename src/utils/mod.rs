pub mod file_magic;
pub mod validate;

pub use file_magic::validate_magic_bytes;
pub use validate::{validate_comment, validate_message, validate_upload};
