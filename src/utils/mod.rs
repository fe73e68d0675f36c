pub mod extractor;
pub mod file_magic;
pub mod jwt;
pub mod multipart;
pub mod parameter_error_handler;
pub mod password;
pub mod validate;

pub use extractor::{SafeAssignmentId, SafeCourseId, SafeSubmissionId};
pub use file_magic::validate_magic_bytes;
pub use parameter_error_handler::json_error_handler;
