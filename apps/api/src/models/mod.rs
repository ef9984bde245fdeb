pub mod resume;

pub use resume::{NewResume, NewStructuredResume, ResumeResponse, ResumeRow};
