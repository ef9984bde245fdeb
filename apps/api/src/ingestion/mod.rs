pub mod coordinator;
pub mod handlers;
pub mod library;
pub mod side_effects;

pub use coordinator::{Collaborators, DocumentUpload, IngestRequest, IngestionCoordinator};
pub use library::{DownloadLink, ResumeLibrary};
pub use side_effects::{spawn_failure_logger, BackgroundTasks, SideEffectError};
