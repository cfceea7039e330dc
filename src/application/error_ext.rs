//! Attaching file context to low-level failures

use std::error::Error;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Turns any error into `OperationFailed` naming the action and the file.
pub trait PathContext<T> {
    /// ```ignore
    /// fs.read_to_string(path).with_path_context("read snapshot", path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T, E> PathContext<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::OperationFailed {
            context: format!("cannot {} {}", action, path.display()),
            source: Box::new(source),
        })
    }
}
