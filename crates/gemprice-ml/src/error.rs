use std::error::Error;
use std::fmt;
use std::panic::Location;

/// The single error kind surfaced by every pipeline stage.
///
/// Wraps the underlying cause together with the source location where the
/// failure was converted, so a log line points at the stage that gave up.
#[derive(Debug)]
pub struct PipelineError {
    context: String,
    location: &'static Location<'static>,
    source: anyhow::Error,
}

impl PipelineError {
    #[track_caller]
    pub fn new(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        PipelineError {
            context: context.into(),
            location: Location::caller(),
            source: source.into(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    pub fn cause(&self) -> &anyhow::Error {
        &self.source
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Error occurred in [{}] line [{}]: {}: {:#}",
            self.location.file(),
            self.location.line(),
            self.context,
            self.source
        )
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

/// Convert any `Result` into a `PipelineError` at a stage boundary, logging
/// the failure before handing it back to the caller.
pub trait WrapErr<T> {
    #[track_caller]
    fn wrap_err(self, context: &str) -> Result<T, PipelineError>;
}

impl<T, E> WrapErr<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    #[track_caller]
    fn wrap_err(self, context: &str) -> Result<T, PipelineError> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => {
                let err = PipelineError::new(context, e);
                log::error!("{}", err);
                Err(err)
            }
        }
    }
}
