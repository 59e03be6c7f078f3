use thiserror::Error;

/// The error taxonomy shared by every component of the assembler core.
///
/// Display renders as `[ERROR][<component>]: <message>`, matching the
/// diagnostic format the CLI prints to stderr on a fatal failure.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RaocError {
    #[error("[ERROR][{component}]: {message}")]
    InvalidInput { component: &'static str, message: String },

    #[error("[ERROR][{component}]: {message}")]
    SizeLimit { component: &'static str, message: String },

    #[error("[ERROR][io]: {0}")]
    Io(#[from] std::io::Error),

    #[error("[ERROR][{component}]: {message}")]
    InvariantViolation { component: &'static str, message: String },
}

impl RaocError {
    pub fn invalid_input(component: &'static str, message: impl Into<String>) -> Self {
        RaocError::InvalidInput { component, message: message.into() }
    }

    pub fn size_limit(component: &'static str, message: impl Into<String>) -> Self {
        RaocError::SizeLimit { component, message: message.into() }
    }

    pub fn invariant(component: &'static str, message: impl Into<String>) -> Self {
        RaocError::InvariantViolation { component, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, RaocError>;
