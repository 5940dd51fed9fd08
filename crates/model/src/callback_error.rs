use std::fmt;

/// Error raised by a lifecycle callback. A failing before-callback aborts
/// the whole commit attempt before anything reaches the backing store.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackError {
    Validation {
        message: String,
        hint: Option<String>,
    },
    Hook {
        message: String,
    },
    Halted {
        reason: String,
    },
}

impl CallbackError {
    pub fn validation(message: &str) -> Self {
        Self::Validation {
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn validation_with_hint(message: &str, hint: &str) -> Self {
        Self::Validation {
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    pub fn hook(message: &str) -> Self {
        Self::Hook {
            message: message.to_string(),
        }
    }

    pub fn halted(reason: &str) -> Self {
        Self::Halted {
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackError::Validation { message, hint } => {
                write!(f, "Validation error: {}", message)?;
                if let Some(hint) = hint {
                    write!(f, " (hint: {})", hint)?;
                }
                Ok(())
            }
            CallbackError::Hook { message } => write!(f, "Hook error: {}", message),
            CallbackError::Halted { reason } => write!(f, "Callback halted: {}", reason),
        }
    }
}

impl std::error::Error for CallbackError {}

impl From<std::io::Error> for CallbackError {
    fn from(err: std::io::Error) -> Self {
        Self::hook(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_error_validation() {
        let error = CallbackError::validation("Invalid email format");

        match error {
            CallbackError::Validation { message, hint } => {
                assert_eq!(message, "Invalid email format");
                assert!(hint.is_none());
            }
            _ => panic!("Expected validation error"),
        }
    }

    #[test]
    fn test_callback_error_validation_with_hint() {
        let error =
            CallbackError::validation_with_hint("Invalid email format", "Use user@domain.com");

        match error {
            CallbackError::Validation { message, hint } => {
                assert_eq!(message, "Invalid email format");
                assert_eq!(hint.unwrap(), "Use user@domain.com");
            }
            _ => panic!("Expected validation error"),
        }
    }

    #[test]
    fn test_callback_error_halted() {
        let error = CallbackError::halted("caller cancelled the destroy");

        match error {
            CallbackError::Halted { reason } => {
                assert_eq!(reason, "caller cancelled the destroy");
            }
            _ => panic!("Expected halted error"),
        }
    }

    #[test]
    fn test_callback_error_display() {
        let error = CallbackError::validation_with_hint("bad title", "shorten it");
        let display_message = format!("{}", error);
        assert!(display_message.contains("bad title"));
        assert!(display_message.contains("shorten it"));
    }

    #[test]
    fn test_callback_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let error: CallbackError = io_error.into();

        match error {
            CallbackError::Hook { message } => assert!(message.contains("disk full")),
            _ => panic!("Expected hook error"),
        }
    }
}
