use thiserror::Error;

/// Errors from parsing machine attributes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid mac address: {0}")]
    InvalidMac(String),

    #[error("unknown architecture: {0}")]
    UnknownArch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::InvalidMac("xx-yy".to_string());
        assert_eq!(err.to_string(), "invalid mac address: xx-yy");

        let err = ModelError::UnknownArch("mips".to_string());
        assert_eq!(err.to_string(), "unknown architecture: mips");
    }
}
