//! Tests for error types

#[cfg(test)]
mod tests {
    use super::super::error::{DaemonError, ErrorKind};

    #[test]
    fn test_communication_error() {
        let err = DaemonError::Communication("connection refused".to_string());
        assert!(err.to_string().contains("Communication error"));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.kind(), ErrorKind::Communication);
    }

    #[test]
    fn test_protocol_error() {
        let err = DaemonError::Protocol("missing result".to_string());
        assert!(err.to_string().contains("Protocol error"));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_json_error_is_protocol() {
        let err: DaemonError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(err.to_string().contains("JSON parsing error"));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_validation_error_is_user_facing() {
        let err = DaemonError::Validation("amount must be a number".to_string());
        assert!(err.is_user_facing());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("amount must be a number"));
    }

    #[test]
    fn test_division_by_zero() {
        let err = DaemonError::DivisionByZero;
        assert_eq!(err.kind(), ErrorKind::Computation);
        assert!(!err.is_user_facing());
        assert!(err.to_string().contains("Division by zero"));
    }

    #[test]
    fn test_config_error() {
        let err = DaemonError::Config("missing pool url".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no cookie");
        let err: DaemonError = io.into();
        assert!(err.to_string().contains("I/O error"));
        assert_eq!(err.kind(), ErrorKind::Communication);
    }

    #[test]
    fn test_notification_error_not_user_facing() {
        let err = DaemonError::Notification("smtp down".to_string());
        assert!(!err.is_user_facing());
        assert_eq!(err.kind(), ErrorKind::Communication);
    }

    #[test]
    fn test_user_message() {
        let err = DaemonError::Validation("PART amount value \"x\" is not valid.".to_string());
        assert_eq!(err.user_message(), Some("PART amount value \"x\" is not valid."));

        let err = DaemonError::Communication("timeout".to_string());
        assert!(err.user_message().is_none());
        assert!(DaemonError::Config("bad".to_string()).user_message().is_none());
    }
}
