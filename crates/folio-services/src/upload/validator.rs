use folio_core::config::UploadConfig;

const DEFAULT_MAX_SIZE_MB: u64 = 10;
const DEFAULT_ALLOWED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Why a selected file was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("File type not allowed: {content_type} (allowed: {})", .allowed.join(", "))]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },
}

/// Upload file validator
///
/// Pure checks on size and declared MIME type. Sizes up to and including the
/// limit pass, empty files pass, and types must match the allow-list exactly.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_size_bytes: u64,
    allowed_types: Vec<String>,
}

impl FileValidator {
    pub fn new(max_size_mb: u64, allowed_types: Vec<String>) -> Self {
        Self {
            max_size_bytes: max_size_mb.saturating_mul(1024 * 1024),
            allowed_types,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.max_size_mb, config.allowed_types.clone())
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    pub fn validate(&self, size: u64, content_type: &str) -> Result<(), ValidationError> {
        if size > self.max_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_size_bytes,
            });
        }

        if !self.allowed_types.iter().any(|t| t == content_type) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_types.clone(),
            });
        }

        Ok(())
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_SIZE_MB,
            DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_validate_size_at_limit_ok() {
        let validator = FileValidator::default();
        assert!(validator.validate(10 * MB, "image/png").is_ok());
    }

    #[test]
    fn test_validate_size_one_byte_over() {
        let validator = FileValidator::default();
        assert_eq!(
            validator.validate(10 * MB + 1, "image/png"),
            Err(ValidationError::FileTooLarge {
                size: 10 * MB + 1,
                max: 10 * MB
            })
        );
    }

    #[test]
    fn test_validate_empty_file_ok() {
        let validator = FileValidator::default();
        assert!(validator.validate(0, "image/webp").is_ok());
    }

    #[test]
    fn test_validate_content_type_case_sensitive() {
        let validator = FileValidator::default();
        assert!(validator.validate(100, "image/jpeg").is_ok());
        assert!(matches!(
            validator.validate(100, "IMAGE/JPEG"),
            Err(ValidationError::InvalidContentType { .. })
        ));
        assert!(validator.validate(100, "application/pdf").is_err());
    }

    #[test]
    fn test_validate_size_checked_first() {
        let validator = FileValidator::new(1, vec!["image/png".to_string()]);
        assert!(matches!(
            validator.validate(2 * MB, "text/plain"),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_huge_limit_saturates() {
        let validator = FileValidator::new(u64::MAX, vec!["image/png".to_string()]);
        assert!(validator.validate(u64::MAX, "image/png").is_ok());
    }

    #[test]
    fn test_reason_lists_allowed_types() {
        let validator = FileValidator::new(1, vec!["image/png".to_string(), "image/gif".to_string()]);
        let reason = validator.validate(1, "image/bmp").unwrap_err().to_string();
        assert!(reason.contains("image/bmp"));
        assert!(reason.contains("image/png, image/gif"));
    }
}
