//! Error and success codes with their classification metadata
//!
//! Single source of truth for every code the tokenizer logs.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code wrapper shared by error, warning, and success events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const INVALID_CONFIGURATION: Code = Code::new("ERR003");
}

/// Document access codes (files handed to the CLI or batch runner)
pub mod documents {
    use super::Code;

    pub const DOCUMENT_NOT_FOUND: Code = Code::new("E005");
    pub const DOCUMENT_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Scanner and adapter codes
pub mod lexical {
    use super::Code;

    pub const STREAM_READ_FAILURE: Code = Code::new("E020");
    pub const INVALID_ENCODING: Code = Code::new("E021");
    pub const TOKEN_SKIPPED: Code = Code::new("E022");
    pub const INVALID_MAX_TOKEN_LENGTH: Code = Code::new("E023");
}

pub mod batch {
    use super::Code;

    pub const NO_DOCUMENTS_FOUND: Code = Code::new("E060");
    pub const TOO_MANY_DOCUMENTS: Code = Code::new("E061");
    pub const WORKER_FAILURE: Code = Code::new("E062");
}

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const DOCUMENT_DISCOVERY_COMPLETE: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const BATCH_COMPLETE: Code = Code::new("I060");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

#[rustfmt::skip]
const REGISTRY_TABLE: &[(&str, &str, Severity, bool, bool, &str, &str)] = &[
    // code, category, severity, recoverable, requires_halt, description, action
    ("ERR002", "System", Severity::Critical, false, true,
        "System initialization failure", "Check logging configuration and environment variables"),
    ("ERR003", "System", Severity::High, false, true,
        "Preferences file is unreadable or not valid TOML", "Fix the file passed with --config"),

    ("E005", "Documents", Severity::Medium, false, true,
        "Document not found at specified path", "Check the path and ensure the document exists"),
    ("E007", "Documents", Severity::Medium, true, false,
        "Document exceeds maximum size limit", "Split the document or rebuild with a larger max_document_size"),
    ("E009", "Documents", Severity::Medium, true, false,
        "Permission denied reading document", "Check file permissions"),
    ("E011", "Documents", Severity::Medium, true, false,
        "I/O error while accessing document", "Retry the operation or check the storage device"),
    ("E012", "Documents", Severity::Low, true, false,
        "Path is not a usable document or directory", "Pass a regular file, a directory, or read from stdin"),

    ("E020", "Lexical", Severity::High, false, true,
        "Underlying stream read failed; scan session aborted", "Check the input source and reset the tokenizer"),
    ("E021", "Lexical", Severity::High, false, true,
        "Input is not valid UTF-8", "Transcode the document to UTF-8 before tokenizing"),
    ("E022", "Lexical", Severity::Low, true, false,
        "Token longer than the maximum token length was dropped", "Raise max_token_length if long tokens are expected"),
    ("E023", "Lexical", Severity::Medium, true, false,
        "Maximum token length is out of range", "Use a value between 1 and the lookahead window size"),

    ("E060", "Batch", Severity::Medium, true, false,
        "No matching documents found in directory", "Check the directory and the accepted extensions"),
    ("E061", "Batch", Severity::Medium, true, false,
        "Too many documents for one batch", "Split the directory or raise max_documents_per_batch"),
    ("E062", "Batch", Severity::High, false, false,
        "Batch worker thread failed", "Re-run with a single thread to isolate the failing document"),

    ("I004", "Success", Severity::Low, true, false,
        "System initialization completed", "None"),
    ("I006", "Success", Severity::Low, true, false,
        "Document discovery completed", "None"),
    ("I020", "Success", Severity::Low, true, false,
        "Tokenization completed", "None"),
    ("I060", "Success", Severity::Low, true, false,
        "Batch tokenization completed", "None"),
];

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_TABLE
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_is_registered() {
        let all = [
            system::INITIALIZATION_FAILURE,
            system::INVALID_CONFIGURATION,
            documents::DOCUMENT_NOT_FOUND,
            documents::DOCUMENT_TOO_LARGE,
            documents::PERMISSION_DENIED,
            documents::IO_ERROR,
            documents::INVALID_PATH,
            lexical::STREAM_READ_FAILURE,
            lexical::INVALID_ENCODING,
            lexical::TOKEN_SKIPPED,
            lexical::INVALID_MAX_TOKEN_LENGTH,
            batch::NO_DOCUMENTS_FOUND,
            batch::TOO_MANY_DOCUMENTS,
            batch::WORKER_FAILURE,
            success::SYSTEM_INITIALIZATION_COMPLETED,
            success::DOCUMENT_DISCOVERY_COMPLETE,
            success::TOKENIZATION_COMPLETE,
            success::BATCH_COMPLETE,
        ];
        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
        assert_eq!(get_error_registry().len(), all.len());
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E020"), "Lexical");
        assert!(requires_halt("E020"));
        assert!(is_recoverable("E022"));
        assert_eq!(get_severity("ERR002"), Severity::Critical);
    }

    #[test]
    fn test_unknown_code_fallbacks() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
        assert!(!requires_halt("Z999"));
    }
}
