// build.rs - TOML-driven constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    tokenizer: TokenizerLimits,
    documents: DocumentLimits,
    batch: BatchLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct TokenizerLimits {
    default_max_token_length: usize,
    max_lookahead_chars: usize,
    read_buffer_size: usize,
}

#[derive(serde::Deserialize)]
struct DocumentLimits {
    max_document_size: u64,
    max_documents_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct BatchLimits {
    max_worker_threads: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=TOKENIZER_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=TOKENIZER_CONFIG_DIR");

    let profile = env::var("TOKENIZER_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("TOKENIZER_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the crate directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_DOCUMENT_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_LOOKAHEAD: usize = 1 << 24;

    if config.tokenizer.default_max_token_length == 0 {
        panic!("default_max_token_length must be at least 1");
    }

    // A token that fits the length policy must fit a single lookahead window
    if config.tokenizer.max_lookahead_chars < config.tokenizer.default_max_token_length {
        panic!("max_lookahead_chars must not be smaller than default_max_token_length");
    }

    if config.tokenizer.max_lookahead_chars > ABSOLUTE_MAX_LOOKAHEAD {
        panic!("max_lookahead_chars exceeds absolute maximum");
    }

    if config.tokenizer.read_buffer_size < 4 {
        panic!("read_buffer_size must hold at least one UTF-8 sequence");
    }

    if config.documents.max_document_size > ABSOLUTE_MAX_DOCUMENT_SIZE {
        panic!("max_document_size exceeds absolute maximum");
    }

    if config.batch.max_worker_threads == 0 {
        panic!("max_worker_threads must be at least 1");
    }

    if config.logging.log_buffer_size == 0 {
        panic!("log_buffer_size must be at least 1");
    }

    if profile == "production" && config.documents.max_document_size > 100_000_000 {
        panic!("PRODUCTION: max_document_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod tokenizer {{
        pub const DEFAULT_MAX_TOKEN_LENGTH: usize = {};
        pub const MAX_LOOKAHEAD_CHARS: usize = {};
        pub const READ_BUFFER_SIZE: usize = {};
    }}

    pub mod documents {{
        pub const MAX_DOCUMENT_SIZE: u64 = {};
        pub const MAX_DOCUMENTS_PER_BATCH: usize = {};
    }}

    pub mod batch {{
        pub const MAX_WORKER_THREADS: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        config.tokenizer.default_max_token_length,
        config.tokenizer.max_lookahead_chars,
        config.tokenizer.read_buffer_size,
        config.documents.max_document_size,
        config.documents.max_documents_per_batch,
        config.batch.max_worker_threads,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
    );

    fs::write(output_path, constants_code).unwrap();
}
