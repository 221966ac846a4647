//! Multi-document tokenization
//!
//! Documents are discovered in a directory, split across worker threads, and
//! tokenized with one [`Tokenizer`] per worker that is reset for each
//! document.

use crate::config::compile_time::documents::{MAX_DOCUMENTS_PER_BATCH, MAX_DOCUMENT_SIZE};
use crate::config::runtime::{BatchPreferences, TokenizerPreferences};
use crate::lexical::{Scanner, Tokenizer, TokenizerError};
use crate::logging::{self, codes};
use crate::tokens::{TokenStream, TokenType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH TYPES
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("No documents found in directory: {path}")]
    NoDocumentsFound { path: String },

    #[error("Too many documents found: {count} (max: {max})")]
    TooManyDocuments { count: usize, max: usize },

    #[error("Document too large: {path} is {size} bytes (max: {max})")]
    DocumentTooLarge { path: String, size: u64, max: u64 },

    #[error("I/O error on {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("Tokenization failed for {path}: {source}")]
    Tokenizer {
        path: String,
        source: TokenizerError,
    },

    #[error("Worker thread panicked")]
    WorkerPanicked,
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::documents::DOCUMENT_NOT_FOUND,
            BatchError::NotADirectory { .. } => codes::documents::INVALID_PATH,
            BatchError::NoDocumentsFound { .. } => codes::batch::NO_DOCUMENTS_FOUND,
            BatchError::TooManyDocuments { .. } => codes::batch::TOO_MANY_DOCUMENTS,
            BatchError::DocumentTooLarge { .. } => codes::documents::DOCUMENT_TOO_LARGE,
            BatchError::Io { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => codes::documents::DOCUMENT_NOT_FOUND,
                io::ErrorKind::PermissionDenied => codes::documents::PERMISSION_DENIED,
                _ => codes::documents::IO_ERROR,
            },
            BatchError::Tokenizer { source, .. } => source.error_code(),
            BatchError::WorkerPanicked => codes::batch::WORKER_FAILURE,
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        BatchError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Counts for one tokenized document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub path: PathBuf,
    pub token_count: usize,
    /// Non-zero counts keyed by type label
    pub type_counts: BTreeMap<String, usize>,
    pub skipped: usize,
    pub chars: usize,
}

impl DocumentSummary {
    pub fn from_tokens(path: PathBuf, tokens: &TokenStream, chars: usize) -> Self {
        Self {
            path,
            token_count: tokens.len(),
            type_counts: tokens
                .type_counts()
                .into_iter()
                .map(|(t, n)| (t.label().to_string(), n))
                .collect(),
            skipped: tokens.skipped(),
            chars,
        }
    }

    pub fn count(&self, token_type: TokenType) -> usize {
        self.type_counts.get(token_type.label()).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct DocumentResult {
    pub summary: DocumentSummary,
    pub tokens: TokenStream,
}

#[derive(Debug, Default)]
pub struct BatchResults {
    /// Successful documents, ordered by path
    pub documents: Vec<DocumentResult>,
    pub failures: Vec<(PathBuf, BatchError)>,
    pub processing_duration: Duration,
    pub documents_processed: usize,
    pub threads_used: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.documents.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.documents_processed == 0 {
            0.0
        } else {
            self.documents.len() as f64 / self.documents_processed as f64
        }
    }

    pub fn total_tokens(&self) -> usize {
        self.documents.iter().map(|d| d.summary.token_count).sum()
    }

    pub fn summaries(&self) -> impl Iterator<Item = &DocumentSummary> {
        self.documents.iter().map(|d| &d.summary)
    }

    pub fn add_success(&mut self, result: DocumentResult) {
        self.documents.push(result);
        self.documents_processed += 1;
    }

    pub fn add_failure(&mut self, path: PathBuf, error: BatchError) {
        self.failures.push((path, error));
        self.documents_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.documents.extend(other.documents);
        self.failures.extend(other.failures);
        self.documents_processed += other.documents_processed;
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch tokenization completed: {} documents processed, {} successful ({:.1}%), {} failed, {} tokens, {:.2}s total",
            self.documents_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.total_tokens(),
            self.processing_duration.as_secs_f64()
        )
    }
}

// ============================================================================
// DOCUMENT DISCOVERY
// ============================================================================

/// Collect document paths under `dir`, sorted.
pub fn discover_documents(
    dir: &Path,
    preferences: &BatchPreferences,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting document discovery",
        "directory" => dir.display(),
        "recursive" => preferences.recursive
    );

    if !dir.exists() {
        return Err(BatchError::DirectoryNotFound {
            path: dir.display().to_string(),
        });
    }
    if !dir.is_dir() {
        return Err(BatchError::NotADirectory {
            path: dir.display().to_string(),
        });
    }

    let mut documents = Vec::new();
    visit_directory(dir, preferences, &mut documents)?;

    if documents.is_empty() {
        return Err(BatchError::NoDocumentsFound {
            path: dir.display().to_string(),
        });
    }
    if documents.len() > MAX_DOCUMENTS_PER_BATCH {
        return Err(BatchError::TooManyDocuments {
            count: documents.len(),
            max: MAX_DOCUMENTS_PER_BATCH,
        });
    }

    documents.sort();

    crate::log_success!(
        codes::success::DOCUMENT_DISCOVERY_COMPLETE,
        "Document discovery completed",
        "documents_found" => documents.len(),
        "directory" => dir.display()
    );

    Ok(documents)
}

fn visit_directory(
    dir: &Path,
    preferences: &BatchPreferences,
    documents: &mut Vec<PathBuf>,
) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir).map_err(|e| BatchError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| BatchError::io(dir, e))?;
        let path = entry.path();
        // Symlinked directories are not followed
        let file_type = entry.file_type().map_err(|e| BatchError::io(&path, e))?;

        if file_type.is_dir() {
            if preferences.recursive {
                visit_directory(&path, preferences, documents)?;
            }
        } else if is_document(&path, &preferences.extensions) {
            documents.push(path);
            // Stop walking once the cap is exceeded; the caller reports it
            if documents.len() > MAX_DOCUMENTS_PER_BATCH {
                return Ok(());
            }
        }
    }

    Ok(())
}

/// Regular file whose extension is accepted (any extension when the list is empty)
fn is_document(path: &Path, extensions: &[String]) -> bool {
    if !path.is_file() {
        return false;
    }
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

// ============================================================================
// TOKENIZATION
// ============================================================================

/// Tokenize every path, splitting the list across worker threads.
///
/// Per-document failures are collected in the results; only invalid
/// preferences or a panicking worker fail the whole batch.
pub fn tokenize_documents(
    paths: &[PathBuf],
    batch: &BatchPreferences,
    tokenizer: &TokenizerPreferences,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    tokenizer.validate().map_err(|source| BatchError::Tokenizer {
        path: String::new(),
        source,
    })?;

    let threads = batch.max_threads.clamp(1, paths.len().max(1));
    let per_thread = paths.len().div_ceil(threads).max(1);
    let preferences = Arc::new(tokenizer.clone());

    crate::log_info!("Starting batch tokenization",
        "documents" => paths.len(),
        "threads" => threads
    );

    let mut handles = Vec::new();
    for chunk in paths.chunks(per_thread) {
        let worker_paths = chunk.to_vec();
        let preferences = Arc::clone(&preferences);
        handles.push(thread::spawn(move || run_worker(&worker_paths, &preferences)));
    }

    let mut results = BatchResults::new();
    results.threads_used = handles.len();
    for handle in handles {
        let worker_results = handle.join().map_err(|_| BatchError::WorkerPanicked)?;
        results.merge(worker_results);
    }

    results
        .documents
        .sort_by(|a, b| a.summary.path.cmp(&b.summary.path));
    results.failures.sort_by(|a, b| a.0.cmp(&b.0));
    results.processing_duration = start_time.elapsed();

    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch tokenization completed",
        "documents_processed" => results.documents_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "tokens" => results.total_tokens(),
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );

    Ok(results)
}

/// Discover and tokenize a directory
pub fn tokenize_directory(
    dir: &Path,
    batch: &BatchPreferences,
    tokenizer: &TokenizerPreferences,
) -> Result<BatchResults, BatchError> {
    let paths = discover_documents(dir, batch)?;
    tokenize_documents(&paths, batch, tokenizer)
}

fn run_worker(paths: &[PathBuf], preferences: &TokenizerPreferences) -> BatchResults {
    let mut results = BatchResults::new();
    let mut tokenizer: Option<Tokenizer<File>> = None;

    for path in paths {
        let document = path.display().to_string();
        let outcome = logging::with_document_context(&document, || {
            tokenize_document(path, &mut tokenizer, preferences)
        });

        match outcome {
            Ok(result) => results.add_success(result),
            Err(error) => {
                crate::log_error!(error.error_code(), "Document tokenization failed",
                    "document" => document,
                    "error" => error
                );
                results.add_failure(path.clone(), error);
            }
        }
    }

    results
}

fn tokenize_document(
    path: &Path,
    slot: &mut Option<Tokenizer<File>>,
    preferences: &TokenizerPreferences,
) -> Result<DocumentResult, BatchError> {
    let metadata = fs::metadata(path).map_err(|e| BatchError::io(path, e))?;
    if metadata.len() > MAX_DOCUMENT_SIZE {
        return Err(BatchError::DocumentTooLarge {
            path: path.display().to_string(),
            size: metadata.len(),
            max: MAX_DOCUMENT_SIZE,
        });
    }

    let file = File::open(path).map_err(|e| BatchError::io(path, e))?;
    let tokenizer = match slot.take() {
        Some(mut tokenizer) => {
            tokenizer.reset(file);
            tokenizer
        }
        None => Tokenizer::from_scanner(Scanner::new(file), preferences.clone()),
    };
    let tokenizer = slot.insert(tokenizer);

    let tokens = tokenizer
        .collect_stream()
        .map_err(|source| BatchError::Tokenizer {
            path: path.display().to_string(),
            source,
        })?;
    let summary = DocumentSummary::from_tokens(
        path.to_path_buf(),
        &tokens,
        tokenizer.metrics().chars_consumed,
    );

    Ok(DocumentResult { summary, tokens })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn batch_prefs(threads: usize, recursive: bool) -> BatchPreferences {
        BatchPreferences {
            max_threads: threads,
            recursive,
            extensions: vec!["txt".to_string()],
        }
    }

    fn tokenizer_prefs() -> TokenizerPreferences {
        TokenizerPreferences {
            max_token_length: 255,
            collect_metrics: true,
            log_skipped_tokens: false,
        }
    }

    #[test]
    fn test_discovery_filters_and_sorts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "beta").unwrap();
        fs::write(dir.path().join("a.TXT"), "alpha").unwrap();
        fs::write(dir.path().join("skip.bin"), "binary").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "gamma").unwrap();

        let flat = discover_documents(dir.path(), &batch_prefs(1, false)).unwrap();
        let names: Vec<_> = flat.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
        assert_eq!(names, vec!["a.TXT", "b.txt"]);

        let deep = discover_documents(dir.path(), &batch_prefs(1, true)).unwrap();
        assert_eq!(deep.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_discovery_ignores_symlinked_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("doc.txt"), "words").unwrap();
        std::os::unix::fs::symlink(dir.path(), nested.join("loop")).unwrap();
        std::os::unix::fs::symlink(nested.join("doc.txt"), dir.path().join("link.txt")).unwrap();

        let found = discover_documents(dir.path(), &batch_prefs(1, true)).unwrap();
        let names: Vec<_> = found.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
        assert_eq!(names, vec!["link.txt", "doc.txt"]);
    }

    #[test]
    fn test_discovery_errors() {
        let dir = tempdir().unwrap();
        assert_matches!(
            discover_documents(dir.path(), &batch_prefs(1, true)),
            Err(BatchError::NoDocumentsFound { .. })
        );
        assert_matches!(
            discover_documents(&dir.path().join("missing"), &batch_prefs(1, true)),
            Err(BatchError::DirectoryNotFound { .. })
        );

        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = discover_documents(&file, &batch_prefs(1, true)).unwrap_err();
        assert_matches!(err, BatchError::NotADirectory { .. });
        assert_eq!(err.error_code(), codes::documents::INVALID_PATH);
    }

    #[test]
    fn test_empty_extension_list_accepts_everything() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes"), "x").unwrap();
        let prefs = BatchPreferences {
            extensions: Vec::new(),
            ..batch_prefs(1, true)
        };
        assert_eq!(discover_documents(dir.path(), &prefs).unwrap().len(), 1);
    }

    #[test]
    fn test_parallel_tokenization_matches_sequential() {
        let dir = tempdir().unwrap();
        for i in 0..7 {
            fs::write(
                dir.path().join(format!("doc{i}.txt")),
                format!("Document {i} mentions AT&T and http://example.com/{i}"),
            )
            .unwrap();
        }

        let sequential = tokenize_directory(dir.path(), &batch_prefs(1, true), &tokenizer_prefs()).unwrap();
        let parallel = tokenize_directory(dir.path(), &batch_prefs(3, true), &tokenizer_prefs()).unwrap();

        assert_eq!(sequential.success_count(), 7);
        assert_eq!(parallel.threads_used, 3);
        let a: Vec<_> = sequential.summaries().cloned().collect();
        let b: Vec<_> = parallel.summaries().cloned().collect();
        assert_eq!(a, b);

        let first = &parallel.documents[0];
        assert_eq!(first.summary.count(TokenType::Company), 1);
        assert_eq!(first.summary.count(TokenType::Uri), 1);
        assert_eq!(first.summary.count(TokenType::Num), 1);
        assert_eq!(first.tokens.len(), first.summary.token_count);
    }

    #[test]
    fn test_per_document_failures_are_collected() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.txt");
        fs::write(&good, "fine text").unwrap();
        fs::write(&bad, b"broken \xff bytes").unwrap();
        let missing = dir.path().join("missing.txt");

        let results = tokenize_documents(
            &[good, bad, missing],
            &batch_prefs(1, true),
            &tokenizer_prefs(),
        )
        .unwrap();

        assert_eq!(results.success_count(), 1);
        assert_eq!(results.failure_count(), 2);
        assert_matches!(
            &results.failures[0].1,
            BatchError::Tokenizer { source: TokenizerError::InvalidEncoding { offset: 7 }, .. }
        );
        assert_eq!(results.failures[1].1.error_code(), codes::documents::DOCUMENT_NOT_FOUND);
        assert!(results.summary().contains("1 successful"));
    }

    #[test]
    fn test_invalid_preferences_fail_the_batch() {
        let prefs = TokenizerPreferences {
            max_token_length: 0,
            ..tokenizer_prefs()
        };
        assert_matches!(
            tokenize_documents(&[], &batch_prefs(1, true), &prefs),
            Err(BatchError::Tokenizer { source: TokenizerError::InvalidMaxTokenLength { value: 0 }, .. })
        );
    }

    #[test]
    fn test_batch_results_counting() {
        let mut results = BatchResults::new();
        assert_eq!(results.success_rate(), 0.0);
        results.add_failure(PathBuf::from("x"), BatchError::WorkerPanicked);
        assert_eq!(results.documents_processed, 1);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.success_rate(), 0.0);
    }
}
