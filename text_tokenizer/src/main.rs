use serde::Serialize;
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use text_tokenizer::batch::{self, DocumentSummary};
use text_tokenizer::config::runtime::{BatchPreferences, RuntimeConfig, TokenizerPreferences};
use text_tokenizer::lexical::{self, Tokenizer};
use text_tokenizer::logging::{self, codes};
use text_tokenizer::tokens::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    path: Option<PathBuf>,
    config: Option<PathBuf>,
    max_token_length: Option<usize>,
    json: bool,
    summary: bool,
    threads: Option<usize>,
    recursive: bool,
    help: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            path: None,
            config: None,
            max_token_length: None,
            json: false,
            summary: false,
            threads: None,
            recursive: true,
            help: false,
        }
    }
}

/// One token line of JSON output
#[derive(Serialize)]
struct TokenRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<&'a Path>,
    #[serde(flatten)]
    token: &'a Token,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("text_tokenizer");

    let options = match parse_args(&args[1.min(args.len())..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} [OPTIONS] [PATH]", program);
            eprintln!("       {} --help", program);
            std::process::exit(2);
        }
    };

    if options.help {
        print_help(program);
        return Ok(());
    }

    let config = match &options.config {
        Some(path) => match RuntimeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error[{}]: {}", e.error_code(), e);
                std::process::exit(2);
            }
        },
        None => RuntimeConfig::default(),
    };

    if let Err(message) = init_logging(&config) {
        eprintln!("error[{}]: {}", codes::system::INITIALIZATION_FAILURE, message);
        std::process::exit(1);
    }

    let mut tokenizer_prefs = config.tokenizer;
    if let Some(length) = options.max_token_length {
        tokenizer_prefs.max_token_length = length;
    }
    tokenizer_prefs.validate()?;

    let mut batch_prefs = config.batch;
    if !options.recursive {
        batch_prefs.recursive = false;
    }
    if let Some(threads) = options.threads {
        batch_prefs.max_threads = threads;
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let succeeded = match &options.path {
        None => {
            tokenize_single(io::stdin().lock(), None, tokenizer_prefs, &options, &mut out)?;
            true
        }
        Some(path) if path.is_dir() => {
            tokenize_batch(path, &batch_prefs, &tokenizer_prefs, &options, &mut out)?
        }
        Some(path) if path.is_file() => {
            let file = File::open(path)?;
            tokenize_single(file, Some(path), tokenizer_prefs, &options, &mut out)?;
            true
        }
        Some(path) => {
            eprintln!("Error: Input must be a file or directory");
            eprintln!("  Path: {}", path.display());
            std::process::exit(1);
        }
    };

    out.flush()?;
    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(config: &RuntimeConfig) -> Result<(), String> {
    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;
    lexical::init_lexical_logging()
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => options.help = true,
            "--json" => options.json = true,
            "--summary" => options.summary = true,
            "--no-recursive" => options.recursive = false,
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a file path")?;
                options.config = Some(PathBuf::from(path));
            }
            "--max-token-length" => {
                i += 1;
                options.max_token_length = Some(parse_number(args.get(i), "--max-token-length")?);
            }
            "--threads" => {
                i += 1;
                options.threads = Some(parse_number(args.get(i), "--threads")?.max(1));
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option '{}'", flag));
            }
            path => {
                if options.path.is_some() {
                    return Err(format!("Unexpected extra argument '{}'", path));
                }
                options.path = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    Ok(options)
}

fn parse_number(value: Option<&String>, flag: &str) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("{} requires a number", flag))?;
    value
        .parse::<usize>()
        .map_err(|_| format!("Invalid number '{}' for {}", value, flag))
}

fn tokenize_single<R: Read, W: Write>(
    reader: R,
    path: Option<&Path>,
    preferences: TokenizerPreferences,
    options: &CliOptions,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tokenizer = Tokenizer::with_preferences(reader, preferences)?;

    if options.summary {
        let tokens = tokenizer.collect_stream()?;
        let label = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("<stdin>"));
        let summary = DocumentSummary::from_tokens(label, &tokens, tokenizer.metrics().chars_consumed);
        write_summary(out, &summary, options.json)?;
        return Ok(());
    }

    let mut token = Token::default();
    while tokenizer.emit_next_into(&mut token)? {
        write_token(out, path, &token, options.json)?;
    }
    Ok(())
}

/// Returns `false` when any document failed
fn tokenize_batch<W: Write>(
    dir: &Path,
    batch_prefs: &BatchPreferences,
    tokenizer_prefs: &TokenizerPreferences,
    options: &CliOptions,
    out: &mut W,
) -> Result<bool, Box<dyn std::error::Error>> {
    let results = batch::tokenize_directory(dir, batch_prefs, tokenizer_prefs)?;

    for document in &results.documents {
        if options.summary {
            write_summary(out, &document.summary, options.json)?;
        } else {
            for token in &document.tokens {
                write_token(out, Some(&document.summary.path), token, options.json)?;
            }
        }
    }

    for (path, error) in &results.failures {
        eprintln!("error[{}]: {}: {}", error.error_code(), path.display(), error);
    }
    eprintln!("{}", results.summary());

    Ok(results.failures.is_empty())
}

fn write_token<W: Write>(
    out: &mut W,
    document: Option<&Path>,
    token: &Token,
    json: bool,
) -> io::Result<()> {
    if json {
        let record = TokenRecord { document, token };
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out)
    } else {
        match document {
            Some(path) => writeln!(out, "{}\t{}", path.display(), token),
            None => writeln!(out, "{}", token),
        }
    }
}

fn write_summary<W: Write>(out: &mut W, summary: &DocumentSummary, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, summary)?;
        return writeln!(out);
    }

    let counts: Vec<String> = summary
        .type_counts
        .iter()
        .map(|(label, n)| format!("{}={}", label, n))
        .collect();
    writeln!(
        out,
        "{}: {} tokens [{}], {} skipped, {} chars",
        summary.path.display(),
        summary.token_count,
        counts.join(" "),
        summary.skipped,
        summary.chars
    )
}

fn print_help(program_name: &str) {
    println!("Text Tokenizer v{}", env!("CARGO_PKG_VERSION"));
    println!("Rule-based tokenizer for words, acronyms, numbers, emails, URIs and CJK text");
    println!();
    println!("USAGE:");
    println!("    {} [OPTIONS]              # Tokenize stdin", program_name);
    println!("    {} [OPTIONS] <file>       # Tokenize one document", program_name);
    println!("    {} [OPTIONS] <directory>  # Tokenize every document", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help                  Show this help message");
    println!("    --config FILE           Read preferences from a TOML file");
    println!("    --max-token-length N    Drop tokens longer than N characters");
    println!("    --json                  One JSON object per token (or per summary)");
    println!("    --summary               Per-document counts instead of tokens");
    println!("    --threads N             Worker threads for directories");
    println!("    --no-recursive          Don't search subdirectories");
    println!();
    println!("OUTPUT:");
    println!("    (text,start,end[,type=<TYPE>][,posIncr=N])   offsets count characters");
    println!();
    println!("ENVIRONMENT:");
    println!("    TOKENIZER_MAX_TOKEN_LENGTH, TOKENIZER_BATCH_EXTENSIONS,");
    println!("    TOKENIZER_LOGGING_ENABLE_CONSOLE, TOKENIZER_LOGGING_MIN_LEVEL");
    println!();

    let limits = lexical::get_lexical_limits();
    println!("LIMITS:");
    println!("    Default max token length: {}", limits.default_max_token_length);
    println!("    Max lookahead: {} chars", limits.max_lookahead_chars);
    println!(
        "    Configuration: {}",
        text_tokenizer::config::build_info::source_info()
    );
}
