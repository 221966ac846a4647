//! Logging macros with `"key" => value` context pairs (values use `Display`)
//!
//! ```ignore
//! log_error!(codes::lexical::INVALID_ENCODING, "Input is not UTF-8",
//!     span = Span::new(offset, offset + 1),
//!     "offset" => offset
//! );
//! log_warning!(code = codes::lexical::TOKEN_SKIPPED, "Overlong token dropped", "length" => 300);
//! log_debug!("Tokenizer reset");
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    ($($key:expr => $value:expr),*) => {
        vec![$(($key, format!("{}", $value))),*]
    };
}

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_error_with_context(
            $code,
            $message,
            Some($span),
            $crate::__log_context!($($key => $value),*),
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_error_with_context(
            $code,
            $message,
            None,
            $crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_warning_with_context(
            Some($code),
            $message,
            $crate::__log_context!($($key => $value),*),
        )
    };

    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_warning_with_context(
            None,
            $message,
            $crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_success_with_context(
            $code,
            $message,
            $crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_info_with_context(
            $message,
            $crate::__log_context!($($key => $value),*),
        )
    };
}

/// Context values are only formatted when debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_debug_with_context(
                $message,
                $crate::__log_context!($($key => $value),*),
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;

    // Expands every macro arm; events are dropped while no global logger is set
    #[test]
    fn test_macro_arms_expand() {
        let length: usize = 300;
        let span = crate::utils::Span::new(0, 300);

        log_error!(codes::lexical::STREAM_READ_FAILURE, "read failed");
        log_error!(codes::lexical::INVALID_ENCODING, "bad bytes", span = span);
        log_error!(codes::lexical::INVALID_ENCODING, "bad bytes", "offset" => 12);
        log_error!(codes::lexical::INVALID_ENCODING, "bad bytes", span = span, "offset" => 12,);
        log_warning!("plain warning");
        log_warning!("warning", "length" => length);
        log_warning!(code = codes::lexical::TOKEN_SKIPPED, "skipped");
        log_warning!(code = codes::lexical::TOKEN_SKIPPED, "skipped", "length" => length);
        log_success!(codes::success::TOKENIZATION_COMPLETE, "done");
        log_success!(codes::success::TOKENIZATION_COMPLETE, "done", "tokens" => 3, "skipped" => 0);
        log_info!("info");
        log_info!("info", "path" => std::path::Path::new("a.txt").display());
        log_debug!("debug");
        log_debug!("debug", "chars" => 'x');
    }

    #[test]
    fn test_context_pairs_use_display() {
        let context: Vec<(&str, String)> = crate::__log_context!("a" => 1, "b" => "two");
        assert_eq!(context, vec![("a", "1".to_string()), ("b", "two".to_string())]);
    }
}
