//! Character classes shared by every scanner instance
//!
//! Static, sorted, non-overlapping inclusive ranges searched with a binary
//! search. ASCII takes a fast path.

use std::cmp::Ordering;

type Ranges = &'static [(char, char)];

const LETTER: Ranges = &[
    ('A', 'Z'),
    ('a', 'z'),
    ('\u{00C0}', '\u{00D6}'),
    ('\u{00D8}', '\u{00F6}'),
    ('\u{00F8}', '\u{00FF}'),
    ('\u{0100}', '\u{1FFF}'),
    ('\u{FFA0}', '\u{FFDC}'),
];

/// Decimal digit blocks: ASCII, Arabic-Indic, Extended Arabic-Indic,
/// Devanagari, Bengali, Gurmukhi, Gujarati, Oriya, Tamil, Telugu, Kannada,
/// Malayalam, Thai, Lao, Myanmar.
const DIGIT: Ranges = &[
    ('0', '9'),
    ('\u{0660}', '\u{0669}'),
    ('\u{06F0}', '\u{06F9}'),
    ('\u{0966}', '\u{096F}'),
    ('\u{09E6}', '\u{09EF}'),
    ('\u{0A66}', '\u{0A6F}'),
    ('\u{0AE6}', '\u{0AEF}'),
    ('\u{0B66}', '\u{0B6F}'),
    ('\u{0BE7}', '\u{0BEF}'),
    ('\u{0C66}', '\u{0C6F}'),
    ('\u{0CE6}', '\u{0CEF}'),
    ('\u{0D66}', '\u{0D6F}'),
    ('\u{0E50}', '\u{0E59}'),
    ('\u{0ED0}', '\u{0ED9}'),
    ('\u{1040}', '\u{1049}'),
];

/// Hangul jamo and syllables; grouped into words like letters.
const KOREAN: Ranges = &[('\u{1100}', '\u{11FF}'), ('\u{AC00}', '\u{D7AF}')];

/// Kana, Bopomofo, compatibility jamo, CJK ideographs and halfwidth Katakana.
/// Each character is its own token.
const CJ: Ranges = &[
    ('\u{3040}', '\u{318F}'),
    ('\u{31F0}', '\u{31FF}'),
    ('\u{3300}', '\u{337F}'),
    ('\u{3400}', '\u{4DBF}'),
    ('\u{4E00}', '\u{9FFF}'),
    ('\u{F900}', '\u{FAFF}'),
    ('\u{FF65}', '\u{FF9F}'),
];

fn in_ranges(ranges: Ranges, c: char) -> bool {
    ranges
        .binary_search_by(|&(lo, hi)| {
            if c < lo {
                Ordering::Greater
            } else if c > hi {
                Ordering::Less
            } else {
                Ordering::Equal
            }
        })
        .is_ok()
}

pub fn is_letter(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphabetic()
    } else {
        in_ranges(LETTER, c)
    }
}

pub fn is_digit(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_digit()
    } else {
        in_ranges(DIGIT, c)
    }
}

pub fn is_korean(c: char) -> bool {
    !c.is_ascii() && in_ranges(KOREAN, c)
}

pub fn is_cj(c: char) -> bool {
    !c.is_ascii() && in_ranges(CJ, c)
}

/// Characters that make up ALPHANUM runs
pub fn is_alnum(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphanumeric()
    } else {
        in_ranges(LETTER, c) || in_ranges(DIGIT, c) || in_ranges(KOREAN, c)
    }
}

/// `- _ / . ,` joining the segments of a number or product code
pub fn is_num_separator(c: char) -> bool {
    matches!(c, '-' | '_' | '/' | '.' | ',')
}

/// RFC 3986 gen-delims
pub fn is_gen_delim(c: char) -> bool {
    matches!(c, ':' | '/' | '?' | '#' | '[' | ']' | '@')
}

/// RFC 3986 sub-delims
pub fn is_sub_delim(c: char) -> bool {
    matches!(
        c,
        '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
    )
}

/// Characters that may continue a token once one has started.
///
/// No rule can match across any other character, so the scanner's
/// lookahead window stops at the first character outside this set.
pub fn is_run_char(c: char) -> bool {
    is_alnum(c)
        || matches!(c, '-' | '.' | '_' | '~' | '%')
        || is_gen_delim(c)
        || is_sub_delim(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sorted(ranges: Ranges) {
        for (lo, hi) in ranges {
            assert!(lo <= hi);
        }
        for pair in ranges.windows(2) {
            assert!(pair[0].1 < pair[1].0, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_tables_are_sorted_and_disjoint() {
        for table in [LETTER, DIGIT, KOREAN, CJ] {
            assert_sorted(table);
        }
    }

    #[test]
    fn test_letters() {
        for c in ['a', 'Z', 'é', 'ß', 'Ω', 'ж', 'ﾠ'] {
            assert!(is_letter(c), "{c:?}");
            assert!(is_alnum(c), "{c:?}");
        }
        for c in ['×', '÷', ' ', '-', '東'] {
            assert!(!is_letter(c), "{c:?}");
        }
    }

    #[test]
    fn test_digits() {
        for c in ['0', '9', '٣', '७', '๕'] {
            assert!(is_digit(c), "{c:?}");
            assert!(is_alnum(c), "{c:?}");
        }
        assert!(!is_digit('a'));
        assert!(!is_digit('²'));
    }

    #[test]
    fn test_korean_groups_like_letters() {
        assert!(is_korean('한'));
        assert!(is_alnum('한'));
        assert!(!is_cj('한'));
    }

    #[test]
    fn test_cj() {
        for c in ['東', '京', 'ひ', 'カ', 'ｱ', '㐀'] {
            assert!(is_cj(c), "{c:?}");
            assert!(!is_alnum(c), "{c:?}");
            assert!(!is_run_char(c), "{c:?}");
        }
        assert!(!is_cj('a'));
    }

    #[test]
    fn test_run_chars() {
        for c in ['a', '7', ':', '/', '?', '#', '@', '&', '\'', '%', '~', '=', '+'] {
            assert!(is_run_char(c), "{c:?}");
        }
        for c in [' ', '\t', '\n', '"', '<', '>', '{', '}', '|', '\\', '^', '`', '\u{0}'] {
            assert!(!is_run_char(c), "{c:?}");
        }
    }
}
