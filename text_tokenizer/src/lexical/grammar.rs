//! Token rules over a lookahead window
//!
//! Every matcher takes the run of candidate characters starting at the
//! current position and returns the length of its longest match there.
//! The window always starts with an alphanumeric character and never
//! contains characters outside [`chars::is_run_char`].

use crate::lexical::chars::{self, is_alnum, is_digit, is_letter};
use crate::tokens::TokenType;

type Rule = fn(&[char]) -> Option<usize>;

/// Rules in tie-break order; on equal lengths the earlier rule wins.
const RULES: [(TokenType, Rule); 7] = [
    (TokenType::Uri, match_uri),
    (TokenType::Email, match_email),
    (TokenType::Acronym, match_acronym),
    (TokenType::Company, match_company),
    (TokenType::Num, match_num),
    (TokenType::Apostrophe, match_apostrophe),
    (TokenType::Alphanum, match_alphanum),
];

/// Longest rule match at the start of `window`.
///
/// Returns a zero length only for a window that does not start with an
/// alphanumeric character.
pub fn longest_match(window: &[char]) -> (usize, TokenType) {
    let mut best = (0, TokenType::Alphanum);
    for (token_type, rule) in RULES {
        if let Some(len) = rule(window) {
            if len > best.0 {
                best = (len, token_type);
            }
        }
    }
    best
}

fn at(w: &[char], i: usize) -> Option<char> {
    w.get(i).copied()
}

fn alnum_run(w: &[char], mut i: usize) -> usize {
    while at(w, i).is_some_and(is_alnum) {
        i += 1;
    }
    i
}

fn letter_run(w: &[char], mut i: usize) -> usize {
    while at(w, i).is_some_and(is_letter) {
        i += 1;
    }
    i
}

// ============================================================================
// URI (RFC 3986)
// ============================================================================

/// Unreserved characters, widened to every alphanumeric so that
/// internationalized hosts and paths stay in one token.
fn is_unreserved(c: char) -> bool {
    is_alnum(c) || matches!(c, '-' | '.' | '_' | '~')
}

fn is_pchar(c: char) -> bool {
    is_unreserved(c) || chars::is_sub_delim(c) || c == ':' || c == '@'
}

fn is_query_char(c: char) -> bool {
    is_pchar(c) || c == '/' || c == '?'
}

fn is_reg_name_char(c: char) -> bool {
    is_unreserved(c) || chars::is_sub_delim(c)
}

fn is_userinfo_char(c: char) -> bool {
    is_reg_name_char(c) || c == ':'
}

fn is_pct_encoded(w: &[char], i: usize) -> bool {
    at(w, i) == Some('%')
        && at(w, i + 1).is_some_and(|c| c.is_ascii_hexdigit())
        && at(w, i + 2).is_some_and(|c| c.is_ascii_hexdigit())
}

/// Skip characters of a class that also admits percent-encoded octets.
fn skip_encoded(w: &[char], mut i: usize, class: fn(char) -> bool) -> usize {
    loop {
        match at(w, i) {
            Some(c) if class(c) => i += 1,
            Some('%') if is_pct_encoded(w, i) => i += 3,
            _ => return i,
        }
    }
}

fn skip_plain(w: &[char], mut i: usize, class: fn(char) -> bool) -> usize {
    while at(w, i).is_some_and(class) {
        i += 1;
    }
    i
}

/// Index of the `:` ending a scheme, if the window starts with one.
fn scheme(w: &[char]) -> Option<usize> {
    if !at(w, 0)?.is_ascii_alphabetic() {
        return None;
    }
    let end = skip_plain(w, 1, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
    });
    (at(w, end) == Some(':')).then_some(end)
}

fn segment(w: &[char], i: usize) -> usize {
    skip_encoded(w, i, is_pchar)
}

fn path_abempty(w: &[char], mut i: usize) -> usize {
    while at(w, i) == Some('/') {
        i = segment(w, i + 1);
    }
    i
}

fn query_and_fragment(w: &[char], mut i: usize) -> usize {
    if at(w, i) == Some('?') {
        i = skip_encoded(w, i + 1, is_query_char);
    }
    if at(w, i) == Some('#') {
        i = skip_encoded(w, i + 1, is_query_char);
    }
    i
}

/// `[` IPv6address / IPvFuture `]`, loosely: hex digits, colons and dots
/// for the former.
fn ip_literal(w: &[char], i: usize) -> Option<usize> {
    if at(w, i) != Some('[') {
        return None;
    }
    let body = i + 1;
    let end = if matches!(at(w, body), Some('v' | 'V')) {
        let version_end = skip_plain(w, body + 1, |c| c.is_ascii_hexdigit());
        if version_end == body + 1 || at(w, version_end) != Some('.') {
            return None;
        }
        let address_end = skip_plain(w, version_end + 1, |c| {
            is_reg_name_char(c) || c == ':'
        });
        if address_end == version_end + 1 {
            return None;
        }
        address_end
    } else {
        let end = skip_plain(w, body, |c| c.is_ascii_hexdigit() || c == ':' || c == '.');
        if end == body {
            return None;
        }
        end
    };
    (at(w, end) == Some(']')).then_some(end + 1)
}

/// host [ ":" port ]
fn host_port(w: &[char], i: usize) -> usize {
    let host_end = ip_literal(w, i).unwrap_or_else(|| skip_encoded(w, i, is_reg_name_char));
    if at(w, host_end) == Some(':') {
        skip_plain(w, host_end + 1, |c| c.is_ascii_digit())
    } else {
        host_end
    }
}

/// Ends of the authority with and without a userinfo prefix.
fn authority_ends(w: &[char], i: usize) -> [Option<usize>; 2] {
    let userinfo_end = skip_encoded(w, i, is_userinfo_char);
    let with_userinfo = (at(w, userinfo_end) == Some('@')).then(|| host_port(w, userinfo_end + 1));
    [Some(host_port(w, i)), with_userinfo]
}

/// scheme ":" hier-part [ "?" query ] [ "#" fragment ]
///
/// The hier-part alternatives can overlap, so each is tried and the longest
/// complete URI wins. An empty path only counts when a query or fragment
/// follows, which keeps `Note:` an ordinary word. Trailing sentence
/// punctuation is given back, see [`trim_trailing_punct`].
pub fn match_uri(w: &[char]) -> Option<usize> {
    let start = scheme(w)? + 1;
    let mut best = None;
    let mut consider = |hier_end: usize| {
        best = best.max(Some(query_and_fragment(w, hier_end)));
    };

    if at(w, start) == Some('/') && at(w, start + 1) == Some('/') {
        for end in authority_ends(w, start + 2).into_iter().flatten() {
            consider(path_abempty(w, end));
        }
    }

    if at(w, start) == Some('/') {
        let first = segment(w, start + 1);
        consider(if first > start + 1 {
            path_abempty(w, first)
        } else {
            start + 1
        });
    }

    let rootless = segment(w, start);
    if rootless > start {
        consider(path_abempty(w, rootless));
    }

    if matches!(at(w, start), Some('?' | '#')) {
        consider(start);
    }

    best.map(|end| trim_trailing_punct(w, start, end))
}

fn is_trailing_punct(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | '\'')
}

/// Drop punctuation that ends the sentence rather than the URI, keeping at
/// least one character after the scheme. A `)` stays when it closes a `(`
/// inside the URI.
fn trim_trailing_punct(w: &[char], start: usize, mut end: usize) -> usize {
    while end > start + 1 && is_trailing_punct(w[end - 1]) {
        if w[end - 1] == ')' {
            let opened = w[..end].iter().filter(|&&c| c == '(').count();
            let closed = w[..end].iter().filter(|&&c| c == ')').count();
            if closed <= opened {
                break;
            }
        }
        end -= 1;
    }
    end
}

// ============================================================================
// Word-shaped rules
// ============================================================================

/// local "@" domain, with `.`, `_` or `-` joining local-part runs and `.` or
/// `-` joining domain labels.
pub fn match_email(w: &[char]) -> Option<usize> {
    let local_end = separated_runs(w, 0, |c| matches!(c, '.' | '_' | '-'))?;
    if at(w, local_end) != Some('@') {
        return None;
    }
    separated_runs(w, local_end + 1, |c| matches!(c, '.' | '-'))
}

/// Alphanumeric runs joined by single separators; a separator is only
/// consumed when a run follows it.
fn separated_runs(w: &[char], start: usize, separator: fn(char) -> bool) -> Option<usize> {
    let mut i = alnum_run(w, start);
    if i == start {
        return None;
    }
    while at(w, i).is_some_and(separator) {
        let next = alnum_run(w, i + 1);
        if next == i + 1 {
            break;
        }
        i = next;
    }
    Some(i)
}

/// Two or more single letters, each followed by a dot: `U.S.A.`
pub fn match_acronym(w: &[char]) -> Option<usize> {
    let mut i = 0;
    while at(w, i).is_some_and(is_letter) && at(w, i + 1) == Some('.') {
        i += 2;
    }
    (i >= 4).then_some(i)
}

pub fn match_company(w: &[char]) -> Option<usize> {
    let name_end = alnum_run(w, 0);
    if name_end == 0 || at(w, name_end) != Some('&') {
        return None;
    }
    let end = alnum_run(w, name_end + 1);
    (end > name_end + 1).then_some(end)
}

/// Separated alphanumeric segments where at least one holds a digit, or a
/// lone segment made only of digits.
pub fn match_num(w: &[char]) -> Option<usize> {
    let first_end = alnum_run(w, 0);
    if first_end == 0 {
        return None;
    }
    let mut segments = 1;
    let mut has_digit = w[..first_end].iter().any(|&c| is_digit(c));
    let all_digits = w[..first_end].iter().all(|&c| is_digit(c));

    let mut i = first_end;
    while at(w, i).is_some_and(chars::is_num_separator) {
        let next = alnum_run(w, i + 1);
        if next == i + 1 {
            break;
        }
        has_digit |= w[i + 1..next].iter().any(|&c| is_digit(c));
        segments += 1;
        i = next;
    }

    match segments {
        1 if all_digits => Some(first_end),
        1 => None,
        _ if has_digit => Some(i),
        _ => None,
    }
}

/// Alphanumeric run followed by one or more `'letters` groups
pub fn match_apostrophe(w: &[char]) -> Option<usize> {
    let mut i = alnum_run(w, 0);
    if i == 0 {
        return None;
    }
    let mut groups = 0;
    while at(w, i) == Some('\'') {
        let next = letter_run(w, i + 1);
        if next == i + 1 {
            break;
        }
        groups += 1;
        i = next;
    }
    (groups > 0).then_some(i)
}

pub fn match_alphanum(w: &[char]) -> Option<usize> {
    let end = alnum_run(w, 0);
    (end > 0).then_some(end)
}
