//! Text-level passes that run before the tree parser sees the source.

use lazy_static::lazy_static;
use regex::Regex;

/// Raw lines of one listing environment, each terminated by `\n`.
pub type Listing = Vec<String>;

const LISTING_BEGIN: [&str; 2] = [r"\begin{lstlisting}", r"\begin{verbatim}"];
const LISTING_END: [&str; 2] = [r"\end{lstlisting}", r"\end{verbatim}"];

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?m)(^|[^\\])%.*").expect("invalid regex expression");
    static ref DISPLAY_OPEN: Regex =
        Regex::new(r"(?m)(^|[^\\])\\\[").expect("invalid regex expression");
    static ref DISPLAY_CLOSE: Regex =
        Regex::new(r"(?m)(^|[^\\])\\\]").expect("invalid regex expression");
}

/// Apply every text-level rewrite the tree walker relies on.
pub fn normalize(code: &str) -> String {
    replace_display_math(&remove_comments(code))
}

/// Strip `%` line comments. An escaped `\%` is kept, and the line ending always survives.
pub fn remove_comments(code: &str) -> String {
    COMMENT.replace_all(code, "${1}").into_owned()
}

/// Rewrite `\[ ... \]` to an `equation*` environment so display math has a single form.
pub fn replace_display_math(code: &str) -> String {
    let code = DISPLAY_OPEN.replace_all(code, r"${1}\begin{equation*}");
    DISPLAY_CLOSE
        .replace_all(&code, r"${1}\end{equation*}")
        .into_owned()
}

/// Collect the literal body of every `lstlisting`/`verbatim` environment, in source order.
///
/// Begin markers are recognised at the start of a (left-trimmed) line and end markers at its
/// end; the marker lines themselves are not part of the listing.
pub fn get_all_listings(code: &str) -> Vec<Listing> {
    let mut result = vec![];
    let mut block: Option<Listing> = None;

    for line in code.lines() {
        let trimmed = line.trim_start();
        if LISTING_BEGIN.iter().any(|m| trimmed.starts_with(m)) {
            block = Some(vec![]);
        } else if LISTING_END.iter().any(|m| trimmed.ends_with(m)) {
            if let Some(done) = block.take() {
                result.push(done);
            }
        } else if let Some(open) = block.as_mut() {
            open.push(format!("{line}\n"));
        }
    }

    result
}
