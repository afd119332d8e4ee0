//! Page-number stripping for corpus paragraphs
//!
//! Corpus text is usually extracted from a paginated book, so paragraphs
//! carry page headers (`12 «Chapter title»`), footnote enumerations (`3. `)
//! and stray page numbers. None of those belong in a published post.

use regex::Regex;
use std::sync::LazyLock;

// Page header: a number followed by a quoted running title
static PAGE_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[ \t]*\d+[ \t]*["«»“”„][^\n]*?["»“”]"#).expect("Invalid regex pattern")
});

// Numbered footnote marker at the start of a line
static FOOTNOTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+\.[ \t]*").expect("Invalid regex pattern"));

static DIGITS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\d+").expect("Invalid regex pattern"));

/// Remove page headers, footnote markers and bare numbers from a paragraph
///
/// Steps, in order:
/// 1. Quoted page headers (`123 «Title»`, `7 "Title"`)
/// 2. Line-leading footnote markers (`12. `)
/// 3. Every remaining digit run, with the spaces directly before it
/// 4. Trim leading/trailing whitespace
///
/// The result never contains a digit, so applying the function twice gives
/// the same text as applying it once.
///
/// # Examples
///
/// ```
/// use stoik::corpus::strip_page_numbers;
///
/// assert_eq!(strip_page_numbers("Страница 123. текст 456."), "Страница. текст.");
/// ```
pub fn strip_page_numbers(text: &str) -> String {
    let result = PAGE_HEADER_REGEX.replace_all(text, "");
    let result = FOOTNOTE_REGEX.replace_all(&result, "");
    let result = DIGITS_REGEX.replace_all(&result, "");

    result.trim().to_string()
}
