/// Normalizes extracted text
///
/// Trims the input and collapses every run of whitespace (spaces, tabs, newlines,
/// non-breaking spaces) to a single space. Text that is empty after trimming becomes
/// the empty string. Applying it twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use news_ripple::clean_text;
///
/// assert_eq!(clean_text("  Fed\n\tRaises   Rates "), "Fed Raises Rates");
/// assert_eq!(clean_text(" \n "), "");
/// ```
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
