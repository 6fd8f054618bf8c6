#![forbid(unsafe_code)]

//! Search-box tokenizer.
//!
//! Free text is split into required phrases: bare words, plus double-quoted
//! runs kept together. A quote left open at the end is ignored, and its
//! tail is split into words like unquoted text.

/// Split search text into words and quoted phrases.
///
/// ```
/// use barpos_core::search_terms;
/// assert_eq!(
///     search_terms("\"Rött vin\" Kryddigt Mustigt"),
///     vec!["Rött vin", "Kryddigt", "Mustigt"],
/// );
/// ```
#[must_use]
pub fn search_terms(text: &str) -> Vec<String> {
    let chunks: Vec<&str> = text.split('"').map(str::trim).collect();
    let last = chunks.len().saturating_sub(1);
    let mut terms = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let quoted = i % 2 == 1 && i < last;
        if quoted {
            if !chunk.is_empty() {
                terms.push((*chunk).to_owned());
            }
        } else {
            terms.extend(chunk.split_whitespace().map(str::to_owned));
        }
    }
    terms
}

/// Inverse of [`search_terms`]: phrases containing spaces are quoted.
///
/// Used to refill a search box from a stored filter.
#[must_use]
pub fn join_search_terms<S: AsRef<str>>(terms: &[S]) -> String {
    terms
        .iter()
        .map(|t| {
            let t = t.as_ref();
            if t.contains(' ') {
                format!("\"{t}\"")
            } else {
                t.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words() {
        assert_eq!(search_terms("pale  ale "), vec!["pale", "ale"]);
    }

    #[test]
    fn quoted_phrase_kept_whole() {
        assert_eq!(
            search_terms("IPA \"West Coast\" hoppy"),
            vec!["IPA", "West Coast", "hoppy"]
        );
    }

    #[test]
    fn unmatched_quote_splits_tail() {
        assert_eq!(search_terms("ale \"dark stout"), vec!["ale", "dark", "stout"]);
    }

    #[test]
    fn empty_quotes_and_blank_input() {
        assert!(search_terms("").is_empty());
        assert!(search_terms("   ").is_empty());
        assert_eq!(search_terms("\"\" ale"), vec!["ale"]);
    }

    #[test]
    fn join_is_inverse_for_simple_input() {
        let terms = search_terms("\"Rött vin\" Kryddigt");
        assert_eq!(join_search_terms(&terms), "\"Rött vin\" Kryddigt");
        assert_eq!(search_terms(&join_search_terms(&terms)), terms);
    }
}
