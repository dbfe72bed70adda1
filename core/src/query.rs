use crate::engine::ExecutionPolicy;
use crate::error::{Result, SearchError};
use crate::tokenizer::{is_valid_word, split_into_words, StopWords};
use rayon::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWord<'a> {
    pub data: &'a str,
    pub is_minus: bool,
    pub is_stop: bool,
}

/// Parsed query. Both word lists are sorted and free of duplicates whichever
/// policy produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'a> {
    pub plus_words: Vec<&'a str>,
    pub minus_words: Vec<&'a str>,
}

pub fn parse_query_word<'a>(token: &'a str, stop_words: &StopWords) -> Result<QueryWord<'a>> {
    let invalid = || SearchError::InvalidQueryWord { word: token.to_string() };
    if token.is_empty() {
        return Err(invalid());
    }
    let (word, is_minus) = match token.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    if word.is_empty() || word.starts_with('-') || !is_valid_word(word) {
        return Err(invalid());
    }
    Ok(QueryWord { data: word, is_minus, is_stop: stop_words.contains(word) })
}

pub fn parse_query<'a>(
    text: &'a str,
    stop_words: &StopWords,
    policy: ExecutionPolicy,
) -> Result<Query<'a>> {
    match policy {
        ExecutionPolicy::Sequential => parse_into_sets(text, stop_words),
        ExecutionPolicy::Parallel => parse_into_lists(text, stop_words),
    }
}

fn parse_into_sets<'a>(text: &'a str, stop_words: &StopWords) -> Result<Query<'a>> {
    let mut plus = BTreeSet::new();
    let mut minus = BTreeSet::new();
    for token in split_into_words(text) {
        let word = parse_query_word(token, stop_words)?;
        if word.is_stop {
            continue;
        }
        if word.is_minus {
            minus.insert(word.data);
        } else {
            plus.insert(word.data);
        }
    }
    Ok(Query {
        plus_words: plus.into_iter().collect(),
        minus_words: minus.into_iter().collect(),
    })
}

fn parse_into_lists<'a>(text: &'a str, stop_words: &StopWords) -> Result<Query<'a>> {
    let mut query = Query::default();
    for token in split_into_words(text) {
        let word = parse_query_word(token, stop_words)?;
        if word.is_stop {
            continue;
        }
        if word.is_minus {
            query.minus_words.push(word.data);
        } else {
            query.plus_words.push(word.data);
        }
    }
    // the accumulator would count a repeated word twice
    delete_copies(&mut query.plus_words);
    delete_copies(&mut query.minus_words);
    Ok(query)
}

fn delete_copies(words: &mut Vec<&str>) {
    words.par_sort_unstable();
    words.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop() -> StopWords {
        StopWords::new(["and", "with"]).unwrap()
    }

    #[test]
    fn plus_and_minus_words() {
        let w = parse_query_word("-rat", &stop()).unwrap();
        assert_eq!(w, QueryWord { data: "rat", is_minus: true, is_stop: false });
        let w = parse_query_word("with", &stop()).unwrap();
        assert!(!w.is_minus);
        assert!(w.is_stop);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        for token in ["", "-", "--rat", "-bad\u{1}", "ra\u{1f}t"] {
            let err = parse_query_word(token, &stop()).unwrap_err();
            assert!(matches!(err, SearchError::InvalidQueryWord { .. }), "{token:?}");
        }
    }

    #[test]
    fn inner_minus_is_allowed() {
        let w = parse_query_word("well-known", &stop()).unwrap();
        assert_eq!(w.data, "well-known");
        assert!(!w.is_minus);
    }

    #[test]
    fn stop_words_dropped_from_both_sides() {
        let q = parse_query("pet and -with -rat", &stop(), ExecutionPolicy::Sequential).unwrap();
        assert_eq!(q.plus_words, vec!["pet"]);
        assert_eq!(q.minus_words, vec!["rat"]);
    }

    #[test]
    fn policies_agree_on_duplicates() {
        let text = "rat pet rat -hair cat -hair pet";
        let seq = parse_query(text, &stop(), ExecutionPolicy::Sequential).unwrap();
        let par = parse_query(text, &stop(), ExecutionPolicy::Parallel).unwrap();
        assert_eq!(seq, par);
        assert_eq!(par.plus_words, vec!["cat", "pet", "rat"]);
        assert_eq!(par.minus_words, vec!["hair"]);
    }

    #[test]
    fn same_word_may_be_plus_and_minus() {
        let q = parse_query("rat -rat", &stop(), ExecutionPolicy::Sequential).unwrap();
        assert_eq!(q.plus_words, vec!["rat"]);
        assert_eq!(q.minus_words, vec!["rat"]);
    }
}
