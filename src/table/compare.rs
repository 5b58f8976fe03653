//! Value comparison used by the sort engine.
//!
//! A pair of values compares numerically when both parse as numbers, otherwise with a
//! Unicode collation where digit runs compare by magnitude ("item9" < "item10") and
//! accented letters sort next to their base letter ("Émile" < "Zoe").

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use icu_collator::{Collator, CollatorOptions, Numeric};

thread_local! {
    // root collation; one per thread so the parallel sort never shares it
    static COLLATOR: Option<Collator> = {
        let mut options = CollatorOptions::new();
        options.numeric = Some(Numeric::On);
        Collator::try_new(&Default::default(), options).ok()
    };
}

/// Parse a raw value as a number.
///
/// Surrounding whitespace is ignored. Textual forms such as "inf" or "NaN" are not
/// numbers here, so the numeric branch never sees a NaN.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Compare two raw values
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => natural_cmp(a, b),
    }
}

/// Natural string ordering.
///
/// The collator decides first (numeric, accent and case aware). Strings it considers
/// equal fall through to a deterministic tiebreak, so only identical strings compare
/// `Equal`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let collated = COLLATOR.with(|c| c.as_ref().map_or(Ordering::Equal, |c| c.compare(a, b)));
    collated.then_with(|| digit_aware_cmp(a, b))
}

/// Case-folded comparison with digit runs by magnitude. Ties go to fewer leading
/// zeros, then lowercase before uppercase, then code point.
fn digit_aware_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    let mut tiebreak = Ordering::Equal;

    loop {
        let (x, y) = match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return tiebreak,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => (x, y),
        };

        if x.is_ascii_digit() && y.is_ascii_digit() {
            let l = take_digits(&mut left);
            let r = take_digits(&mut right);
            let (l_sig, r_sig) = (l.trim_start_matches('0'), r.trim_start_matches('0'));

            let ord = l_sig.len().cmp(&r_sig.len()).then_with(|| l_sig.cmp(r_sig));
            if ord != Ordering::Equal {
                return ord;
            }
            if tiebreak == Ordering::Equal {
                tiebreak = l.len().cmp(&r.len());
            }
            continue;
        }

        left.next();
        right.next();

        let ord = fold(x).cmp(&fold(y));
        if ord != Ordering::Equal {
            return ord;
        }
        if tiebreak == Ordering::Equal {
            tiebreak = (x.is_uppercase(), x).cmp(&(y.is_uppercase(), y));
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

#[inline]
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("30"), Some(30.0));
        assert_eq!(parse_number(" -1.5 "), Some(-1.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-Infinity"), None);
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        assert_eq!(compare_values("9", "30"), Ordering::Less);
        assert_eq!(compare_values("30", "9"), Ordering::Greater);
        assert_eq!(compare_values("-2", "1"), Ordering::Less);
        assert_eq!(compare_values("1.0", "1"), Ordering::Equal);
    }

    #[test]
    fn test_empty_falls_back_to_natural() {
        // "" is not numeric, so the pair compares as strings
        assert_eq!(compare_values("", "5"), Ordering::Less);
        assert_eq!(compare_values("5", ""), Ordering::Greater);
    }

    #[test]
    fn test_natural_digit_runs() {
        assert_eq!(natural_cmp("item9", "item10"), Ordering::Less);
        assert_eq!(natural_cmp("item10", "item9"), Ordering::Greater);
        assert_eq!(natural_cmp("a2b10", "a2b9"), Ordering::Greater);
        assert_eq!(natural_cmp("file", "file1"), Ordering::Less);
    }

    #[test]
    fn test_natural_case_insensitive_first() {
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(natural_cmp("Apple", "banana"), Ordering::Less);
        // equal ignoring case: lowercase first
        assert_eq!(natural_cmp("a", "A"), Ordering::Less);
        assert_eq!(natural_cmp("A", "a"), Ordering::Greater);
    }

    #[test]
    fn test_natural_leading_zeros_tiebreak() {
        assert_eq!(natural_cmp("x1", "x01"), Ordering::Less);
        assert_eq!(natural_cmp("x01", "x1"), Ordering::Greater);
        assert_eq!(natural_cmp("x01", "x2"), Ordering::Less);
    }

    #[test]
    fn test_natural_accents_sort_with_base_letter() {
        assert_eq!(natural_cmp("Émile", "Zoe"), Ordering::Less);
        assert_eq!(natural_cmp("Ana", "Émile"), Ordering::Less);
        assert_eq!(natural_cmp("résumé", "resume"), Ordering::Greater);
        assert_eq!(natural_cmp("Ängel", "Angel"), Ordering::Greater);

        let mut names = vec!["Zoe", "Émile", "Ana", "émile"];
        names.sort_by(|a, b| compare_values(a, b));
        assert_eq!(names, vec!["Ana", "émile", "Émile", "Zoe"]);
    }

    #[test]
    fn test_natural_punctuation_before_letters() {
        assert_eq!(natural_cmp("~tilde", "apple"), Ordering::Less);
        assert_eq!(natural_cmp("{brace}", "zebra"), Ordering::Less);
    }

    #[test]
    fn test_digit_aware_tiebreak() {
        assert_eq!(digit_aware_cmp("x1", "x01"), Ordering::Less);
        assert_eq!(digit_aware_cmp("a", "A"), Ordering::Less);
        assert_eq!(digit_aware_cmp("item9", "item10"), Ordering::Less);
    }

    #[test]
    fn test_reflexive() {
        for v in ["", "0", "abc", "Item 10", "3.14", "ÄÖü", "007"] {
            assert_eq!(compare_values(v, v), Ordering::Equal);
            assert_eq!(natural_cmp(v, v), Ordering::Equal);
        }
    }

    #[test]
    fn test_antisymmetric() {
        let values = ["a", "A", "b", "10", "9", "item2", "item10", "", "x01", "x1"];
        for a in values {
            for b in values {
                assert_eq!(compare_values(a, b), compare_values(b, a).reverse(), "{} vs {}", a, b);
            }
        }
    }
}
