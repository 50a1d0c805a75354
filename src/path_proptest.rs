//! Property-based tests for path decomposition.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{decompose, LogicalPath, SEPARATOR};
    use proptest::prelude::*;

    proptest! {
        /// Property: decomposition never yields empty or separator-bearing segments
        #[test]
        fn segments_are_non_empty(input in "[a-z/.]{0,40}") {
            for segment in decompose(&input) {
                prop_assert!(!segment.is_empty());
                prop_assert!(!segment.contains(SEPARATOR));
            }
        }

        /// Property: segments rejoined match the input with empty components removed
        #[test]
        fn segments_rejoin_to_normalized_path(input in "[a-z/]{0,40}") {
            let expected: Vec<&str> = input.split('/').filter(|s| !s.is_empty()).collect();
            prop_assert_eq!(decompose(&input).join("/"), expected.join("/"));
        }

        /// Property: every remainder is a suffix of the original path
        #[test]
        fn remainder_is_suffix(input in "[a-z0-9+()/.]{0,40}") {
            let path = LogicalPath::new(&input);
            for segment in path.segments() {
                let remainder = path.remainder_after(&segment);
                prop_assert!(input.ends_with(remainder.as_str()));
            }
        }

        /// Property: the remainder decomposes into exactly the later segments
        #[test]
        fn remainder_holds_later_segments(
            parts in proptest::collection::vec("[a-z.+*?]{1,6}", 1..6),
            seps in proptest::collection::vec("/{1,3}", 6),
        ) {
            let mut input = String::new();
            for (part, sep) in parts.iter().zip(seps.iter()) {
                input.push_str(sep);
                input.push_str(part);
            }
            let path = LogicalPath::new(&input);
            for (i, segment) in path.segments().enumerate() {
                let later: Vec<&str> = parts[i + 1..].iter().map(String::as_str).collect();
                prop_assert_eq!(decompose(path.remainder_after(&segment).as_str()), later);
            }
        }

        /// Property: decomposition is deterministic
        #[test]
        fn decompose_is_deterministic(input in ".*") {
            prop_assert_eq!(decompose(&input), decompose(&input));
        }
    }
}
