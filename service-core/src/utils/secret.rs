use subtle::ConstantTimeEq;

/// Compare two secrets without leaking the position of the first mismatch.
///
/// Length is not hidden: a different length returns false immediately.
pub fn constant_time_eq(supplied: &str, expected: &str) -> bool {
    let supplied_bytes = supplied.as_bytes();
    let expected_bytes = expected.as_bytes();

    if supplied_bytes.len() != expected_bytes.len() {
        return false;
    }

    supplied_bytes.ct_eq(expected_bytes).into()
}
