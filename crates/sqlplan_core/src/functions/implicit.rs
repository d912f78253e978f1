use crate::arrays::datatype::DataType;

/// Score that should be used if no cast is needed.
pub const NO_CAST_SCORE: u32 = 400;

/// Return the score for casting from `have` to `want`.
///
/// Returns None if there's no valid implicit cast.
///
/// A higher score indicates a more preferred cast.
pub const fn implicit_cast_score(have: DataType, want: DataType) -> Option<u32> {
    if have.const_eq(want) {
        return Some(NO_CAST_SCORE);
    }

    match have {
        DataType::Null => Some(target_score(want)),
        DataType::Int16 => match want {
            DataType::Int32 | DataType::Int64 => Some(target_score(want)),
            _ => None,
        },
        DataType::Int32 => match want {
            DataType::Int64 => Some(target_score(want)),
            _ => None,
        },
        _ => None,
    }
}

/// Get the score of the target type we can cast to.
///
/// More "specific" types will have a higher target score.
const fn target_score(target: DataType) -> u32 {
    match target {
        DataType::Int64 => 131,
        DataType::Int32 => 191,
        DataType::Int16 => 211,
        DataType::Boolean => 231,
        DataType::Utf8 => 111,
        DataType::Null => 1,
    }
}

/// Find the common type both `a` and `b` can be implicitly cast to.
///
/// Returns None if no such type exists.
pub fn common_supertype(a: DataType, b: DataType) -> Option<DataType> {
    if a == b {
        return Some(a);
    }
    if a == DataType::Null {
        return Some(b);
    }
    if b == DataType::Null {
        return Some(a);
    }

    if implicit_cast_score(a, b).is_some() {
        return Some(b);
    }
    if implicit_cast_score(b, a).is_some() {
        return Some(a);
    }

    None
}
