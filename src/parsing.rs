use nom::{
    bytes::complete::take_while1,
    character::complete::{i32, i64, space0, space1, u32, u64},
    combinator::eof,
    number::complete::double,
    sequence::{preceded, terminated},
    IResult,
};

pub(crate) fn double_entry(line: &str) -> IResult<&str, f64> {
    preceded(space1, double)(line)
}

pub(crate) fn u64_entry(line: &str) -> IResult<&str, u64> {
    preceded(space1, u64)(line)
}

pub(crate) fn i32_entry(line: &str) -> IResult<&str, i32> {
    preceded(space1, i32)(line)
}

pub(crate) fn i64_entry(line: &str) -> IResult<&str, i64> {
    preceded(space1, i64)(line)
}

/// First entry of a line, possibly indented
pub(crate) fn first_u32(line: &str) -> IResult<&str, u32> {
    preceded(space0, u32)(line)
}

/// First entry of a line as a floating-point number, possibly indented
pub(crate) fn first_double(line: &str) -> IResult<&str, f64> {
    preceded(space0, double)(line)
}

/// Trailing whitespace up to the end of the line
pub(crate) fn line_end(line: &str) -> IResult<&str, &str> {
    terminated(space0, eof)(line)
}

pub(crate) fn non_space(line: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_ascii_whitespace())(line)
}

/// Human-readable description of a parsing failure
pub(crate) fn describe(err: nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Incomplete(_) => "incomplete input".to_owned(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let rest = non_space(e.input.trim_start())
                .map(|(_, token)| token)
                .unwrap_or("end of line");
            format!("unexpected {rest:?} ({:?})", e.code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries() {
        let (rest, run) = first_u32("   12  3 -0.5E-01").unwrap();
        assert_eq!(run, 12);
        let (rest, ev) = u64_entry(rest).unwrap();
        assert_eq!(ev, 3);
        let (rest, x) = double_entry(rest).unwrap();
        assert_eq!(x, -0.05);
        assert!(line_end(rest).is_ok());
        assert!(line_end(" x").is_err());
    }

    #[test]
    fn describe_error() {
        let err = double_entry(" abc 1").unwrap_err();
        assert!(describe(err).contains("\"abc\""));
    }
}
