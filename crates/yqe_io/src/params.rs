use anyhow::{Context, Result, bail};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::is_not,
    character::complete::{char, multispace1},
    combinator::{all_consuming, opt, value},
    multi::many0,
    number::complete::double,
    sequence::{pair, preceded, terminated},
};
use std::fs;
use std::path::Path;

fn comment(input: &str) -> IResult<&str, ()> {
    value((), pair(char('#'), opt(is_not("\r\n"))))(input)
}

/// Whitespace, commas and comments between two numbers.
fn filler(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((value((), multispace1), value((), char(',')), comment))),
    )(input)
}

fn values(input: &str) -> IResult<&str, Vec<f64>> {
    preceded(filler, many0(terminated(double, filler)))(input)
}

/// Parses a parameter list.
pub fn parse_params(input: &str) -> Result<Vec<f64>> {
    match all_consuming(values)(input) {
        Ok((_, parsed)) => Ok(parsed),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
            let offset = input.len() - e.input.len();
            let line = input[..offset].matches('\n').count() + 1;
            let snippet: String = e.input.chars().take(16).collect();
            bail!("invalid parameter at line {line}: {snippet:?}")
        }
        Err(nom::Err::Incomplete(_)) => bail!("truncated parameter list"),
    }
}

/// Loads a parameter file.
pub fn load_params_file<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open parameter file {}", path.display()))?;
    let params = parse_params(&text).with_context(|| format!("In {}", path.display()))?;
    log::debug!("loaded {} parameters from {}", params.len(), path.display());
    Ok(params)
}

/// Parameter stream of a randomized benchmarking run, in read order.
pub fn rb_params(seed: u32, num_circuit: u32, lengths: &[u32]) -> Vec<f64> {
    let mut params = Vec::with_capacity(3 + lengths.len());
    params.push(f64::from(seed));
    params.push(lengths.len() as f64);
    params.push(f64::from(num_circuit));
    params.extend(lengths.iter().map(|&l| f64::from(l)));
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_separators_and_comments() {
        let text = "# t2 ramsey\n0.5, 2000 # delay_max\n\t100,, 1e3\n";
        assert_eq!(parse_params(text).unwrap(), [0.5, 2000.0, 100.0, 1000.0]);
    }

    #[test]
    fn empty_and_comment_only() {
        assert!(parse_params("").unwrap().is_empty());
        assert!(parse_params("  # nothing\n# here").unwrap().is_empty());
    }

    #[test]
    fn negative_values() {
        assert_eq!(parse_params("-3 -0.25").unwrap(), [-3.0, -0.25]);
    }

    #[test]
    fn reports_line_of_bad_token() {
        let err = parse_params("1 2\n3 abc\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn rb_stream_layout() {
        assert_eq!(rb_params(42, 2, &[3, 9]), [42.0, 2.0, 2.0, 3.0, 9.0]);
    }
}
