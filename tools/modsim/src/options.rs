pub const USAGE: &str = "\
usage: modsim [options]

Load and unload the crypto module against the hosted kernel primitives.

options:
  --fail-init             library init reports failure
  --fail-selftest <code>  self-test returns <code> (negative)
  --fail-integrity        FIPS validation fails
  --in-core-mismatch      FIPS in-core integrity hash mismatch
  --no-fips               build without FIPS validation
  -v, --verbose           log at debug level
  -h, --help              show this help";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Integrity {
    #[default]
    Pass,
    Fail,
    InCoreMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub fail_init: bool,
    pub fail_selftest: Option<i32>,
    pub integrity: Integrity,
    pub fips: bool,
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fail_init: false,
            fail_selftest: None,
            integrity: Integrity::Pass,
            fips: true,
            verbose: false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseOutcome {
    Run(Options),
    Help,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(String);

pub fn parse(args: impl IntoIterator<Item = String>) -> Result<ParseOutcome, ParseError> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fail-init" => options.fail_init = true,
            "--fail-selftest" => {
                let value = args
                    .next()
                    .ok_or_else(|| ParseError("--fail-selftest needs a code".into()))?;
                let code: i32 = value
                    .parse()
                    .map_err(|_| ParseError(format!("invalid self-test code `{value}`")))?;
                if code >= 0 {
                    return Err(ParseError(format!(
                        "self-test code must be negative, got {code}"
                    )));
                }
                options.fail_selftest = Some(code);
            }
            "--fail-integrity" => options.integrity = Integrity::Fail,
            "--in-core-mismatch" => options.integrity = Integrity::InCoreMismatch,
            "--no-fips" => options.fips = false,
            "-v" | "--verbose" => options.verbose = true,
            "-h" | "--help" => return Ok(ParseOutcome::Help),
            other => return Err(ParseError(format!("unknown option `{other}`"))),
        }
    }

    Ok(ParseOutcome::Run(options))
}
