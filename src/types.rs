use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

/// Which GitLab API shape supplies pipeline timestamps.
///
/// - `Detailed`: the pipeline listing carries no `updated_at`, so one detail
///   request is made per listed pipeline (default).
/// - `Listed`: the listing already carries `updated_at`; no detail requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApiVariant {
    Detailed,
    Listed,
}

impl Default for ApiVariant {
    fn default() -> Self {
        ApiVariant::Detailed
    }
}

impl FromStr for ApiVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detailed" => Ok(ApiVariant::Detailed),
            "listed" => Ok(ApiVariant::Listed),
            other => Err(format!(
                "invalid api_variant: {other} (expected \"detailed\" or \"listed\")"
            )),
        }
    }
}

/// How the access token is presented to GitLab.
///
/// `Private` is the default for explicit tokens; a token read from
/// `$CI_JOB_TOKEN` switches the default to `Job`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// `PRIVATE-TOKEN` header (personal, project or group access tokens).
    Private,
    /// `JOB-TOKEN` header (`$CI_JOB_TOKEN`).
    Job,
}

impl Default for TokenKind {
    fn default() -> Self {
        TokenKind::Private
    }
}

impl TokenKind {
    /// Header name, lowercased as `http` header names must be.
    pub fn header_name(self) -> &'static str {
        match self {
            TokenKind::Private => "private-token",
            TokenKind::Job => "job-token",
        }
    }
}

/// Parse a human duration such as `500ms`, `30s`, `1m30s` or `1h`.
///
/// The string is a sequence of `<digits><unit>` segments with units `ms`,
/// `s`, `m` or `h`. Segments are summed.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let mut total = Duration::ZERO;
    let mut rest = s;

    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;
        if digits_end == 0 {
            return Err(format!("duration '{s}' has a unit without a number"));
        }

        let (num_part, after_num) = rest.split_at(digits_end);
        let value: u64 = num_part
            .parse()
            .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;

        let unit_end = after_num
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(after_num.len());
        let (unit, tail) = after_num.split_at(unit_end);

        let too_large = || format!("duration '{s}' is too large");
        let segment = match unit.to_lowercase().as_str() {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(too_large)?),
            "h" => Duration::from_secs(value.checked_mul(60 * 60).ok_or_else(too_large)?),
            other => {
                return Err(format!(
                    "unsupported duration unit '{other}'; expected ms, s, m, or h"
                ));
            }
        };

        total = total.checked_add(segment).ok_or_else(too_large)?;
        rest = tail;
    }

    Ok(total)
}
