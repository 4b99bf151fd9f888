use crate::error::{Result, UpdateError};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^v?",
        r"(?:(\d+)!)?",
        r"(\d+(?:\.\d+)*)",
        r"(?:[-_.]?(alpha|a|beta|b|preview|pre|rc|c)[-_.]?(\d+)?)?",
        r"(?:-(\d+)|[-_.]?(post|rev|r)[-_.]?(\d+)?)?",
        r"(?:[-_.]?(dev)[-_.]?(\d+)?)?",
        r"(?:\+([a-z0-9]+(?:[-_.][a-z0-9]+)*))?$",
    ))
    .unwrap()
});

/// Pre-release phase, declared in ascending order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreRelease {
    Alpha,
    Beta,
    ReleaseCandidate,
}

impl PreRelease {
    fn from_keyword(keyword: &str) -> Self {
        match keyword.to_lowercase().as_str() {
            "a" | "alpha" => PreRelease::Alpha,
            "b" | "beta" => PreRelease::Beta,
            _ => PreRelease::ReleaseCandidate,
        }
    }
}

/// A dotted release version such as `2.10.0`, `1.0.0-rc1`, `3.1.post2` or `1!2.0+build`.
///
/// Ordering: epoch, then numeric segments left to right with missing segments treated as
/// zero (`1.0` == `1.0.0`), then the qualifiers. A release sorts above its pre-releases and
/// below its post-releases; a dev release sorts below the same version without `.dev`, and a
/// bare dev release (`1.0.dev1`) below every pre-release of that version. The `+local`
/// suffix is accepted and ignored.
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    pub epoch: u64,
    pub segments: Vec<u64>,
    pub pre: Option<(PreRelease, u64)>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub local: Option<String>,
    raw: String,
}

impl ReleaseVersion {
    pub fn new(version_str: &str) -> Result<Self> {
        let invalid = || UpdateError::InvalidVersion(version_str.to_string());
        let caps = VERSION_REGEX.captures(version_str.trim()).ok_or_else(invalid)?;
        let number = |caps: &Captures, group: usize| -> Result<Option<u64>> {
            caps.get(group)
                .map(|m| m.as_str().parse::<u64>())
                .transpose()
                .map_err(|_| invalid())
        };

        let epoch = number(&caps, 1)?.unwrap_or(0);
        let segments = caps
            .get(2)
            .ok_or_else(invalid)?
            .as_str()
            .split('.')
            .map(|segment| segment.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        let pre = match caps.get(3) {
            Some(keyword) => Some((
                PreRelease::from_keyword(keyword.as_str()),
                number(&caps, 4)?.unwrap_or(0),
            )),
            None => None,
        };
        let post = match (number(&caps, 5)?, caps.get(6)) {
            (Some(implicit), _) => Some(implicit),
            (None, Some(_)) => Some(number(&caps, 7)?.unwrap_or(0)),
            (None, None) => None,
        };
        let dev = match caps.get(8) {
            Some(_) => Some(number(&caps, 9)?.unwrap_or(0)),
            None => None,
        };
        let local = caps.get(10).map(|m| m.as_str().to_string());

        Ok(ReleaseVersion {
            epoch,
            segments,
            pre,
            post,
            dev,
            local,
            raw: version_str.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }

    /// `(0, _)` for a bare dev release, `(1..=3, n)` for a pre-release, `(4, 0)` otherwise.
    fn pre_key(&self) -> (u8, u64) {
        match self.pre {
            Some((phase, n)) => (phase as u8 + 1, n),
            None if self.post.is_none() && self.dev.is_some() => (0, 0),
            None => (4, 0),
        }
    }

    /// A missing dev number sorts above any present one.
    fn dev_key(&self) -> (bool, u64) {
        (self.dev.is_none(), self.dev.unwrap_or(0))
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for ReleaseVersion {}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| {
                (0..len)
                    .map(|i| self.segment(i).cmp(&other.segment(i)))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
            .then(self.pre_key().cmp(&other.pre_key()))
            .then(self.post.cmp(&other.post))
            .then(self.dev_key().cmp(&other.dev_key()))
    }
}

impl FromStr for ReleaseVersion {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Strips a single leading literal `v` from a release tag, e.g. `v1.3.0` -> `1.3.0`.
pub fn strip_tag_prefix(tag_name: &str) -> &str {
    tag_name.strip_prefix('v').unwrap_or(tag_name)
}
