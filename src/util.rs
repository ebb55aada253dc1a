use std::iter::repeat;
use std::path::{Path, PathBuf};

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

/// Rounds to two decimal places, half away from zero.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(feature = "validation-regex")]
lazy_static::lazy_static! {
    static ref EMAIL: Option<regex::Regex> =
        regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok();
}

#[cfg(feature = "validation-regex")]
pub fn is_valid_email(email: &str) -> bool {
    (*EMAIL).as_ref().is_some_and(|re| re.is_match(email))
}

#[cfg(not(feature = "validation-regex"))]
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@')
}
