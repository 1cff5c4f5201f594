use rand::{seq::SliceRandom, Rng};

/// Used when the configured pool is empty.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

/// Pick a user agent from the pool. We pretend to be a normal browser so
/// search engines don't block us.
pub fn choose<'a, R: Rng + ?Sized>(pool: &'a [String], rng: &mut R) -> &'a str {
    pool.choose(rng)
        .map(String::as_str)
        .unwrap_or(DEFAULT_USER_AGENT)
}
