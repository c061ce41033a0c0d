/// Reduce a DNA string to its lookup key.
///
/// Accepts rendered signatures (`C2 S1 H0 D0 E0`), prefixed report strings
/// (`DNA: T2 R1 P3 S1`) and already-normalized keys (`C2|S1|H0`). Tokens that
/// do not look like `<letter>...<digit>` are dropped; the first `key_len`
/// survivors (at least one) are joined with `|`.
pub fn normalize_dna_key(dna: &str, key_len: usize) -> String {
    let mut s = dna.trim();
    if s.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("dna:")) {
        s = s[4..].trim();
    }
    s.split(|c: char| c.is_whitespace() || c == ',' || c == '|')
        .filter(|t| is_token(t))
        .take(key_len.max(1))
        .collect::<Vec<_>>()
        .join("|")
}

fn is_token(t: &str) -> bool {
    let first = t.chars().next();
    let last = t.chars().last();
    t.chars().count() >= 2
        && first.is_some_and(char::is_alphabetic)
        && last.is_some_and(|c| c.is_ascii_digit())
}
