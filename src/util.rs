//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// `round(num / den * 100)` with half-up rounding, in integer arithmetic.
/// Returns 0 when `den` is 0.
pub fn round_percent(num: u32, den: u32) -> u32 {
  if den == 0 { return 0; }
  let (num, den) = (num as u64, den as u64);
  ((200 * num + den) / (2 * den)) as u32
}

/// `ceil(num / den)` for non-negative integers.
pub fn div_ceil(num: u32, den: u32) -> u32 {
  if den == 0 { 0 } else { (num + den - 1) / den }
}

/// Part of an email address before the `@` (the whole string if there is none).
pub fn email_local_part(email: &str) -> &str {
  email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn percent_rounds_half_up() {
    assert_eq!(round_percent(10, 100), 10);
    assert_eq!(round_percent(1, 8), 13); // 12.5
    assert_eq!(round_percent(1, 3), 33);
    assert_eq!(round_percent(2, 3), 67);
    assert_eq!(round_percent(40, 40), 100);
    assert_eq!(round_percent(5, 0), 0);
  }

  #[test]
  fn template_and_email_helpers() {
    assert_eq!(fill_template("{a}+{b}={a}", &[("a", "1"), ("b", "2")]), "1+2=1");
    assert_eq!(email_local_part("asha@school.in"), "asha");
    assert_eq!(email_local_part("nobody"), "nobody");
    assert_eq!(div_ceil(25, 1), 25);
    assert_eq!(div_ceil(251, 10), 26);
  }
}
