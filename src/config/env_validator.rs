//! Environment variable validation
//!
//! Invalid `ITERAST_*` values never abort startup: they produce a warning
//! (with a typo suggestion when one is close) and the previous value stays.

use std::io::Write;

/// Validator for one environment variable
pub struct EnvVarValidator<'a> {
    var_name: &'a str,
    valid_values: &'a [&'a str],
}

impl<'a> EnvVarValidator<'a> {
    pub fn new(var_name: &'a str, valid_values: &'a [&'a str]) -> Self {
        Self {
            var_name,
            valid_values,
        }
    }

    /// Parse `value`, warning on stderr and returning `fallback` if invalid
    pub fn parse<T>(&self, value: &str, parser: impl Fn(&str) -> Option<T>, fallback: T) -> T {
        self.parse_with_writer(value, parser, fallback, &mut std::io::stderr())
    }

    /// Parse with a custom writer for the warning
    pub fn parse_with_writer<T>(
        &self,
        value: &str,
        parser: impl Fn(&str) -> Option<T>,
        fallback: T,
        writer: &mut impl Write,
    ) -> T {
        if let Some(parsed) = parser(value) {
            return parsed;
        }

        let hint = closest(&value.to_lowercase(), self.valid_values)
            .map(|s| format!(". Did you mean '{s}'?"))
            .unwrap_or_default();
        let _ = writeln!(
            writer,
            "Warning: Invalid {} value '{value}'{hint}",
            self.var_name
        );
        let _ = writeln!(writer, "Valid values: {}", self.valid_values.join(", "));
        fallback
    }
}

/// The candidate within two edits of `input`, if any (exact matches excluded)
pub(crate) fn closest<'c>(input: &str, candidates: &[&'c str]) -> Option<&'c str> {
    candidates
        .iter()
        .map(|&candidate| (candidate, levenshtein(input, candidate)))
        .filter(|&(_, dist)| dist > 0 && dist <= 2)
        .min_by_key(|&(_, dist)| dist)
        .map(|(candidate, _)| candidate)
}

/// Edit distance between two strings, by characters
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }

    row[b.len()]
}
