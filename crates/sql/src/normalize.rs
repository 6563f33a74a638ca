use once_cell::sync::Lazy;
use regex::Regex;

static SUFFIXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)_(\d+)$").unwrap());

/// Undoes the engine's `_N` renaming of duplicate output columns.
///
/// Scanning left to right, `<base>_<digits>` becomes `<base>` when an earlier
/// column already produced `<base>`; every other name is kept.
pub fn normalize_column_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let base = SUFFIXED
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|base| out.iter().any(|seen| seen == base));
        out.push(base.unwrap_or(name).to_string());
    }
    out
}
