use crate::error::{CcError, Result};
use crate::io;
use crate::paths;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid regex"))
}

pub fn validate_key(key: &str) -> Result<()> {
    if key_re().is_match(key) {
        Ok(())
    } else {
        Err(CcError::InvalidVaultKey(key.to_string()))
    }
}

/// Flat `KEY=VALUE` store in `<home>/.env`, readable by the owner only.
///
/// Listing exposes keys only; values leave the vault solely through
/// [`Vault::export_missing_to_env`]. Clones share one write lock.
#[derive(Debug, Clone)]
pub struct Vault {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl Vault {
    pub fn new(home: &Path) -> Self {
        Self::at(paths::vault_path(home))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries. A missing file is an empty vault.
    pub fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        Ok(parse(&std::fs::read_to_string(&self.path)?))
    }

    /// Sorted key names.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }

    /// Insert or replace entries and return the resulting keys. Every key is
    /// validated before anything is written.
    pub fn upsert<I, K, V>(&self, entries: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let incoming: Vec<(String, String)> = entries
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_string(), v.into()))
            .collect();
        for (key, _) in &incoming {
            validate_key(key)?;
        }
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.load()?;
        for (key, value) in incoming {
            map.insert(key, value);
        }
        io::atomic_write_private(&self.path, serialize(&map).as_bytes())?;
        tracing::info!(keys = map.len(), "vault updated");
        Ok(map.into_keys().collect())
    }

    /// Set every vault entry that is not already present in the process
    /// environment. Returns the number of variables set.
    pub fn export_missing_to_env(&self) -> Result<usize> {
        let mut exported = 0;
        for (key, value) in self.load()? {
            if std::env::var_os(&key).is_none() {
                std::env::set_var(&key, value);
                exported += 1;
            }
        }
        Ok(exported)
    }
}

// ---------------------------------------------------------------------------
// Env-file format
// ---------------------------------------------------------------------------

/// Parse env-file text. Blank lines, `#` comments and lines without `=` are
/// skipped; the first `=` separates key from value; later keys win.
pub fn parse(content: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), parse_value(raw.trim()));
    }
    map
}

fn parse_value(raw: &str) -> String {
    let Some(body) = raw.strip_prefix('"') else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return out,
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            c => out.push(c),
        }
    }
    // Unterminated quote: keep the text as written.
    raw.to_string()
}

/// Serialize entries sorted by key, quoting values that would not survive a
/// bare round trip.
pub fn serialize(map: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in map {
        out.push_str(key);
        out.push('=');
        if needs_quotes(value) {
            out.push('"');
            for c in value.chars() {
                match c {
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    c => out.push(c),
                }
            }
            out.push('"');
        } else {
            out.push_str(value);
        }
        out.push('\n');
    }
    out
}

fn needs_quotes(value: &str) -> bool {
    value.contains(['\n', '\r', '\t', '"', '\\', '#'])
        || value.trim() != value
}
