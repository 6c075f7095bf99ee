/*!
 * Symbolic path tokens.
 *
 * Configuration values may start with a token such as `?user` or `?data`
 * which is expanded to a concrete directory when the value is used:
 *
 * - `?user`: per-user configuration directory
 * - `?data`: shared application data
 * - `?local`: per-user cache directory
 * - `?temp`: system temporary directory
 */

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::InitError;

/// Directory name used under the platform directories
const APP_DIRNAME: &str = "submacro";

/// Expands `?token` prefixes into directories
#[derive(Debug, Clone)]
pub struct PathResolver {
    tokens: BTreeMap<String, PathBuf>,
}

impl PathResolver {
    /// Resolve tokens from the platform directories.
    ///
    /// `user_override` replaces `?user`, and `?local` then lives under it, so a
    /// run pointed at a scratch directory never touches the real profile.
    pub fn new(user_override: Option<&Path>) -> Result<Self, InitError> {
        let mut resolver = Self { tokens: BTreeMap::new() };

        let (user, local) = match user_override {
            Some(dir) => (dir.to_path_buf(), dir.join("cache")),
            None => {
                let user = dirs::config_dir()
                    .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
                    .ok_or(InitError::NoUserDirectory)?
                    .join(APP_DIRNAME);
                let local = dirs::cache_dir()
                    .map(|d| d.join(APP_DIRNAME))
                    .unwrap_or_else(|| user.join("cache"));
                (user, local)
            }
        };

        let data = dirs::data_dir()
            .map(|d| d.join(APP_DIRNAME))
            .unwrap_or_else(|| user.clone());

        resolver.set_token("?user", user);
        resolver.set_token("?local", local);
        resolver.set_token("?data", data);
        resolver.set_token("?temp", std::env::temp_dir());
        Ok(resolver)
    }

    /// Set or replace a token
    pub fn set_token(&mut self, token: &str, path: PathBuf) {
        self.tokens.insert(token.to_string(), path);
    }

    /// Directory a token stands for
    pub fn token(&self, token: &str) -> Option<&Path> {
        self.tokens.get(token).map(PathBuf::as_path)
    }

    /// Expand a leading token. Values without a known token are returned as-is.
    pub fn decode(&self, value: &str) -> PathBuf {
        if value.starts_with('?') {
            let split = value.find(['/', '\\']).unwrap_or(value.len());
            let (token, rest) = value.split_at(split);
            if let Some(base) = self.tokens.get(token) {
                let rest = rest.trim_start_matches(['/', '\\']);
                return if rest.is_empty() { base.clone() } else { base.join(rest) };
            }
        }
        PathBuf::from(value)
    }
}
