use crate::error::CliError;
use std::collections::HashMap;
use std::path::Path;

/// Environment snapshot the configuration is resolved from: process
/// variables merged with an optional `.env` file (file entries win).
#[derive(Debug, Clone)]
pub struct EnvMap {
    vars: HashMap<String, String>,
}

impl EnvMap {
    pub fn from_process() -> Self {
        EnvMap {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        EnvMap { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Loads `KEY=VALUE` lines from an env file when it exists.
    pub fn load_dotenv(&mut self, path: &Path) -> Result<(), CliError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(CliError::Config(format!(
                    "Failed to read env file {}: {err}",
                    path.display()
                )));
            }
        };
        self.parse_env_content(&content)
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(eq_pos) = line.find('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = line[..eq_pos].trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            let value = Self::unquote_value(line[eq_pos + 1..].trim());
            self.vars.insert(key.to_string(), value);
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let quoted = (value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\''));
        if quoted && value.len() >= 2 {
            value[1..value.len() - 1].to_string()
        } else {
            value.to_string()
        }
    }
}
