//! Configuration for the complete build.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional JSON file named by `BUILDFLOW_CONFIG`, and per-command environment
//! overrides.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "BUILDFLOW_CONFIG";
/// Environment variable overriding the working directory.
pub const ROOT_ENV: &str = "BUILDFLOW_ROOT";
/// Environment variable overriding the dependency generator command.
pub const GENDEPS_ENV: &str = "BUILDFLOW_GENDEPS";
/// Environment variable overriding the checker command.
pub const CHECK_ENV: &str = "BUILDFLOW_CHECK";
/// Environment variable overriding the builder command.
pub const BUILD_ENV: &str = "BUILDFLOW_BUILD";

/// A program plus the arguments that precede the stage arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program to execute.
    pub program: String,
    /// Leading arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command with no leading arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Sets the leading arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Parses a command line such as `python3 build/check.py`.
    ///
    /// Words split on whitespace. Single quotes keep their contents literally;
    /// double quotes keep whitespace and honour `\"`, `\\`, `\$` and `` \` ``;
    /// outside quotes a backslash escapes the next character. `stage` only
    /// labels the error.
    pub fn parse(stage: &str, line: &str) -> Result<Self, ConfigError> {
        let words = split_words(line).map_err(|quote| ConfigError::UnterminatedQuote {
            stage: stage.to_string(),
            quote,
        })?;
        let mut words = words.into_iter();
        let program = words.next().ok_or_else(|| ConfigError::EmptyCommand {
            stage: stage.to_string(),
        })?;
        Ok(Self::new(program).with_args(words))
    }

    fn script(path: &str) -> Self {
        Self::new("python3").with_args([path])
    }
}

/// Splits a command line into words. On an unclosed quote, returns the quote
/// character.
fn split_words(line: &str) -> Result<Vec<String>, char> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some('\''), '\'') | (Some('"'), '"') => quote = None,
            (Some('"'), '\\') => match chars.next() {
                Some(next @ ('"' | '\\' | '$' | '`')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => return Err('"'),
            },
            (Some(_), _) => current.push(ch),
            (None, '\'' | '"') => {
                quote = Some(ch);
                in_word = true;
            }
            (None, '\\') => {
                current.push(chars.next().unwrap_or('\\'));
                in_word = true;
            }
            (None, _) if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, _) => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if let Some(open) = quote {
        return Err(open);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Which programs implement the three build collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Working directory for every stage.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Dependency generator.
    #[serde(default = "default_gendeps")]
    pub gendeps: CommandSpec,
    /// Static checker.
    #[serde(default = "default_check")]
    pub check: CommandSpec,
    /// Builder.
    #[serde(default = "default_build")]
    pub build: CommandSpec,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_gendeps() -> CommandSpec {
    CommandSpec::script("build/gendeps.py")
}

fn default_check() -> CommandSpec {
    CommandSpec::script("build/check.py")
}

fn default_build() -> CommandSpec {
    CommandSpec::script("build/build.py")
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            gendeps: default_gendeps(),
            check: default_check(),
            build: default_build(),
        }
    }
}

impl BuildConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Sets the dependency generator command.
    #[must_use]
    pub fn with_gendeps(mut self, command: CommandSpec) -> Self {
        self.gendeps = command;
        self
    }

    /// Sets the checker command.
    #[must_use]
    pub fn with_check(mut self, command: CommandSpec) -> Self {
        self.check = command;
        self
    }

    /// Sets the builder command.
    #[must_use]
    pub fn with_build(mut self, command: CommandSpec) -> Self {
        self.build = command;
        self
    }

    /// Reads a configuration file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` in place of the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };

        if let Some(root) = lookup(ROOT_ENV) {
            // Blank values are kept so validate() rejects them.
            config.root = PathBuf::from(root);
        }
        for (key, stage, slot) in [
            (GENDEPS_ENV, "gendeps", &mut config.gendeps),
            (CHECK_ENV, "check", &mut config.check),
            (BUILD_ENV, "build", &mut config.build),
        ] {
            if let Some(line) = lookup(key) {
                *slot = CommandSpec::parse(stage, &line)?;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the working directory is set and every command names a
    /// program.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.to_string_lossy().trim().is_empty() {
            return Err(ConfigError::EmptyRoot);
        }
        for (stage, command) in [
            ("gendeps", &self.gendeps),
            ("check", &self.check),
            ("build", &self.build),
        ] {
            if command.program.trim().is_empty() {
                return Err(ConfigError::EmptyCommand {
                    stage: stage.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.gendeps.program, "python3");
        assert_eq!(config.gendeps.args, vec!["build/gendeps.py"]);
        assert_eq!(config.check.args, vec!["build/check.py"]);
        assert_eq!(config.build.args, vec!["build/build.py"]);
    }

    #[test]
    fn test_parse_command_line() {
        assert_eq!(
            CommandSpec::parse("check", "  node tools/check.js --strict ").unwrap(),
            CommandSpec::new("node").with_args(["tools/check.js", "--strict"])
        );
        assert!(matches!(
            CommandSpec::parse("check", "   "),
            Err(ConfigError::EmptyCommand { .. })
        ));
    }

    #[test]
    fn test_parse_keeps_quoted_words_together() {
        assert_eq!(
            CommandSpec::parse("build", r#""/opt/My Tools/py" 'build/build file.py' --tag "" x\ y"#)
                .unwrap(),
            CommandSpec::new("/opt/My Tools/py").with_args(["build/build file.py", "--tag", "", "x y"])
        );
        assert_eq!(
            CommandSpec::parse("build", r#"sh -c "echo \"done\" \$HOME" 'a\b'"#).unwrap(),
            CommandSpec::new("sh").with_args(["-c", r#"echo "done" $HOME"#, r"a\b"])
        );
        assert_eq!(
            CommandSpec::parse("build", "gen--out=\"a b\"").unwrap(),
            CommandSpec::new("gen--out=a b")
        );
    }

    #[test]
    fn test_parse_rejects_unterminated_quote() {
        let err = CommandSpec::parse("gendeps", "python3 'build/gendeps.py").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnterminatedQuote { ref stage, quote: '\'' } if stage == "gendeps"
        ));

        let err = BuildConfig::from_lookup(lookup_from(&[(CHECK_ENV, r#"make "lint"#)])).unwrap_err();
        assert!(matches!(err, ConfigError::UnterminatedQuote { quote: '"', .. }));
    }

    #[test]
    fn test_quoted_env_override() {
        let config = BuildConfig::from_lookup(lookup_from(&[(
            GENDEPS_ENV,
            r#"python3 "/home/dev/My Project/build/gendeps.py""#,
        )]))
        .unwrap();
        assert_eq!(config.gendeps.args, vec!["/home/dev/My Project/build/gendeps.py"]);
    }

    #[test]
    fn test_blank_root_is_rejected() {
        for root in ["", "  "] {
            let err = BuildConfig::from_lookup(lookup_from(&[(ROOT_ENV, root)])).unwrap_err();
            assert!(matches!(err, ConfigError::EmptyRoot));
        }
        assert!(matches!(
            BuildConfig::new().with_root("").validate(),
            Err(ConfigError::EmptyRoot)
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = BuildConfig::from_lookup(lookup_from(&[
            (ROOT_ENV, "/src/player"),
            (CHECK_ENV, "make lint"),
        ]))
        .unwrap();

        assert_eq!(config.root, PathBuf::from("/src/player"));
        assert_eq!(config.check, CommandSpec::new("make").with_args(["lint"]));
        assert_eq!(config.gendeps, default_gendeps());
    }

    #[test]
    fn test_empty_env_command_is_rejected() {
        let err = BuildConfig::from_lookup(lookup_from(&[(BUILD_ENV, " ")])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCommand { ref stage } if stage == "build"));
    }

    #[test]
    fn test_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildflow.json");
        std::fs::write(
            &path,
            r#"{"root": "/work", "gendeps": {"program": "gen"}, "build": {"program": "cc", "args": ["-O2"]}}"#,
        )
        .unwrap();

        let path_str = path.to_string_lossy().to_string();
        let config = BuildConfig::from_lookup(lookup_from(&[
            (CONFIG_ENV, path_str.as_str()),
            (GENDEPS_ENV, "gen2 --all"),
        ]))
        .unwrap();

        assert_eq!(config.root, PathBuf::from("/work"));
        assert_eq!(config.gendeps, CommandSpec::new("gen2").with_args(["--all"]));
        assert_eq!(config.check, default_check());
        assert_eq!(config.build, CommandSpec::new("cc").with_args(["-O2"]));
    }

    #[test]
    fn test_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            BuildConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            BuildConfig::from_file(dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_blank_program() {
        let config = BuildConfig::new().with_check(CommandSpec::new(""));
        assert!(config.validate().is_err());
    }
}
