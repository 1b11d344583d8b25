use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_derive::Deserialize;
use thiserror::Error;

use crate::paths;

/// Name of the optional tool configuration file, looked up in the build root.
pub const CONFIG_FILE_NAME: &str = "munge.json";

/// File in the mod tools root that remembers the GameData directory.
pub const GAMEDATA_FILE_NAME: &str = ".swbf2";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid platform {0}")]
    InvalidPlatform(String),
    #[error("Invalid language {0}")]
    InvalidLanguage(String),
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Pc,
    Ps2,
    Xbox,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Pc => "PC",
            Platform::Ps2 => "PS2",
            Platform::Xbox => "XBOX",
        }
    }

    /// Prefix of the platform specific compilers, e.g. `pc_TextureMunge`.
    pub fn tool_prefix(self) -> String {
        format!("{}_", self.as_str().to_lowercase())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PC" => Ok(Platform::Pc),
            "PS2" => Ok(Platform::Ps2),
            "XBOX" => Ok(Platform::Xbox),
            _ => Err(ConfigError::InvalidPlatform(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    English,
    French,
    German,
    Italian,
    Japanese,
    Spanish,
    Uk,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "ENGLISH",
            Language::French => "FRENCH",
            Language::German => "GERMAN",
            Language::Italian => "ITALIAN",
            Language::Japanese => "JAPANESE",
            Language::Spanish => "SPANISH",
            Language::Uk => "UK",
        }
    }

    /// Directory suffix used for localized override folders.
    pub fn dir_name(self) -> &'static str {
        match self {
            Language::English => "ENG",
            Language::Uk => "UK_",
            other => other.as_str(),
        }
    }

    pub fn version(self) -> &'static str {
        match self {
            Language::English => "",
            Language::Uk => "UK_",
            other => other.as_str(),
        }
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ENGLISH" => Ok(Language::English),
            "FRENCH" => Ok(Language::French),
            "GERMAN" => Ok(Language::German),
            "ITALIAN" => Ok(Language::Italian),
            "JAPANESE" => Ok(Language::Japanese),
            "SPANISH" => Ok(Language::Spanish),
            "UK" => Ok(Language::Uk),
            _ => Err(ConfigError::InvalidLanguage(s.to_string())),
        }
    }
}

/// How the Windows compilers are launched.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Shim {
    Wine,
    Native,
}

impl Default for Shim {
    fn default() -> Self {
        if cfg!(windows) { Shim::Native } else { Shim::Wine }
    }
}

/// Optional overrides read from `munge.json`.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ToolConfig {
    #[serde(default)]
    pub tools_dir: Option<PathBuf>,
    #[serde(default)]
    pub wine_prefix: Option<PathBuf>,
    #[serde(default)]
    pub gamedata_dir: Option<PathBuf>,
    #[serde(default)]
    pub shim: Option<Shim>,
}

/// Reads the tool configuration. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ToolConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Everything a munge run needs to know about its environment.
///
/// All relative paths handed to the compilers are relative to `build_root`,
/// which is also the working directory of every spawned compiler.
#[derive(Clone, Debug)]
pub struct Settings {
    pub platform: Platform,
    pub lang_version: String,
    /// `MUNGED/<PLATFORM>`, relative to each category directory.
    pub munge_dir: PathBuf,
    /// `_LVL_<PLATFORM>`, relative to the data root.
    pub output_dir: PathBuf,
    pub munge_args: String,
    pub override_path: Option<PathBuf>,
    pub wine_prefix: Option<PathBuf>,
    pub shim: Shim,
    pub build_root: PathBuf,
    /// Data folder holding the asset sources, relative to the build root.
    pub data_dir: PathBuf,
    pub tools_dir: PathBuf,
}

impl Settings {
    pub fn new(platform: &str, language: Option<&str>) -> Result<Self, ConfigError> {
        let platform: Platform = platform.parse()?;
        let language = language.map(str::parse::<Language>).transpose()?;

        let lang_version = match language {
            Some(lang) => lang.version().to_string(),
            None => "ENGLISH".to_string(),
        };

        let override_path = match language {
            Some(lang) if lang != Language::English => {
                Some(PathBuf::from(format!("{}_{}", platform, lang.dir_name())))
            }
            _ => None,
        };

        Ok(Settings {
            platform,
            lang_version,
            munge_dir: PathBuf::from(format!("MUNGED/{}", platform)),
            output_dir: PathBuf::from(format!("_LVL_{}", platform)),
            munge_args: format!("-checkdate -continue -platform {}", platform),
            override_path,
            wine_prefix: None,
            shim: Shim::default(),
            build_root: PathBuf::from("."),
            data_dir: PathBuf::from(".."),
            tools_dir: PathBuf::from("../../ToolsFL/bin"),
        })
    }

    pub fn with_build_root(mut self, build_root: impl Into<PathBuf>) -> Self {
        self.build_root = build_root.into();
        self
    }

    pub fn with_config(mut self, config: &ToolConfig) -> Self {
        if let Some(tools_dir) = &config.tools_dir {
            self.tools_dir = tools_dir.clone();
        }
        if let Some(prefix) = &config.wine_prefix {
            self.wine_prefix = Some(prefix.clone());
        }
        if let Some(shim) = config.shim {
            self.shim = shim;
        }
        self
    }

    /// Command line prefix wins over the config file.
    pub fn with_wine_prefix(mut self, prefix: Option<PathBuf>) -> Self {
        if prefix.is_some() {
            self.wine_prefix = prefix;
        }
        self
    }

    /// Location on disk of a path given relative to the build root.
    pub fn fs_path(&self, path: &Path) -> PathBuf {
        self.build_root.join(path)
    }

    /// Case-corrects a build-relative path against what exists on disk.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        paths::resolve_case(&self.build_root, path)
    }

    /// Source directory of a category, e.g. `../Sides/rep`.
    pub fn source_path(&self, subdir: &Path) -> PathBuf {
        self.resolve(&self.data_dir.join(subdir))
    }

    /// Scratch directory of a category, e.g. `Sides/rep/MUNGED/PC`.
    pub fn category_munge_path(&self, subdir: &Path) -> PathBuf {
        self.resolve(&subdir.join(&self.munge_dir))
    }

    /// Shared level output directory, e.g. `../_LVL_PC`.
    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join(&self.output_dir)
    }

    pub fn operator_log_name(&self) -> String {
        format!("{}_MungeLog.txt", self.platform)
    }

    pub fn operator_log_path(&self) -> PathBuf {
        self.build_root.join(self.operator_log_name())
    }

    /// `.swbf2` sits in the mod tools root, two levels above `_BUILD`.
    pub fn gamedata_file_path(&self) -> PathBuf {
        self.build_root.join("../..").join(GAMEDATA_FILE_NAME)
    }

    /// Addon folder name derived from the data folder, `data_ABC` -> `ABC`.
    pub fn world_id(&self) -> Option<String> {
        paths::world_id(&self.fs_path(&self.data_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pc_platform_derives_paths_and_args() {
        let settings = Settings::new("PC", None).unwrap();
        assert_eq!(settings.munge_dir, PathBuf::from("MUNGED/PC"));
        assert_eq!(settings.output_dir, PathBuf::from("_LVL_PC"));
        assert!(settings.munge_args.contains("-platform PC"));
        assert!(settings.munge_args.starts_with("-checkdate -continue"));
        assert_eq!(settings.output_path(), PathBuf::from("../_LVL_PC"));
    }

    #[test]
    fn platform_is_case_insensitive() {
        let settings = Settings::new("ps2", None).unwrap();
        assert_eq!(settings.platform, Platform::Ps2);
        assert_eq!(settings.munge_dir, PathBuf::from("MUNGED/PS2"));
        assert_eq!(settings.platform.tool_prefix(), "ps2_");
    }

    #[test]
    fn invalid_platform_and_language_are_rejected() {
        assert!(matches!(
            Settings::new("GAMECUBE", None),
            Err(ConfigError::InvalidPlatform(p)) if p == "GAMECUBE"
        ));
        assert!(matches!(
            Settings::new("PC", Some("KLINGON")),
            Err(ConfigError::InvalidLanguage(_))
        ));
    }

    #[test]
    fn language_sets_override_path() {
        let english = Settings::new("PC", Some("english")).unwrap();
        assert_eq!(english.lang_version, "");
        assert!(english.override_path.is_none());

        let uk = Settings::new("XBOX", Some("uk")).unwrap();
        assert_eq!(uk.lang_version, "UK_");
        assert_eq!(uk.override_path, Some(PathBuf::from("XBOX_UK_")));

        let spanish = Settings::new("PC", Some("Spanish")).unwrap();
        assert_eq!(spanish.override_path, Some(PathBuf::from("PC_SPANISH")));

        let default = Settings::new("PC", None).unwrap();
        assert_eq!(default.lang_version, "ENGLISH");
        assert!(default.override_path.is_none());
    }

    #[test]
    fn config_overrides_tools_and_shim() {
        let config: ToolConfig = serde_json::from_str(
            r#"{
                "tools_dir": "/opt/modtools/bin",
                "shim": "native",
                "wine_prefix": "/home/me/.wine"
            }"#,
        )
        .unwrap();
        let settings = Settings::new("PC", None)
            .unwrap()
            .with_config(&config)
            .with_wine_prefix(Some(PathBuf::from("/tmp/prefix")));
        assert_eq!(settings.tools_dir, PathBuf::from("/opt/modtools/bin"));
        assert_eq!(settings.shim, Shim::Native);
        assert_eq!(settings.wine_prefix, Some(PathBuf::from("/tmp/prefix")));
    }

    #[test]
    fn missing_config_file_is_default() {
        let config = read_config(Path::new("/nonexistent/xmunge/munge.json")).unwrap();
        assert!(config.tools_dir.is_none());
        assert!(config.shim.is_none());
    }
}
