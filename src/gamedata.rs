use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

/// Environment variable that can point at the GameData folder.
pub const GAMEDATA_ENV: &str = "SWBF2_GAMEDATA";

const PROMPT: &str = "Enter the path to your SWBF2 GameData folder: ";

#[derive(Debug, Error)]
pub enum GameDataError {
    #[error("No GameData folder was entered")]
    NoInput,
    #[error("Failed to read from the console: {0}")]
    Console(#[source] io::Error),
    #[error("Failed to save the GameData path to {path:?}: {source}")]
    Persist { path: PathBuf, source: io::Error },
}

/// Where answers to the GameData question come from.
pub trait Prompt {
    /// Asks `question`. `None` means no more input will come.
    fn ask(&mut self, question: &str) -> io::Result<Option<String>>;

    fn tell(&mut self, message: &str);
}

/// Reads answers from standard input.
pub struct ConsolePrompt;

impl Prompt for ConsolePrompt {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        print!("{}", question);
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn tell(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Finds the GameData folder, trying in order an explicit path (flag or
/// config), the environment, the persisted `.swbf2` file and finally the
/// prompt. A prompted answer is written back to the `.swbf2` file.
pub struct GameDataResolver<P: Prompt> {
    explicit: Option<PathBuf>,
    from_env: Option<PathBuf>,
    persisted_file: PathBuf,
    prompt: P,
}

impl<P: Prompt> GameDataResolver<P> {
    pub fn new(persisted_file: impl Into<PathBuf>, prompt: P) -> Self {
        GameDataResolver {
            explicit: None,
            from_env: None,
            persisted_file: persisted_file.into(),
            prompt,
        }
    }

    pub fn explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    pub fn from_env(mut self, path: Option<PathBuf>) -> Self {
        self.from_env = path;
        self
    }

    pub fn resolve(&mut self) -> Result<PathBuf, GameDataError> {
        for (source, candidate) in [("argument", &self.explicit), (GAMEDATA_ENV, &self.from_env)] {
            if let Some(path) = candidate {
                if path.is_dir() {
                    return Ok(path.clone());
                }
                warn!("GameData path {} from {} does not exist", path.display(), source);
            }
        }

        if let Some(path) = read_persisted(&self.persisted_file) {
            if path.is_dir() {
                return Ok(path);
            }
            warn!(
                "GameData path {} saved in {} does not exist",
                path.display(),
                self.persisted_file.display()
            );
        }

        let path = self.ask_until_valid()?;
        fs::write(&self.persisted_file, path.to_string_lossy().as_bytes()).map_err(|source| {
            GameDataError::Persist {
                path: self.persisted_file.clone(),
                source,
            }
        })?;
        self.prompt.tell(&format!(
            "Saved {} to the file {}",
            path.display(),
            self.persisted_file.display()
        ));
        info!("GameData path saved to {}", self.persisted_file.display());

        Ok(path)
    }

    fn ask_until_valid(&mut self) -> Result<PathBuf, GameDataError> {
        loop {
            let answer = self
                .prompt
                .ask(PROMPT)
                .map_err(GameDataError::Console)?
                .ok_or(GameDataError::NoInput)?;

            let path = PathBuf::from(answer.trim());
            let path = fs::canonicalize(&path).unwrap_or(path);
            if !answer.trim().is_empty() && path.is_dir() {
                return Ok(path);
            }
            self.prompt
                .tell(&format!("The path {} does not exist.", path.display()));
        }
    }
}

fn read_persisted(file: &Path) -> Option<PathBuf> {
    let content = fs::read_to_string(file).ok()?;
    let line = content.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(PathBuf::from(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct ScriptedPrompt {
        answers: VecDeque<String>,
        asked: usize,
        told: Vec<String>,
    }

    impl ScriptedPrompt {
        fn new(answers: &[&str]) -> Self {
            ScriptedPrompt {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                asked: 0,
                told: Vec::new(),
            }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn ask(&mut self, _question: &str) -> io::Result<Option<String>> {
            self.asked += 1;
            Ok(self.answers.pop_front())
        }

        fn tell(&mut self, message: &str) {
            self.told.push(message.to_string());
        }
    }

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "xmunge_gamedata_{}_{}_{}",
            label,
            std::process::id(),
            nanos
        ));
        let _ = fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn persisted_path_skips_prompt() {
        let root = temp_dir("persisted");
        let gamedata = root.join("GameData");
        fs::create_dir_all(&gamedata).unwrap();
        let file = root.join(".swbf2");
        fs::write(&file, format!("{}\n", gamedata.display())).unwrap();

        let mut resolver = GameDataResolver::new(&file, ScriptedPrompt::new(&[]));
        assert_eq!(resolver.resolve().unwrap(), gamedata);
        assert_eq!(resolver.prompt.asked, 0);
    }

    #[test]
    fn prompt_loops_until_existing_path_and_persists() {
        let root = temp_dir("prompt");
        let gamedata = root.join("GameData");
        fs::create_dir_all(&gamedata).unwrap();
        let file = root.join(".swbf2");
        let missing = root.join("nope");

        let prompt = ScriptedPrompt::new(&[
            missing.to_str().unwrap(),
            "",
            gamedata.to_str().unwrap(),
        ]);
        let mut resolver = GameDataResolver::new(&file, prompt);
        let resolved = resolver.resolve().unwrap();

        assert_eq!(resolved, fs::canonicalize(&gamedata).unwrap());
        assert_eq!(resolver.prompt.asked, 3);
        assert!(resolver.prompt.told[0].contains("does not exist"));
        assert_eq!(fs::read_to_string(&file).unwrap(), resolved.to_string_lossy());
    }

    #[test]
    fn stale_persisted_path_reprompts() {
        let root = temp_dir("stale");
        let gamedata = root.join("GameData");
        fs::create_dir_all(&gamedata).unwrap();
        let file = root.join(".swbf2");
        fs::write(&file, root.join("moved").to_string_lossy().as_bytes()).unwrap();

        let mut resolver =
            GameDataResolver::new(&file, ScriptedPrompt::new(&[gamedata.to_str().unwrap()]));
        resolver.resolve().unwrap();
        assert_eq!(resolver.prompt.asked, 1);
    }

    #[test]
    fn explicit_and_env_paths_win() {
        let root = temp_dir("explicit");
        let gamedata = root.join("GameData");
        fs::create_dir_all(&gamedata).unwrap();

        let mut resolver = GameDataResolver::new(root.join(".swbf2"), ScriptedPrompt::new(&[]))
            .explicit(Some(root.join("missing")))
            .from_env(Some(gamedata.clone()));
        assert_eq!(resolver.resolve().unwrap(), gamedata);
        assert!(!root.join(".swbf2").exists());
    }

    #[test]
    fn end_of_input_is_an_error() {
        let root = temp_dir("eof");
        let mut resolver = GameDataResolver::new(root.join(".swbf2"), ScriptedPrompt::new(&[]));
        assert!(matches!(resolver.resolve(), Err(GameDataError::NoInput)));
    }
}
