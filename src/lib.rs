pub mod clean;
pub mod deploy;
pub mod diff;
pub mod gamedata;
pub mod logger;
pub mod mungers;
pub mod paths;
pub mod selection;
pub mod settings;
pub mod tools;

pub use gamedata::{ConsolePrompt, GameDataResolver, Prompt};
pub use logger::OperatorLogger;
pub use mungers::{MungeError, Munger, plan, run_all};
pub use selection::{CategoryFlags, Selection, Targets};
pub use settings::{ConfigError, Language, Platform, Settings, ToolConfig, read_config};
pub use tools::{MungeContext, RunReport, ShimRunner, StepOutcome, ToolCommand, ToolRunner};
