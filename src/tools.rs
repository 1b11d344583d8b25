use std::cell::{Ref, RefCell};
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use log::{debug, error, info, warn};
use regex::Regex;

use crate::paths;
use crate::settings::{Settings, Shim};

/// Log file written by the level packer.
pub const LEVEL_PACK_LOG: &str = "LevelPack.log";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Bin,
    Config,
    Font,
    Localize,
    Model,
    Odf,
    PathPlanning,
    Script,
    Shader,
    Sprite,
    Terrain,
    Texture,
    World,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Bin => "Bin",
            Category::Config => "Config",
            Category::Font => "Font",
            Category::Localize => "Localize",
            Category::Model => "Model",
            Category::Odf => "Odf",
            Category::PathPlanning => "PathPlanning",
            Category::Script => "Script",
            Category::Shader => "Shader",
            Category::Sprite => "Sprite",
            Category::Terrain => "Terrain",
            Category::Texture => "Texture",
            Category::World => "World",
        }
    }

    /// Model, Shader and Texture compilers exist once per platform.
    pub fn is_platform_specific(self) -> bool {
        matches!(self, Category::Model | Category::Shader | Category::Texture)
    }

    /// Executable name, e.g. `pc_TextureMunge` or `OdfMunge`.
    pub fn program(self, settings: &Settings) -> String {
        if self.is_platform_specific() {
            format!("{}{}Munge", settings.platform.tool_prefix(), self.name())
        } else {
            format!("{}Munge", self.name())
        }
    }
}

/// A single external compiler invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        ToolCommand {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn arg_line(&self) -> String {
        self.args.join(" ")
    }

    /// Index of `flag` in the argument list.
    pub fn position(&self, flag: &str) -> Option<usize> {
        self.args.iter().position(|a| a == flag)
    }

    /// Arguments following `flag` up to the next `-flag`.
    pub fn values_of(&self, flag: &str) -> Vec<&str> {
        match self.position(flag) {
            Some(idx) => self.args[idx + 1..]
                .iter()
                .take_while(|a| !a.starts_with('-'))
                .map(String::as_str)
                .collect(),
            None => Vec::new(),
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.program, self.arg_line())
    }
}

/// Runs external compilers. Returns the exit code of the process.
pub trait ToolRunner {
    fn execute(&self, command: &ToolCommand) -> io::Result<i32>;
}

/// Launches the Windows compilers, through wine where needed, appending their
/// standard error to the operator log.
pub struct ShimRunner {
    shim: Shim,
    tools_dir: PathBuf,
    wine_prefix: Option<PathBuf>,
    working_dir: PathBuf,
    stderr_log: PathBuf,
}

impl ShimRunner {
    pub fn from_settings(settings: &Settings) -> Self {
        let tools_dir = settings.fs_path(&settings.tools_dir);
        let tools_dir = std::fs::canonicalize(&tools_dir).unwrap_or(tools_dir);

        ShimRunner {
            shim: settings.shim,
            tools_dir,
            wine_prefix: settings.wine_prefix.clone(),
            working_dir: settings.build_root.clone(),
            stderr_log: settings.operator_log_path(),
        }
    }
}

impl ToolRunner for ShimRunner {
    fn execute(&self, command: &ToolCommand) -> io::Result<i32> {
        let stderr = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.stderr_log)?;

        let mut process = match self.shim {
            Shim::Wine => {
                let mut process = Command::new("wine");
                process.arg(&command.program).env("WINEPATH", &self.tools_dir);
                if let Some(prefix) = &self.wine_prefix {
                    process.env("WINEPREFIX", prefix);
                }
                process
            }
            Shim::Native => Command::new(self.tools_dir.join(&command.program)),
        };

        let status = process
            .args(&command.args)
            .current_dir(&self.working_dir)
            .stderr(Stdio::from(stderr))
            .status()?;

        // Killed by a signal
        Ok(status.code().unwrap_or(-1))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    Failed { code: i32 },
    NotStarted { reason: String },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

#[derive(Clone, Debug)]
pub struct StepFailure {
    pub program: String,
    pub args: String,
    pub outcome: StepOutcome,
}

/// Outcome tally of every external step of a run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub steps: usize,
    pub failures: Vec<StepFailure>,
}

impl RunReport {
    fn record(&mut self, command: &ToolCommand, outcome: &StepOutcome) {
        self.steps += 1;
        if !outcome.is_success() {
            self.failures.push(StepFailure {
                program: command.program.clone(),
                args: command.arg_line(),
                outcome: outcome.clone(),
            });
        }
    }
}

/// Settings plus the process runner, shared by every munger of a run.
pub struct MungeContext<'a> {
    pub settings: &'a Settings,
    runner: &'a dyn ToolRunner,
    report: RefCell<RunReport>,
}

impl<'a> MungeContext<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn ToolRunner) -> Self {
        MungeContext {
            settings,
            runner,
            report: RefCell::new(RunReport::default()),
        }
    }

    pub fn report(&self) -> Ref<'_, RunReport> {
        self.report.borrow()
    }

    pub fn into_report(self) -> RunReport {
        self.report.into_inner()
    }

    /// Runs `command`, logging but never propagating a failure, then scrapes
    /// `log_name` from the build root.
    pub fn run_step(&self, command: &ToolCommand, log_name: &str, label: &str) -> StepOutcome {
        debug!("{}", command);

        let outcome = match self.runner.execute(command) {
            Ok(0) => StepOutcome::Succeeded,
            Ok(code) => {
                error!(
                    "{} failed with args \"{}\"; Status {}.",
                    command.program,
                    command.arg_line(),
                    code
                );
                StepOutcome::Failed { code }
            }
            Err(e) => {
                error!(
                    "{} could not be started with args \"{}\": {}",
                    command.program,
                    command.arg_line(),
                    e
                );
                StepOutcome::NotStarted {
                    reason: e.to_string(),
                }
            }
        };

        self.report.borrow_mut().record(command, &outcome);
        self.forward_tool_log(log_name, label);

        outcome
    }

    fn forward_tool_log(&self, log_name: &str, label: &str) {
        match read_tool_log(&self.settings.build_root.join(log_name), label) {
            ToolLog::Clean => {}
            ToolLog::Report(report) => info!("{}", report),
            ToolLog::Missing => warn!("Log file {} not found, continuing...", log_name),
            ToolLog::Unreadable(e) => {
                warn!("Log file {} could not be read ({}), continuing...", log_name, e)
            }
        }
    }
}

/// What a compiler left in its log file after a step.
#[derive(Debug)]
pub enum ToolLog {
    Missing,
    Unreadable(io::Error),
    /// Zero errors and zero warnings, nothing worth showing.
    Clean,
    /// Log contents prefixed with `[<label>]`, to go to the operator log.
    Report(String),
}

pub fn read_tool_log(path: &Path, label: &str) -> ToolLog {
    match std::fs::read_to_string(path) {
        Ok(contents) if is_clean_log(&contents) => ToolLog::Clean,
        Ok(contents) => ToolLog::Report(format!("[{}]\n{}", label, contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => ToolLog::Missing,
        Err(e) => ToolLog::Unreadable(e),
    }
}

fn zero_count_patterns() -> Option<&'static (Regex, Regex)> {
    static PATTERNS: OnceLock<Option<(Regex, Regex)>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            let errors = Regex::new(r"0\s+Errors").ok()?;
            let warnings = Regex::new(r"0\s+Warnings").ok()?;
            Some((errors, warnings))
        })
        .as_ref()
}

/// True when the tool log reports zero errors and zero warnings.
pub fn is_clean_log(contents: &str) -> bool {
    match zero_count_patterns() {
        Some((errors, warnings)) => errors.is_match(contents) && warnings.is_match(contents),
        None => false,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MungeOptions {
    pub hash_strings: bool,
    pub debug: bool,
}

impl MungeOptions {
    pub fn hashed() -> Self {
        MungeOptions {
            hash_strings: true,
            debug: false,
        }
    }
}

fn push_source_dirs(command: &mut ToolCommand, settings: &Settings, source_dir: &Path) {
    command.arg("-sourcedir").arg(paths::arg(source_dir));
    if let Some(override_path) = &settings.override_path {
        let localized = source_dir.join(override_path);
        if settings.fs_path(&localized).is_dir() {
            command.arg(paths::arg(&localized));
        }
    }
}

pub fn munge_command(
    settings: &Settings,
    category: Category,
    inputs: &[&str],
    source_dir: &Path,
    output_dir: &Path,
    options: MungeOptions,
) -> ToolCommand {
    let mut command = ToolCommand::new(category.program(settings));
    command.arg("-inputfile").args(inputs.iter().copied());
    push_source_dirs(&mut command, settings, source_dir);
    command
        .arg("-outputdir")
        .arg(paths::arg(output_dir))
        .args(settings.munge_args.split_whitespace());

    if category == Category::Shader {
        let include = source_dir.join("shaders").join(settings.platform.as_str());
        command.arg("-I").arg(format!("{}/", paths::arg(&include)));
    }
    if options.hash_strings {
        command.arg("-hashstrings");
    }
    if options.debug {
        command.arg("-debug");
    }

    command
}

/// Compiles `inputs` of one category from `source_dir` into `output_dir`.
pub fn munge(
    ctx: &MungeContext,
    category: Category,
    inputs: &[&str],
    source_dir: &Path,
    output_dir: &Path,
    options: MungeOptions,
) -> StepOutcome {
    let command = munge_command(ctx.settings, category, inputs, source_dir, output_dir, options);
    let log_name = format!("{}.log", command.program);
    ctx.run_step(&command, &log_name, &inputs.join(" "))
}

/// Extra knobs of the world chunk compiler.
#[derive(Clone, Debug, Default)]
pub struct WorldChunk<'c> {
    pub output_file: Option<&'c str>,
    pub chunk_id: Option<&'c str>,
    pub ext: Option<&'c str>,
    pub hash_strings: bool,
}

pub fn world_munge_command(
    settings: &Settings,
    inputs: &[&str],
    source_dir: &Path,
    output_dir: &Path,
    chunk: &WorldChunk,
) -> ToolCommand {
    let mut command = ToolCommand::new(Category::Config.program(settings));
    command.arg("-inputfile").args(inputs.iter().copied());
    push_source_dirs(&mut command, settings, source_dir);
    command
        .arg("-outputdir")
        .arg(paths::arg(output_dir))
        .args(settings.munge_args.split_whitespace());

    if let Some(output_file) = chunk.output_file {
        command.arg("-outputfile").arg(output_file);
    }
    if let Some(chunk_id) = chunk.chunk_id {
        command.arg("-chunkid").arg(chunk_id);
    }
    if let Some(ext) = chunk.ext {
        command.arg("-ext").arg(ext);
    }
    if chunk.hash_strings {
        command.arg("-hashstrings");
    }

    command
}

/// Packs world specific chunks (sky, props, lights, ...) with the config compiler.
pub fn world_munge(
    ctx: &MungeContext,
    inputs: &[&str],
    source_dir: &Path,
    output_dir: &Path,
    chunk: WorldChunk,
) -> StepOutcome {
    let command = world_munge_command(ctx.settings, inputs, source_dir, output_dir, &chunk);
    let log_name = format!("{}.log", command.program);
    ctx.run_step(&command, &log_name, &inputs.join(" "))
}

pub fn movie_munge_command(
    settings: &Settings,
    movie_list: &Path,
    output_dir: &Path,
) -> ToolCommand {
    let stem = movie_list
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("movies");

    let mut command = ToolCommand::new("MovieMunge");
    command
        .arg("-input")
        .arg(paths::arg(movie_list))
        .arg("-output")
        .arg(paths::arg(&output_dir.join(format!("{}.mvs", stem))))
        .args(settings.munge_args.split_whitespace());
    command
}

/// Builds one `.mvs` movie archive from a `.mlst` movie list.
pub fn movie_munge(ctx: &MungeContext, movie_list: &Path, output_dir: &Path) -> StepOutcome {
    let command = movie_munge_command(ctx.settings, movie_list, output_dir);
    ctx.run_step(&command, "MovieMunge.log", &paths::arg(movie_list))
}

/// One level packer invocation.
#[derive(Clone, Debug)]
pub struct LevelPack {
    pub inputs: Vec<String>,
    pub source_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub input_dirs: Vec<PathBuf>,
    pub common: Vec<String>,
    pub write_files: Vec<String>,
    pub relative_write: bool,
    pub debug: bool,
}

impl LevelPack {
    pub fn new(inputs: &[&str], source_dir: impl Into<PathBuf>) -> Self {
        LevelPack {
            inputs: inputs.iter().map(|i| i.to_string()).collect(),
            source_dir: source_dir.into(),
            output_dir: None,
            input_dirs: Vec::new(),
            common: Vec::new(),
            write_files: Vec::new(),
            relative_write: false,
            debug: false,
        }
    }

    pub fn output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dirs.push(dir.into());
        self
    }

    pub fn input_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.input_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn common<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.common.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn write<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.write_files.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn relative_write(mut self) -> Self {
        self.relative_write = true;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn source_subdir(&self) -> String {
        self.source_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `core` -> `Common/MUNGED/PC/core.files`; already rooted names are kept.
    pub fn common_reference(&self, settings: &Settings, name: &str) -> String {
        let file = format!("{}.files", name);
        if is_rooted_reference(&file) {
            file
        } else {
            self.munged_reference(settings, &file)
        }
    }

    pub fn write_reference(&self, settings: &Settings, name: &str) -> String {
        let file = format!("{}.files", name);
        if self.relative_write {
            file
        } else {
            self.munged_reference(settings, &file)
        }
    }

    fn munged_reference(&self, settings: &Settings, file: &str) -> String {
        format!(
            "{}/{}/{}",
            self.source_subdir(),
            paths::arg(&settings.munge_dir),
            file
        )
    }

    pub fn command(&self, settings: &Settings) -> ToolCommand {
        let mut command = ToolCommand::new("LevelPack");
        command
            .arg("-inputfile")
            .args(self.inputs.iter().cloned())
            .arg("-inputdir")
            .args(self.input_dirs.iter().map(|d| paths::arg(d)));
        push_source_dirs(&mut command, settings, &self.source_dir);
        command.args(settings.munge_args.split_whitespace());

        if !self.common.is_empty() {
            command.arg("-common");
            for name in &self.common {
                command.arg(self.common_reference(settings, name));
            }
        }

        if !self.write_files.is_empty() {
            command.arg("-writefiles");
            for name in &self.write_files {
                command.arg(self.write_reference(settings, name));
            }
        }

        match &self.output_dir {
            Some(dir) => command.arg("-outputdir").arg(paths::arg(dir)),
            None => command.arg("-onlyfiles"),
        };

        if self.debug {
            command.arg("-debug");
        }

        command
    }
}

// Names under the Common/Worlds trees or explicitly relative skip the munge dir prefix.
fn is_rooted_reference(file: &str) -> bool {
    if file.starts_with('.') {
        return true;
    }
    ["Common", "Worlds"].iter().any(|root| {
        file.len() > root.len()
            && file.is_char_boundary(root.len())
            && file[..root.len()].eq_ignore_ascii_case(root)
            && matches!(file.as_bytes()[root.len()], b'/' | b'\\')
    })
}

/// Runs the level packer. Failures are logged and recorded, never returned.
pub fn level_pack(ctx: &MungeContext, pack: &LevelPack) -> StepOutcome {
    let command = pack.command(ctx.settings);
    ctx.run_step(&command, LEVEL_PACK_LOG, &pack.inputs.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingRunner {
        exit_code: i32,
        commands: RefCell<Vec<ToolCommand>>,
    }

    impl ToolRunner for RecordingRunner {
        fn execute(&self, command: &ToolCommand) -> io::Result<i32> {
            self.commands.borrow_mut().push(command.clone());
            Ok(self.exit_code)
        }
    }

    fn settings() -> Settings {
        Settings::new("PC", None)
            .unwrap()
            .with_build_root(std::env::temp_dir().join("xmunge_tools_no_such_build_root"))
    }

    #[test]
    fn platform_prefix_only_for_model_shader_texture() {
        let settings = settings();
        assert_eq!(Category::Texture.program(&settings), "pc_TextureMunge");
        assert_eq!(Category::Model.program(&settings), "pc_ModelMunge");
        assert_eq!(Category::Shader.program(&settings), "pc_ShaderMunge");
        assert_eq!(Category::Odf.program(&settings), "OdfMunge");
        assert_eq!(Category::PathPlanning.program(&settings), "PathPlanningMunge");
    }

    #[test]
    fn munge_command_layout() {
        let settings = settings();
        let command = munge_command(
            &settings,
            Category::Config,
            &["*.snd", "*.mus"],
            Path::new("../Common/Sound"),
            Path::new("Common/MUNGED/PC"),
            MungeOptions::hashed(),
        );
        assert_eq!(
            command.to_string(),
            "ConfigMunge -inputfile *.snd *.mus -sourcedir ../Common/Sound \
             -outputdir Common/MUNGED/PC -checkdate -continue -platform PC -hashstrings"
        );
    }

    #[test]
    fn shader_gets_include_dir() {
        let settings = settings();
        let command = munge_command(
            &settings,
            Category::Shader,
            &["shaders/*.xml"],
            Path::new("../Common"),
            Path::new("Common/MUNGED/PC"),
            MungeOptions { hash_strings: false, debug: true },
        );
        assert_eq!(command.values_of("-I"), vec!["../Common/shaders/PC/"]);
        assert_eq!(command.args.last().map(String::as_str), Some("-debug"));
    }

    #[test]
    fn common_reference_is_rooted_in_source_munge_dir() {
        let settings = settings();
        let pack = LevelPack::new(&["common.req"], "../Common").common(["core", "common"]);
        let command = pack.command(&settings);
        assert_eq!(
            command.values_of("-common"),
            vec!["Common/MUNGED/PC/core.files", "Common/MUNGED/PC/common.files"]
        );
        assert!(command.position("-onlyfiles").is_some());
    }

    #[test]
    fn rooted_common_reference_passes_through() {
        let settings = settings();
        let pack = LevelPack::new(&["*.req"], "../Worlds/abc/world1")
            .output("../_LVL_PC/ABC")
            .common(["Common/MUNGED/PC/core", "Worlds/abc/MUNGED/PC/MZ", "../shared/ingame"]);
        let command = pack.command(&settings);
        assert_eq!(
            command.values_of("-common"),
            vec![
                "Common/MUNGED/PC/core.files",
                "Worlds/abc/MUNGED/PC/MZ.files",
                "../shared/ingame.files"
            ]
        );
        assert_eq!(command.values_of("-outputdir"), vec!["../_LVL_PC/ABC"]);
        assert!(command.position("-onlyfiles").is_none());
    }

    #[test]
    fn write_files_respect_relative_flag() {
        let settings = settings();
        let pack = LevelPack::new(&["core.req"], "../Common").write(["core"]);
        assert_eq!(
            pack.command(&settings).values_of("-writefiles"),
            vec!["Common/MUNGED/PC/core.files"]
        );

        let pack = LevelPack::new(&["*.req"], "../Worlds/abc/world1")
            .write(["Worlds/abc/MUNGED/PC/MZ"])
            .relative_write();
        assert_eq!(
            pack.command(&settings).values_of("-writefiles"),
            vec!["Worlds/abc/MUNGED/PC/MZ.files"]
        );
    }

    #[test]
    fn clean_log_detection() {
        assert!(is_clean_log("Munged 12 files\n0 Errors\n0 Warnings\n"));
        assert!(is_clean_log("0\tErrors, 0  Warnings"));
        assert!(!is_clean_log("0 Errors\n3 Warnings"));
        assert!(!is_clean_log("1 Errors\n0 Warnings"));
        assert!(!is_clean_log("0Errors 0Warnings"));
        assert!(!is_clean_log(""));
    }

    fn log_dir(label: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "xmunge_tools_{}_{}_{}",
            label,
            std::process::id(),
            nanos
        ));
        let _ = std::fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn tool_log_with_errors_is_reported_under_its_inputs() {
        let dir = log_dir("report");
        let path = dir.join("ConfigMunge.log");
        std::fs::write(&path, "ERROR[ConfigMunge hoth.fx]: bad token\n1 Errors\n0 Warnings\n")
            .unwrap();

        match read_tool_log(&path, "$*.fx") {
            ToolLog::Report(report) => {
                assert!(report.starts_with("[$*.fx]\nERROR[ConfigMunge hoth.fx]"));
                assert!(report.ends_with("0 Warnings\n"));
            }
            other => panic!("expected a report, got {:?}", other),
        }
    }

    #[test]
    fn clean_or_missing_tool_log_is_not_reported() {
        let dir = log_dir("clean");
        let path = dir.join("OdfMunge.log");
        std::fs::write(&path, "Munged 4 files\n0 Errors\n0 Warnings\n").unwrap();
        assert!(matches!(read_tool_log(&path, "$*.odf"), ToolLog::Clean));
        assert!(matches!(
            read_tool_log(&dir.join(LEVEL_PACK_LOG), "core.req"),
            ToolLog::Missing
        ));
    }

    #[test]
    fn missing_log_does_not_fail_the_step() {
        let settings = Settings::new("PC", None).unwrap().with_build_root(log_dir("step"));
        let runner = RecordingRunner {
            exit_code: 0,
            commands: RefCell::new(Vec::new()),
        };
        let ctx = MungeContext::new(&settings, &runner);

        let pack = LevelPack::new(&["core.req"], "../Common").output("../_LVL_PC");
        assert_eq!(level_pack(&ctx, &pack), StepOutcome::Succeeded);
        assert!(ctx.report().failures.is_empty());
    }

    #[test]
    fn failed_step_is_recorded_not_raised() {
        let settings = settings();
        let runner = RecordingRunner {
            exit_code: 1,
            commands: RefCell::new(Vec::new()),
        };
        let ctx = MungeContext::new(&settings, &runner);

        let outcome = munge(
            &ctx,
            Category::Odf,
            &["$*.odf"],
            Path::new("../Common"),
            Path::new("Common/MUNGED/PC"),
            MungeOptions::default(),
        );

        assert_eq!(outcome, StepOutcome::Failed { code: 1 });
        let report = ctx.report();
        assert_eq!(report.steps, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].program, "OdfMunge");
        assert_eq!(runner.commands.borrow().len(), 1);
    }
}
