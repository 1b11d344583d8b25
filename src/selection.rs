use clap::Args;

/// Name accepted in place of a side or world list to mean "all of them".
pub const EVERYTHING: &str = "EVERYTHING";

/// Category switches shared by the munge and clean entry points.
#[derive(Args, Clone, Debug, Default)]
pub struct CategoryFlags {
    /// World(s) to process
    #[arg(long = "world", num_args = 1.., value_name = "WORLD")]
    pub worlds: Option<Vec<String>>,
    /// Side(s) to process
    #[arg(long = "side", num_args = 1.., value_name = "SIDE")]
    pub sides: Option<Vec<String>>,
    /// Load screens
    #[arg(long, default_value_t = false)]
    pub load: bool,
    /// Sound banks and streams
    #[arg(long, default_value_t = false)]
    pub sound: bool,
    /// Common data
    #[arg(long, default_value_t = false)]
    pub common: bool,
    /// Shell (front end) data
    #[arg(long, default_value_t = false)]
    pub shell: bool,
    /// Shell movies
    #[arg(long, default_value_t = false)]
    pub movies: bool,
    /// Localization files of the common data
    #[arg(long, default_value_t = false)]
    pub localize: bool,
    /// The addme script
    #[arg(long, default_value_t = false)]
    pub addme: bool,
}

impl CategoryFlags {
    fn any(&self) -> bool {
        self.worlds.is_some()
            || self.sides.is_some()
            || self.load
            || self.sound
            || self.common
            || self.shell
            || self.movies
            || self.localize
            || self.addme
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Targets {
    #[default]
    None,
    Named(Vec<String>),
    Everything,
}

impl Targets {
    fn from_names(names: &Option<Vec<String>>) -> Self {
        match names {
            None => Targets::None,
            Some(names) if names.iter().any(|n| n.eq_ignore_ascii_case(EVERYTHING)) => {
                Targets::Everything
            }
            Some(names) if names.is_empty() => Targets::None,
            Some(names) => Targets::Named(names.clone()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Targets::None)
    }
}

/// Which categories a run touches. Built once from the flags.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Selection {
    pub everything: bool,
    pub common: bool,
    pub shell: bool,
    pub load: bool,
    pub sound: bool,
    pub movies: bool,
    pub localize: bool,
    pub addme: bool,
    pub sides: Targets,
    pub worlds: Targets,
}

impl Selection {
    /// No category flag at all means everything.
    pub fn from_flags(flags: &CategoryFlags) -> Self {
        if !flags.any() {
            return Selection::everything();
        }

        Selection {
            everything: false,
            common: flags.common,
            shell: flags.shell,
            load: flags.load,
            sound: flags.sound,
            movies: flags.movies,
            localize: flags.localize,
            addme: flags.addme,
            sides: Targets::from_names(&flags.sides),
            worlds: Targets::from_names(&flags.worlds),
        }
    }

    pub fn everything() -> Self {
        Selection {
            everything: true,
            common: true,
            shell: true,
            load: true,
            sound: true,
            movies: true,
            localize: true,
            addme: true,
            sides: Targets::Everything,
            worlds: Targets::Everything,
        }
    }

    /// The addme script rides along with common data.
    pub fn wants_addme(&self) -> bool {
        self.common || self.addme
    }
}
