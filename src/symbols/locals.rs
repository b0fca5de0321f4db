use crate::config::NamingScheme;

/// Which compiler naming convention a local follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalKind {
    /// `SACp_emal_<n>_<name>...` - copy introduced per loop iteration.
    IterationCopy,
    /// `SACl_<name>...` - renamed user variable.
    UserLocal,
}

impl LocalKind {
    /// Underscore-delimited segments in front of the source name.
    fn prefix_segments(self) -> usize {
        match self {
            LocalKind::IterationCopy => 3,
            LocalKind::UserLocal => 1,
        }
    }
}

/// A translation-relevant local taken from an `info locals` style dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub name: String,
    pub kind: LocalKind,
}

impl LocalVariable {
    /// Classify a low-level name, or `None` if it is not a user variable
    /// (unrelated symbol or array descriptor field).
    pub fn classify(scheme: &NamingScheme, name: &str) -> Option<Self> {
        let kind = if name.contains(&scheme.iteration_prefix) {
            LocalKind::IterationCopy
        } else if name.contains(&scheme.local_prefix) {
            LocalKind::UserLocal
        } else {
            return None;
        };

        if scheme
            .descriptor_markers
            .iter()
            .any(|marker| name.contains(marker.as_str()))
        {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            kind,
        })
    }

    /// The name with its compiler prefix removed: `SACp_emal_5_x__SSA0_1`
    /// gives `x__SSA0_1`, `SACl_foo` gives `foo`.
    pub fn designator(&self) -> &str {
        let segments = self.kind.prefix_segments();
        self.name.splitn(segments + 1, '_').nth(segments).unwrap_or("")
    }
}

/// Keep the relevant locals of a dump, in dump order. Each line's first
/// whitespace-delimited token is the variable name.
pub fn extract_locals(scheme: &NamingScheme, dump: &str) -> Vec<LocalVariable> {
    dump.lines()
        .filter_map(|line| line.split(char::is_whitespace).next())
        .filter_map(|token| LocalVariable::classify(scheme, token))
        .collect()
}

/// Pick the live instance of `short` among `locals`.
///
/// Candidates are the locals whose designator starts with `short`. SSA
/// renaming appends increasing suffixes, so the lexicographically greatest
/// full name is taken as the most recent. Suffixes are plain decimal, which
/// means `..._SSA0_10` sorts before `..._SSA0_9`.
pub fn resolve_variable<'a>(short: &str, locals: &'a [LocalVariable]) -> Option<&'a str> {
    locals
        .iter()
        .filter(|local| local.designator().starts_with(short))
        .map(|local| local.name.as_str())
        .max()
}
