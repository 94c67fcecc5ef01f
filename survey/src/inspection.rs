//! Visual-inspection flag vocabulary and result merging.
//!
//! Human inspectors tag each annotated image stamp with single-character
//! flags. The wire form is a short string ("y", "cf", ...); in memory the
//! flags are an explicit set so membership and merging never touch string
//! manipulation. All flags but the favorite marker are mutually exclusive
//! on one image.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    #[error("unknown inspection flag {0:?}")]
    UnknownFlag(char),

    #[error("conflicting inspection flags {0:?} and {1:?}")]
    ConflictingFlags(char, char),
}

/// One inspector judgement about one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InspectionFlag {
    /// `y` - a host object is visible.
    HostVisible,
    /// `n` - no host object is visible.
    HostAbsent,
    /// `q` - image quality too poor to judge.
    PoorQuality,
    /// `c` - a potentially confusing close-by object.
    CloseByConfusion,
    /// `f` - flagged as an interesting case; combines with any other flag.
    Favorite,
    /// `?` - inspector could not decide.
    Uncertain,
}

impl InspectionFlag {
    pub const ALL: [InspectionFlag; 6] = [
        InspectionFlag::HostVisible,
        InspectionFlag::HostAbsent,
        InspectionFlag::PoorQuality,
        InspectionFlag::CloseByConfusion,
        InspectionFlag::Favorite,
        InspectionFlag::Uncertain,
    ];

    pub fn code(self) -> char {
        match self {
            InspectionFlag::HostVisible => 'y',
            InspectionFlag::HostAbsent => 'n',
            InspectionFlag::PoorQuality => 'q',
            InspectionFlag::CloseByConfusion => 'c',
            InspectionFlag::Favorite => 'f',
            InspectionFlag::Uncertain => '?',
        }
    }

    pub fn from_code(code: char) -> Result<Self, FlagError> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.code() == code)
            .ok_or(FlagError::UnknownFlag(code))
    }

    /// Every flag except the favorite marker excludes the others.
    fn is_exclusive(self) -> bool {
        !matches!(self, InspectionFlag::Favorite)
    }

    fn bit(self) -> u8 {
        match self {
            InspectionFlag::HostVisible => 1 << 0,
            InspectionFlag::HostAbsent => 1 << 1,
            InspectionFlag::PoorQuality => 1 << 2,
            InspectionFlag::CloseByConfusion => 1 << 3,
            InspectionFlag::Favorite => 1 << 4,
            InspectionFlag::Uncertain => 1 << 5,
        }
    }
}

/// The flags one inspector attached to one image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlagSet(u8);

impl FlagSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, flag: InspectionFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Add a flag, enforcing mutual exclusion of the non-favorite flags.
    pub fn insert(&mut self, flag: InspectionFlag) -> Result<(), FlagError> {
        if flag.is_exclusive() {
            if let Some(existing) = self.iter().find(|f| f.is_exclusive() && *f != flag) {
                return Err(FlagError::ConflictingFlags(existing.code(), flag.code()));
            }
        }
        self.0 |= flag.bit();
        Ok(())
    }

    /// The same set without the favorite marker; judgement comparisons
    /// ignore it.
    pub fn without_favorite(self) -> Self {
        Self(self.0 & !InspectionFlag::Favorite.bit())
    }

    pub fn iter(self) -> impl Iterator<Item = InspectionFlag> {
        InspectionFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }

    /// Parse the wire form, e.g. "y", "cf", "?".
    pub fn parse(text: &str) -> Result<Self, FlagError> {
        let mut set = FlagSet::empty();
        for code in text.trim().chars() {
            set.insert(InspectionFlag::from_code(code)?)?;
        }
        Ok(set)
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in self.iter() {
            write!(f, "{}", flag.code())?;
        }
        Ok(())
    }
}

/// Merge independent inspectors' judgements of one image.
///
/// Favorites are personal bookmarks and dropped before comparing. The
/// merge keeps the judgement only when every inspector who saw the image
/// agrees; disagreement (or no results at all) yields `None` and the image
/// stays unresolved.
pub fn combine_consistent(results: &[FlagSet]) -> Option<FlagSet> {
    let mut distinct: Vec<FlagSet> = Vec::new();
    for result in results {
        let stripped = result.without_favorite();
        if !distinct.contains(&stripped) {
            distinct.push(stripped);
        }
    }
    match distinct.as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}

/// Event-level call from per-image judgements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triage {
    /// Some image shows a host, none denies it.
    Visible,
    /// Some image denies a host, none shows one.
    Absent,
    /// Conflicting or inconclusive images.
    Ambiguous,
}

/// Collapse an event's per-image flag sets into one call.
pub fn triage<I: IntoIterator<Item = FlagSet>>(per_image: I) -> Triage {
    let mut visible = false;
    let mut absent = false;
    for set in per_image {
        visible |= set.contains(InspectionFlag::HostVisible);
        absent |= set.contains(InspectionFlag::HostAbsent);
    }
    match (visible, absent) {
        (true, false) => Triage::Visible,
        (false, true) => Triage::Absent,
        _ => Triage::Ambiguous,
    }
}
