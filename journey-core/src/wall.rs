//! Story wall filtering.
//!
//! Filters are transient view state: they select from the collection without
//! ever changing it. Identity and college predicates compose with AND.

use crate::story::{Identity, Story};
use std::collections::BTreeSet;

/// Heading shown when no story matches the active filters.
pub const EMPTY_WALL_TITLE: &str = "暂无符合条件的故事。";
/// Hint shown under the empty-state heading.
pub const EMPTY_WALL_HINT: &str = "成为第一个分享的人吧！";

/// Identity predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityFilter {
    #[default]
    All,
    Only(Identity),
}

impl IdentityFilter {
    pub fn matches(&self, identity: Identity) -> bool {
        match self {
            IdentityFilter::All => true,
            IdentityFilter::Only(wanted) => *wanted == identity,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IdentityFilter::All => "全部",
            IdentityFilter::Only(identity) => identity.label(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(IdentityFilter::All);
        }
        s.parse().ok().map(IdentityFilter::Only)
    }
}

/// College predicate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CollegeFilter {
    #[default]
    Any,
    Exactly(String),
}

impl CollegeFilter {
    pub fn matches(&self, college: &str) -> bool {
        match self {
            CollegeFilter::Any => true,
            CollegeFilter::Exactly(wanted) => wanted == college,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CollegeFilter::Any => "所有学院 / 单位",
            CollegeFilter::Exactly(college) => college,
        }
    }

    /// Step through `Any` followed by each of `options`, wrapping around.
    pub fn cycle(&self, options: &[String], forward: bool) -> CollegeFilter {
        // Position 0 is Any, 1..=len are the options
        let slots = options.len() + 1;
        let current = match self {
            CollegeFilter::Any => 0,
            CollegeFilter::Exactly(college) => options
                .iter()
                .position(|o| o == college)
                .map(|i| i + 1)
                .unwrap_or(0),
        };
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };

        match next {
            0 => CollegeFilter::Any,
            i => CollegeFilter::Exactly(options[i - 1].clone()),
        }
    }
}

/// The wall's active filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WallFilter {
    pub identity: IdentityFilter,
    pub college: CollegeFilter,
}

impl WallFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: IdentityFilter) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_college(mut self, college: CollegeFilter) -> Self {
        self.college = college;
        self
    }

    pub fn matches(&self, story: &Story) -> bool {
        self.identity.matches(story.identity) && self.college.matches(&story.college)
    }

    /// Stories passing both predicates, in collection order.
    pub fn apply<'a>(&self, stories: &'a [Story]) -> Vec<&'a Story> {
        stories.iter().filter(|s| self.matches(s)).collect()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.identity == IdentityFilter::All && self.college == CollegeFilter::Any
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Distinct non-empty colleges in the collection, alphabetically ordered.
pub fn college_options(stories: &[Story]) -> Vec<String> {
    stories
        .iter()
        .map(|s| s.college.as_str())
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_story;

    fn collection() -> Vec<Story> {
        vec![
            sample_story("5", Identity::Faculty, "国际关系学院"),
            sample_story("4", Identity::Student, "法学院"),
            sample_story("3", Identity::Alumni, "国际关系学院"),
            sample_story("2", Identity::Student, ""),
            sample_story("1", Identity::Alumni, "法学院"),
        ]
    }

    fn ids(stories: &[&Story]) -> Vec<String> {
        stories.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn test_unrestricted_returns_everything() {
        let stories = collection();
        let filter = WallFilter::new();
        assert!(filter.is_unrestricted());
        assert_eq!(ids(&filter.apply(&stories)), vec!["5", "4", "3", "2", "1"]);
    }

    #[test]
    fn test_identity_filter() {
        let stories = collection();
        let filter = WallFilter::new().with_identity(IdentityFilter::Only(Identity::Alumni));
        assert_eq!(ids(&filter.apply(&stories)), vec!["3", "1"]);
    }

    #[test]
    fn test_filters_compose() {
        let stories = collection();
        let filter = WallFilter::new()
            .with_identity(IdentityFilter::Only(Identity::Alumni))
            .with_college(CollegeFilter::Exactly("法学院".to_string()));
        assert_eq!(ids(&filter.apply(&stories)), vec!["1"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let stories = collection();
        let filter = WallFilter::new().with_college(CollegeFilter::Exactly("国际关系学院".to_string()));

        let once: Vec<Story> = filter.apply(&stories).into_iter().cloned().collect();
        let twice: Vec<Story> = filter.apply(&once).into_iter().cloned().collect();
        assert_eq!(once, twice);
        // The source collection is untouched
        assert_eq!(stories.len(), 5);
    }

    #[test]
    fn test_college_options_sorted_and_distinct() {
        let options = college_options(&collection());
        let mut expected = vec!["国际关系学院".to_string(), "法学院".to_string()];
        expected.sort();
        assert_eq!(options, expected);
    }

    #[test]
    fn test_college_cycle_wraps() {
        let options = vec!["A".to_string(), "B".to_string()];
        let any = CollegeFilter::Any;

        let a = any.cycle(&options, true);
        assert_eq!(a, CollegeFilter::Exactly("A".to_string()));
        let b = a.cycle(&options, true);
        assert_eq!(b, CollegeFilter::Exactly("B".to_string()));
        assert_eq!(b.cycle(&options, true), CollegeFilter::Any);
        assert_eq!(any.cycle(&options, false), CollegeFilter::Exactly("B".to_string()));
        assert_eq!(any.cycle(&[], true), CollegeFilter::Any);
    }

    #[test]
    fn test_identity_filter_parse() {
        assert_eq!(IdentityFilter::parse("ALL"), Some(IdentityFilter::All));
        assert_eq!(
            IdentityFilter::parse("student"),
            Some(IdentityFilter::Only(Identity::Student))
        );
        assert_eq!(IdentityFilter::parse("dean"), None);
    }
}
