/// Traversal state definitions
///
/// The traversal is a tagged union over its two walking modes plus the
/// terminal state. The engine holds one value and replaces it after every
/// step.
use chrono::NaiveDate;
use std::fmt;

/// Inclusive calendar window `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Where a date falls relative to a [`DateWindow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    Before,
    Within,
    After,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn position(&self, date: NaiveDate) -> WindowPosition {
        if date < self.start {
            WindowPosition::Before
        } else if date > self.end {
            WindowPosition::After
        } else {
            WindowPosition::Within
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}",
            self.start.format(crate::post::DATE_FORMAT),
            self.end.format(crate::post::DATE_FORMAT)
        )
    }
}

/// Cursor plus the rule that decides direction and stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Walk forward through post ids until `cursor > end`
    AscendingById { cursor: u64, end: u64 },

    /// Walk backward from the newest post until a post predates the window
    DescendingByDate { cursor: u64, window: DateWindow },

    Terminated,
}

/// Discriminant of a [`Traversal`], used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalState {
    AscendingById,
    DescendingByDate,
    Terminated,
}

impl Traversal {
    pub fn state(&self) -> TraversalState {
        match self {
            Self::AscendingById { .. } => TraversalState::AscendingById,
            Self::DescendingByDate { .. } => TraversalState::DescendingByDate,
            Self::Terminated => TraversalState::Terminated,
        }
    }

    /// The post id examined by the next step, if any
    pub fn cursor(&self) -> Option<u64> {
        match self {
            Self::AscendingById { cursor, end } if cursor <= end => Some(*cursor),
            Self::DescendingByDate { cursor, .. } => Some(*cursor),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Moves the cursor one post in the walking direction
    ///
    /// Ascending walks terminate once they pass `end`; descending walks
    /// terminate once there is no lower post id left.
    pub fn advance(self) -> Self {
        match self {
            Self::AscendingById { cursor, end } => match cursor.checked_add(1) {
                Some(next) if next <= end => Self::AscendingById { cursor: next, end },
                _ => Self::Terminated,
            },
            Self::DescendingByDate { cursor, window } => match cursor.checked_sub(1) {
                Some(next) if next >= 1 => Self::DescendingByDate {
                    cursor: next,
                    window,
                },
                _ => Self::Terminated,
            },
            Self::Terminated => Self::Terminated,
        }
    }
}

impl fmt::Display for TraversalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AscendingById => "ascending by id",
            Self::DescendingByDate => "descending by date",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_window_position_inclusive() {
        let window = DateWindow::new(day(10), day(20));
        assert_eq!(window.position(day(9)), WindowPosition::Before);
        assert_eq!(window.position(day(10)), WindowPosition::Within);
        assert_eq!(window.position(day(20)), WindowPosition::Within);
        assert_eq!(window.position(day(21)), WindowPosition::After);
    }

    #[test]
    fn test_ascending_stops_after_end() {
        let traversal = Traversal::AscendingById { cursor: 4, end: 5 };
        let next = traversal.advance();
        assert_eq!(next, Traversal::AscendingById { cursor: 5, end: 5 });
        assert!(next.advance().is_terminated());
    }

    #[test]
    fn test_descending_stops_below_one() {
        let window = DateWindow::new(day(1), day(2));
        let traversal = Traversal::DescendingByDate { cursor: 2, window };
        let next = traversal.advance();
        assert_eq!(next.cursor(), Some(1));
        assert!(next.advance().is_terminated());
    }

    #[test]
    fn test_ascending_cursor_hidden_past_end() {
        let traversal = Traversal::AscendingById { cursor: 9, end: 3 };
        assert_eq!(traversal.cursor(), None);
    }

    #[test]
    fn test_state_discriminant() {
        assert_eq!(Traversal::Terminated.state(), TraversalState::Terminated);
        assert_eq!(
            Traversal::AscendingById { cursor: 1, end: 1 }.state(),
            TraversalState::AscendingById
        );
    }
}
