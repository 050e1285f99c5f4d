//! Range resolution: turns the four optional bounds into a starting traversal

use crate::board::Board;
use crate::config::ScrapeBounds;
use crate::extract::BoardIndex;
use crate::state::{DateWindow, Traversal};
use crate::{ConfigError, HarvestError};
use chrono::NaiveDate;

/// The scrape mode selected by the bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeMode {
    ById { start: u64, end: u64 },
    ByDate(DateWindow),
}

/// Returns the pair if both halves are set, `None` if neither is
fn paired<T: Copy>(
    start: Option<T>,
    end: Option<T>,
    start_name: &str,
    end_name: &str,
) -> Result<Option<(T, T)>, ConfigError> {
    match (start, end) {
        (Some(s), Some(e)) => Ok(Some((s, e))),
        (None, None) => Ok(None),
        _ => Err(ConfigError::Validation(format!(
            "`{}` and `{}` must be provided together",
            start_name, end_name
        ))),
    }
}

/// Selects exactly one scrape mode from the bounds
///
/// Pure validation; never touches the network.
pub fn select_mode(bounds: &ScrapeBounds) -> Result<ScrapeMode, ConfigError> {
    let ids = paired(bounds.start_id, bounds.end_id, "start-id", "end-id")?;
    let dates = paired(bounds.start_date, bounds.end_date, "start-date", "end-date")?;

    match (ids, dates) {
        (Some(_), Some(_)) => Err(ConfigError::Validation(
            "Both an id range and a date range were provided; provide only one".to_string(),
        )),
        (None, None) => Err(ConfigError::Validation(
            "Scrape bounds must be provided: either start-id & end-id or start-date & end-date"
                .to_string(),
        )),
        (Some((start, end)), None) => {
            if start > end {
                return Err(ConfigError::Validation(format!(
                    "start-id ({}) must be less than or equal to end-id ({})",
                    start, end
                )));
            }
            Ok(ScrapeMode::ById { start, end })
        }
        (None, Some((start, end))) => {
            if start > end {
                return Err(ConfigError::Validation(format!(
                    "start-date ({}) must not be after end-date ({})",
                    fmt_date(start),
                    fmt_date(end)
                )));
            }
            Ok(ScrapeMode::ByDate(DateWindow::new(start, end)))
        }
    }
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(crate::post::DATE_FORMAT).to_string()
}

/// Resolves the starting traversal for a board
///
/// Bounds are validated first, then the board's existence is checked, then
/// (date mode only) the newest regular post id becomes the starting cursor.
///
/// # Errors
///
/// * `HarvestError::Config` - Invalid, partial, or ambiguous bounds
/// * `HarvestError::NotFound` - The board does not exist, or lists no regular post
/// * `HarvestError::Fetch` - A lookup request failed outright
pub async fn resolve<I: BoardIndex + ?Sized>(
    index: &I,
    board: &Board,
    bounds: &ScrapeBounds,
) -> Result<Traversal, HarvestError> {
    let mode = select_mode(bounds)?;

    if !index.board_exists(board).await? {
        return Err(HarvestError::NotFound(format!(
            "Board {} does not exist",
            board
        )));
    }

    match mode {
        ScrapeMode::ById { start, end } => {
            tracing::info!("Harvesting {} by id: {} ..= {}", board, start, end);
            Ok(Traversal::AscendingById { cursor: start, end })
        }
        ScrapeMode::ByDate(window) => {
            let recent = index.fetch_recent_post_id(board).await?.ok_or_else(|| {
                HarvestError::NotFound(format!("No recent regular post listed on board {}", board))
            })?;
            tracing::info!(
                "Harvesting {} by date: {}, walking back from post {}",
                board,
                window,
                recent
            );
            Ok(Traversal::DescendingByDate {
                cursor: recent,
                window,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardKind;
    use crate::FetchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeIndex {
        exists: bool,
        recent: Option<u64>,
        calls: AtomicUsize,
    }

    impl FakeIndex {
        fn new(exists: bool, recent: Option<u64>) -> Self {
            Self {
                exists,
                recent,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BoardIndex for FakeIndex {
        async fn board_exists(&self, _board: &Board) -> Result<bool, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.exists)
        }

        async fn fetch_recent_post_id(&self, _board: &Board) -> Result<Option<u64>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.recent)
        }
    }

    fn board() -> Board {
        Board::with_default_host("test", BoardKind::Main).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn id_bounds(start: u64, end: u64) -> ScrapeBounds {
        ScrapeBounds {
            start_id: Some(start),
            end_id: Some(end),
            ..ScrapeBounds::default()
        }
    }

    #[test]
    fn test_id_mode() {
        assert_eq!(
            select_mode(&id_bounds(10, 20)).unwrap(),
            ScrapeMode::ById { start: 10, end: 20 }
        );
    }

    #[test]
    fn test_single_id_range_is_valid() {
        assert!(select_mode(&id_bounds(5, 5)).is_ok());
    }

    #[test]
    fn test_start_id_without_end_id() {
        let bounds = ScrapeBounds {
            start_id: Some(1),
            ..ScrapeBounds::default()
        };
        assert!(matches!(select_mode(&bounds), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_end_date_without_start_date() {
        let bounds = ScrapeBounds {
            end_date: day(2024, 1, 1),
            ..ScrapeBounds::default()
        };
        assert!(matches!(select_mode(&bounds), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_both_modes_rejected() {
        let bounds = ScrapeBounds {
            start_id: Some(1),
            end_id: Some(2),
            start_date: day(2024, 1, 1),
            end_date: day(2024, 1, 2),
        };
        assert!(matches!(select_mode(&bounds), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_no_mode_rejected() {
        assert!(matches!(
            select_mode(&ScrapeBounds::default()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_reversed_ranges_rejected() {
        assert!(select_mode(&id_bounds(20, 10)).is_err());

        let bounds = ScrapeBounds {
            start_date: day(2024, 2, 1),
            end_date: day(2024, 1, 1),
            ..ScrapeBounds::default()
        };
        assert!(select_mode(&bounds).is_err());
    }

    #[tokio::test]
    async fn test_config_error_precedes_network() {
        let index = FakeIndex::new(true, Some(100));
        let result = resolve(&index, &board(), &ScrapeBounds::default()).await;
        assert!(matches!(result, Err(HarvestError::Config(_))));
        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_board() {
        let index = FakeIndex::new(false, Some(100));
        let result = resolve(&index, &board(), &id_bounds(1, 2)).await;
        assert!(matches!(result, Err(HarvestError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_resolve_id_mode() {
        let index = FakeIndex::new(true, None);
        let traversal = resolve(&index, &board(), &id_bounds(3, 9)).await.unwrap();
        assert_eq!(traversal, Traversal::AscendingById { cursor: 3, end: 9 });
    }

    #[tokio::test]
    async fn test_resolve_date_mode_starts_at_recent_post() {
        let index = FakeIndex::new(true, Some(4321));
        let bounds = ScrapeBounds {
            start_date: day(2024, 1, 1),
            end_date: day(2024, 1, 31),
            ..ScrapeBounds::default()
        };
        let traversal = resolve(&index, &board(), &bounds).await.unwrap();
        assert_eq!(traversal.cursor(), Some(4321));
        assert!(matches!(traversal, Traversal::DescendingByDate { .. }));
    }

    #[tokio::test]
    async fn test_date_mode_without_recent_post() {
        let index = FakeIndex::new(true, None);
        let bounds = ScrapeBounds {
            start_date: day(2024, 1, 1),
            end_date: day(2024, 1, 31),
            ..ScrapeBounds::default()
        };
        let result = resolve(&index, &board(), &bounds).await;
        assert!(matches!(result, Err(HarvestError::NotFound(_))));
    }
}
