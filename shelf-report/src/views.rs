//! The ten report views
//!
//! Each view is a pure function of the snapshot and the joined table. A view
//! returns `None` when it has nothing to plot, which the job records as a
//! skipped chart rather than an error.

use std::collections::HashMap;

use tracing::info;

use crate::error::{ReportError, ReportResult};
use crate::join::JoinedTable;
use crate::snapshot::Snapshot;
use crate::stats::{self, Histogram};

/// Bins in the score histogram
pub const HISTOGRAM_BINS: usize = 10;

/// Samples along the density overlay
pub const KDE_POINTS: usize = 200;

/// Length of every top-N list
pub const TOP_N: usize = 10;

/// Report views in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    ScoreDistribution,
    TopBooks,
    GenreAverage,
    AuthorsMostBooks,
    MostRatedBooks,
    MostActiveUsers,
    UserAverage,
    AverageByYear,
    GenreShare,
    CorrelationHeatmap,
}

impl ViewKind {
    pub const ALL: [ViewKind; 10] = [
        ViewKind::ScoreDistribution,
        ViewKind::TopBooks,
        ViewKind::GenreAverage,
        ViewKind::AuthorsMostBooks,
        ViewKind::MostRatedBooks,
        ViewKind::MostActiveUsers,
        ViewKind::UserAverage,
        ViewKind::AverageByYear,
        ViewKind::GenreShare,
        ViewKind::CorrelationHeatmap,
    ];

    pub fn number(self) -> u8 {
        match self {
            ViewKind::ScoreDistribution => 1,
            ViewKind::TopBooks => 2,
            ViewKind::GenreAverage => 3,
            ViewKind::AuthorsMostBooks => 4,
            ViewKind::MostRatedBooks => 5,
            ViewKind::MostActiveUsers => 6,
            ViewKind::UserAverage => 7,
            ViewKind::AverageByYear => 8,
            ViewKind::GenreShare => 9,
            ViewKind::CorrelationHeatmap => 10,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ViewKind::ScoreDistribution => "score-distribution",
            ViewKind::TopBooks => "top-books",
            ViewKind::GenreAverage => "genre-average",
            ViewKind::AuthorsMostBooks => "authors-most-books",
            ViewKind::MostRatedBooks => "most-rated-books",
            ViewKind::MostActiveUsers => "most-active-users",
            ViewKind::UserAverage => "user-average",
            ViewKind::AverageByYear => "average-by-year",
            ViewKind::GenreShare => "genre-share",
            ViewKind::CorrelationHeatmap => "correlation-heatmap",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::ScoreDistribution => "Distribution of rating scores",
            ViewKind::TopBooks => "Top 10 books by average score",
            ViewKind::GenreAverage => "Average score by genre",
            ViewKind::AuthorsMostBooks => "Top 10 authors by number of books",
            ViewKind::MostRatedBooks => "Top 10 most rated books",
            ViewKind::MostActiveUsers => "Top 10 most active users",
            ViewKind::UserAverage => "Top 10 users by average score",
            ViewKind::AverageByYear => "Average score by publication year",
            ViewKind::GenreShare => "Share of ratings by genre",
            ViewKind::CorrelationHeatmap => "Correlation of book metrics",
        }
    }

    /// `report-N-<slug>.png`
    pub fn file_name(self) -> String {
        format!("report-{}-{}.png", self.number(), self.slug())
    }
}

/// One labelled bar
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

impl Bar {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// One pie slice with its preformatted percentage
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    pub percent: String,
}

/// Chart data handed to a sink
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Histogram {
        histogram: Histogram,
        /// Density curve already scaled to counts
        density: Option<Vec<(f64, f64)>>,
        x_label: &'static str,
    },
    HorizontalBars {
        bars: Vec<Bar>,
        value_label: &'static str,
    },
    VerticalBars {
        bars: Vec<Bar>,
        value_label: &'static str,
    },
    Line {
        points: Vec<(i32, f64)>,
        x_label: &'static str,
        y_label: &'static str,
    },
    Pie {
        slices: Vec<Slice>,
    },
    Heatmap {
        labels: Vec<String>,
        matrix: Vec<Vec<f64>>,
    },
}

/// Compute one view
pub fn compute(
    kind: ViewKind,
    snapshot: &Snapshot,
    table: &JoinedTable,
) -> ReportResult<Option<Chart>> {
    let chart = match kind {
        ViewKind::ScoreDistribution => Some(score_histogram(table)),
        ViewKind::TopBooks => non_empty(top_books_by_mean(table)).map(|bars| {
            Chart::HorizontalBars {
                bars,
                value_label: "Average score",
            }
        }),
        ViewKind::GenreAverage => {
            non_empty(mean_by_genre(table)).map(|bars| Chart::VerticalBars {
                bars,
                value_label: "Average score",
            })
        }
        ViewKind::AuthorsMostBooks => non_empty(top_authors_by_book_count(snapshot)).map(
            |bars| Chart::HorizontalBars {
                bars,
                value_label: "Number of books",
            },
        ),
        ViewKind::MostRatedBooks => {
            non_empty(most_rated_books(table)).map(|bars| Chart::HorizontalBars {
                bars,
                value_label: "Number of ratings",
            })
        }
        ViewKind::MostActiveUsers => {
            non_empty(top_users_by_count(table)).map(|bars| Chart::VerticalBars {
                bars,
                value_label: "Number of ratings",
            })
        }
        ViewKind::UserAverage => {
            non_empty(top_users_by_mean(table)).map(|bars| Chart::VerticalBars {
                bars,
                value_label: "Average score",
            })
        }
        ViewKind::AverageByYear => non_empty(mean_by_year(table)?).map(|points| Chart::Line {
            points,
            x_label: "Publication year",
            y_label: "Average score",
        }),
        ViewKind::GenreShare => non_empty(genre_share(table)).map(|slices| Chart::Pie { slices }),
        ViewKind::CorrelationHeatmap => {
            let (labels, matrix) = correlation_matrix(table)?;
            Some(Chart::Heatmap { labels, matrix })
        }
    };

    if chart.is_none() {
        info!("View {} ({}) has no data", kind.number(), kind.slug());
    }

    Ok(chart)
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// View 1: score histogram with a density overlay scaled to counts
pub fn score_histogram(table: &JoinedTable) -> Chart {
    let scores = table.scores();
    let histogram = stats::histogram(&scores, HISTOGRAM_BINS);
    let scale = scores.len() as f64 * histogram.bin_width();
    let density = stats::gaussian_kde(&scores, KDE_POINTS)
        .map(|curve| curve.into_iter().map(|(x, d)| (x, d * scale)).collect());

    Chart::Histogram {
        histogram,
        density,
        x_label: "Score",
    }
}

/// View 2: books ranked by mean score
pub fn top_books_by_mean(table: &JoinedTable) -> Vec<Bar> {
    let mut bars: Vec<Bar> = stats::group_ordered(&table.rows, |r| r.book_id)
        .into_iter()
        .filter_map(|(_, rows)| {
            let scores: Vec<f64> = rows.iter().map(|r| r.score).collect();
            Some(Bar::new(rows[0].title.clone(), stats::mean(&scores)?))
        })
        .collect();
    rank_descending(&mut bars);
    bars.truncate(TOP_N);
    bars
}

/// View 3: mean score per genre, in first-encountered genre order
pub fn mean_by_genre(table: &JoinedTable) -> Vec<Bar> {
    stats::group_ordered(&table.rows, |r| r.genre_id)
        .into_iter()
        .filter_map(|(_, rows)| {
            let scores: Vec<f64> = rows.iter().map(|r| r.score).collect();
            Some(Bar::new(rows[0].genre_name.clone(), stats::mean(&scores)?))
        })
        .collect()
}

/// View 4: authors by number of books in the catalog
///
/// Works on the snapshot, so books without ratings count too.
pub fn top_authors_by_book_count(snapshot: &Snapshot) -> Vec<Bar> {
    let names: HashMap<i64, &str> = snapshot
        .authors
        .iter()
        .map(|a| (a.id, a.name.as_str()))
        .collect();
    let authored: Vec<(i64, &str)> = snapshot
        .books
        .iter()
        .filter_map(|b| names.get(&b.author_id).map(|name| (b.author_id, *name)))
        .collect();

    let mut bars: Vec<Bar> = stats::group_ordered(&authored, |(id, _)| *id)
        .into_iter()
        .map(|(_, books)| Bar::new(books[0].1, books.len() as f64))
        .collect();
    rank_descending(&mut bars);
    bars.truncate(TOP_N);
    bars
}

/// View 5: the ten most rated books, least rated first
pub fn most_rated_books(table: &JoinedTable) -> Vec<Bar> {
    let mut bars: Vec<Bar> = stats::group_ordered(&table.rows, |r| r.book_id)
        .into_iter()
        .map(|(_, rows)| Bar::new(rows[0].title.clone(), rows.len() as f64))
        .collect();
    bars.sort_by(|a, b| a.value.total_cmp(&b.value));
    let skip = bars.len().saturating_sub(TOP_N);
    bars.split_off(skip)
}

/// View 6: users by number of ratings given
pub fn top_users_by_count(table: &JoinedTable) -> Vec<Bar> {
    let mut bars: Vec<Bar> = stats::group_ordered(&table.rows, |r| r.user_id)
        .into_iter()
        .map(|(_, rows)| Bar::new(rows[0].username.clone(), rows.len() as f64))
        .collect();
    rank_descending(&mut bars);
    bars.truncate(TOP_N);
    bars
}

/// View 7: users by mean score given
pub fn top_users_by_mean(table: &JoinedTable) -> Vec<Bar> {
    let mut bars: Vec<Bar> = stats::group_ordered(&table.rows, |r| r.user_id)
        .into_iter()
        .filter_map(|(_, rows)| {
            let scores: Vec<f64> = rows.iter().map(|r| r.score).collect();
            Some(Bar::new(rows[0].username.clone(), stats::mean(&scores)?))
        })
        .collect();
    rank_descending(&mut bars);
    bars.truncate(TOP_N);
    bars
}

/// View 8: mean score per publication year, ascending by year
///
/// Rows without a release date are left out. A date that is present but
/// unreadable fails the view.
pub fn mean_by_year(table: &JoinedTable) -> ReportResult<Vec<(i32, f64)>> {
    let mut dated: Vec<(i32, f64)> = Vec::new();
    for row in &table.rows {
        if let Some(year) = row_year(row.book_id, row.release_date.as_deref())? {
            dated.push((year, row.score));
        }
    }

    let mut points: Vec<(i32, f64)> = stats::group_ordered(&dated, |(year, _)| *year)
        .into_iter()
        .filter_map(|(year, rows)| {
            let scores: Vec<f64> = rows.iter().map(|(_, s)| *s).collect();
            Some((year, stats::mean(&scores)?))
        })
        .collect();
    points.sort_by_key(|(year, _)| *year);

    Ok(points)
}

/// View 9: share of ratings per genre, largest first
pub fn genre_share(table: &JoinedTable) -> Vec<Slice> {
    let total = table.len();
    let mut counts: Vec<(String, usize)> = stats::group_ordered(&table.rows, |r| r.genre_id)
        .into_iter()
        .map(|(_, rows)| (rows[0].genre_name.clone(), rows.len()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .map(|(label, count)| Slice {
            label,
            count,
            percent: format!("{:.1}%", count as f64 * 100.0 / total as f64),
        })
        .collect()
}

/// Labels of the correlation matrix rows and columns
pub const CORRELATION_LABELS: [&str; 3] = ["Average score", "Ratings", "Publication year"];

/// View 10: Pearson correlation between per-book mean score, rating count
/// and publication year
///
/// Books are taken in id order. Undefined coefficients are NaN.
pub fn correlation_matrix(table: &JoinedTable) -> ReportResult<(Vec<String>, Vec<Vec<f64>>)> {
    let mut books = stats::group_ordered(&table.rows, |r| r.book_id);
    books.sort_by_key(|(id, _)| *id);

    let mut means = Vec::with_capacity(books.len());
    let mut counts = Vec::with_capacity(books.len());
    let mut years = Vec::with_capacity(books.len());

    for (book_id, rows) in &books {
        let scores: Vec<f64> = rows.iter().map(|r| r.score).collect();
        means.push(stats::mean(&scores));
        counts.push(Some(rows.len() as f64));

        let mut year = None;
        for row in rows {
            if let Some(y) = row_year(*book_id, row.release_date.as_deref())? {
                year = Some(f64::from(y));
                break;
            }
        }
        years.push(year);
    }

    let labels = CORRELATION_LABELS.iter().map(|l| l.to_string()).collect();
    Ok((labels, stats::correlation_matrix(&[means, counts, years])))
}

/// Year of a row's release date; `None` when absent or blank
fn row_year(book_id: i64, value: Option<&str>) -> ReportResult<Option<i32>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => stats::parse_year(v)
            .map(Some)
            .ok_or_else(|| ReportError::InvalidDate {
                book_id,
                value: v.to_string(),
            }),
    }
}

/// Stable descending sort on bar value
fn rank_descending(bars: &mut [Bar]) {
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::JoinedRow;
    use crate::snapshot::BookRow;
    use shelf_common::db::Author;

    fn row(rating_id: i64, book_id: i64, user_id: i64, genre_id: i64, score: f64) -> JoinedRow {
        JoinedRow {
            rating_id,
            book_id,
            title: format!("Book {}", book_id),
            user_id,
            username: format!("user{}", user_id),
            author_id: 1,
            author_name: "Author".into(),
            genre_id,
            genre_name: format!("Genre {}", genre_id),
            release_date: None,
            score,
        }
    }

    fn table(rows: Vec<JoinedRow>) -> JoinedTable {
        JoinedTable { rows }
    }

    fn labels(bars: &[Bar]) -> Vec<&str> {
        bars.iter().map(|b| b.label.as_str()).collect()
    }

    #[test]
    fn test_file_names() {
        let names: Vec<String> = ViewKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(names[0], "report-1-score-distribution.png");
        assert_eq!(names[3], "report-4-authors-most-books.png");
        assert_eq!(names[9], "report-10-correlation-heatmap.png");
    }

    #[test]
    fn test_top_books_means_and_ranking() {
        let t = table(vec![row(1, 1, 1, 1, 4.0), row(2, 1, 2, 1, 5.0), row(3, 2, 1, 1, 3.0)]);
        let bars = top_books_by_mean(&t);
        assert_eq!(bars, vec![Bar::new("Book 1", 4.5), Bar::new("Book 2", 3.0)]);
    }

    #[test]
    fn test_top_books_ties_keep_first_seen_order() {
        let t = table(vec![
            row(1, 3, 1, 1, 4.0),
            row(2, 1, 1, 1, 4.0),
            row(3, 2, 1, 1, 5.0),
            row(4, 4, 1, 1, 4.0),
        ]);
        assert_eq!(labels(&top_books_by_mean(&t)), vec!["Book 2", "Book 3", "Book 1", "Book 4"]);
    }

    #[test]
    fn test_top_books_limited_to_ten() {
        let rows = (1..=15).map(|i| row(i, i, 1, 1, 3.0)).collect();
        assert_eq!(top_books_by_mean(&table(rows)).len(), TOP_N);
    }

    #[test]
    fn test_mean_by_genre_keeps_encounter_order() {
        let t = table(vec![row(1, 1, 1, 2, 2.0), row(2, 2, 1, 1, 5.0), row(3, 3, 1, 2, 4.0)]);
        let bars = mean_by_genre(&t);
        assert_eq!(bars, vec![Bar::new("Genre 2", 3.0), Bar::new("Genre 1", 5.0)]);
    }

    #[test]
    fn test_top_authors_counts_catalog_books() {
        let snapshot = Snapshot {
            books: vec![
                BookRow { id: 1, title: "a".into(), author_id: 1, genre_id: 1, release_date: None },
                BookRow { id: 2, title: "b".into(), author_id: 2, genre_id: 1, release_date: None },
                BookRow { id: 3, title: "c".into(), author_id: 2, genre_id: 1, release_date: None },
                BookRow { id: 4, title: "d".into(), author_id: 9, genre_id: 1, release_date: None },
            ],
            authors: vec![Author { id: 1, name: "One".into() }, Author { id: 2, name: "Two".into() }],
            ..Default::default()
        };
        let bars = top_authors_by_book_count(&snapshot);
        assert_eq!(bars, vec![Bar::new("Two", 2.0), Bar::new("One", 1.0)]);
    }

    #[test]
    fn test_most_rated_books_ascending_tail() {
        let mut rows = Vec::new();
        let mut id = 0;
        // Book n gets n ratings
        for book in 1..=12 {
            for user in 0..book {
                id += 1;
                rows.push(row(id, book, user, 1, 3.0));
            }
        }
        let bars = most_rated_books(&table(rows));
        assert_eq!(bars.len(), TOP_N);
        assert_eq!(bars.first().map(|b| b.value), Some(3.0));
        assert_eq!(bars.last().map(|b| b.label.as_str()), Some("Book 12"));
    }

    #[test]
    fn test_users_by_count_and_mean() {
        let t = table(vec![
            row(1, 1, 1, 1, 2.0),
            row(2, 2, 2, 1, 5.0),
            row(3, 3, 1, 1, 3.0),
        ]);
        assert_eq!(
            top_users_by_count(&t),
            vec![Bar::new("user1", 2.0), Bar::new("user2", 1.0)]
        );
        assert_eq!(
            top_users_by_mean(&t),
            vec![Bar::new("user2", 5.0), Bar::new("user1", 2.5)]
        );
    }

    #[test]
    fn test_mean_by_year() {
        let mut rows = vec![row(1, 1, 1, 1, 4.0), row(2, 2, 1, 1, 2.0), row(3, 3, 1, 1, 5.0)];
        rows[0].release_date = Some("2001-03-04".into());
        rows[1].release_date = Some("1990-01-01".into());
        rows[2].release_date = Some("".into());
        let points = mean_by_year(&table(rows)).unwrap();
        assert_eq!(points, vec![(1990, 2.0), (2001, 4.0)]);
    }

    #[test]
    fn test_mean_by_year_rejects_garbage() {
        let mut rows = vec![row(1, 7, 1, 1, 4.0)];
        rows[0].release_date = Some("last tuesday".into());
        match mean_by_year(&table(rows)) {
            Err(ReportError::InvalidDate { book_id, value }) => {
                assert_eq!(book_id, 7);
                assert_eq!(value, "last tuesday");
            }
            other => panic!("expected InvalidDate, got {:?}", other),
        }
    }

    #[test]
    fn test_year_view_skipped_without_dates() {
        let t = table(vec![row(1, 1, 1, 1, 4.0)]);
        let chart = compute(ViewKind::AverageByYear, &Snapshot::default(), &t).unwrap();
        assert!(chart.is_none());
    }

    #[test]
    fn test_genre_share_percentages() {
        let t = table(vec![
            row(1, 1, 1, 1, 4.0),
            row(2, 2, 1, 2, 4.0),
            row(3, 3, 1, 2, 4.0),
            row(4, 4, 1, 2, 4.0),
            row(5, 5, 1, 1, 4.0),
            row(6, 6, 1, 3, 4.0),
            row(7, 7, 1, 2, 4.0),
        ]);
        let slices = genre_share(&t);
        let summary: Vec<(&str, usize, &str)> = slices
            .iter()
            .map(|s| (s.label.as_str(), s.count, s.percent.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Genre 2", 4, "57.1%"),
                ("Genre 1", 2, "28.6%"),
                ("Genre 3", 1, "14.3%"),
            ]
        );
    }

    #[test]
    fn test_correlation_single_book() {
        let mut rows = vec![row(1, 1, 1, 1, 4.0), row(2, 1, 2, 1, 5.0)];
        rows[0].release_date = Some("1999-01-01".into());
        rows[1].release_date = Some("1999-01-01".into());
        let (labels, matrix) = correlation_matrix(&table(rows)).unwrap();

        assert_eq!(labels.len(), 3);
        for i in 0..3 {
            for j in 0..3 {
                if i == j {
                    assert_eq!(matrix[i][j], 1.0);
                } else {
                    assert!(matrix[i][j].is_nan());
                }
            }
        }
    }

    #[test]
    fn test_correlation_mean_vs_count() {
        // More ratings go with higher means
        let t = table(vec![
            row(1, 1, 1, 1, 1.0),
            row(2, 2, 1, 1, 3.0),
            row(3, 2, 2, 1, 3.0),
            row(4, 3, 1, 1, 5.0),
            row(5, 3, 2, 1, 5.0),
            row(6, 3, 3, 1, 5.0),
        ]);
        let (_, matrix) = correlation_matrix(&t).unwrap();
        assert!((matrix[0][1] - 1.0).abs() < 1e-12);
        // No publication years at all
        assert!(matrix[0][2].is_nan());
        assert!(matrix[1][2].is_nan());
    }

    #[test]
    fn test_histogram_total_matches_rows() {
        let t = table(vec![row(1, 1, 1, 1, 1.0), row(2, 2, 1, 1, 2.5), row(3, 3, 1, 1, 5.0)]);
        match score_histogram(&t) {
            Chart::Histogram { histogram, density, .. } => {
                assert_eq!(histogram.total(), 3);
                assert_eq!(density.map(|d| d.len()), Some(KDE_POINTS));
            }
            other => panic!("expected histogram, got {:?}", other),
        }
    }
}
