//! Recommendation query: best-rated books of one genre

use std::cmp::Ordering;

use shelf_common::db::{genres, Genre};
use sqlx::{FromRow, SqlitePool};

use crate::ReportResult;

/// Rows shown in a recommendation
pub const MAX_RECOMMENDATIONS: usize = 10;

const TITLE_WIDTH: usize = 40;
const AVERAGE_WIDTH: usize = 8;
const RULE_WIDTH: usize = 48;

/// A book of the genre with its mean score, if it has any ratings
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RecommendedBook {
    pub book_id: i64,
    pub title: String,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    GenreNotFound { genre_id: i64 },
    NoBooks { genre: Genre },
    Ranked { genre: Genre, rows: Vec<RecommendedBook> },
}

/// Top books of a genre by mean score
pub async fn recommend(pool: &SqlitePool, genre_id: i64) -> ReportResult<Recommendation> {
    let Some(genre) = genres::find_genre(pool, genre_id).await? else {
        return Ok(Recommendation::GenreNotFound { genre_id });
    };

    let books = sqlx::query_as::<_, RecommendedBook>(
        r#"
        SELECT b.id AS book_id, b.title AS title, AVG(r.score) AS average
        FROM books b
        LEFT JOIN ratings r ON r.book_id = b.id
        WHERE b.genre_id = ?
        GROUP BY b.id, b.title
        ORDER BY b.id
        "#,
    )
    .bind(genre_id)
    .fetch_all(pool)
    .await?;

    if books.is_empty() {
        return Ok(Recommendation::NoBooks { genre });
    }

    Ok(Recommendation::Ranked {
        genre,
        rows: rank_books(books),
    })
}

/// Stable descending sort by mean, unrated books last, cut to the top ten
pub fn rank_books(mut books: Vec<RecommendedBook>) -> Vec<RecommendedBook> {
    books.sort_by(|a, b| match (a.average, b.average) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    books.truncate(MAX_RECOMMENDATIONS);
    books
}

/// Fixed-width text table; unrated books show `0.00`
pub fn format_table(rows: &[RecommendedBook]) -> String {
    let mut out = format!(
        "{:<tw$} {:>aw$}\n",
        "Title",
        "Average",
        tw = TITLE_WIDTH,
        aw = AVERAGE_WIDTH
    );
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    for row in rows {
        out.push_str(&format!(
            "{:<tw$} {:>aw$.2}\n",
            row.title,
            row.average.unwrap_or(0.0),
            tw = TITLE_WIDTH,
            aw = AVERAGE_WIDTH
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(book_id: i64, average: Option<f64>) -> RecommendedBook {
        RecommendedBook {
            book_id,
            title: format!("Book {}", book_id),
            average,
        }
    }

    #[test]
    fn test_rank_books_descending_with_unrated_last() {
        let ranked = rank_books(vec![
            book(1, None),
            book(2, Some(3.0)),
            book(3, Some(4.5)),
            book(4, Some(3.0)),
        ]);
        let ids: Vec<i64> = ranked.iter().map(|b| b.book_id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_rank_books_keeps_ten() {
        let books = (1..=12).map(|i| book(i, Some(i as f64 / 3.0))).collect();
        let ranked = rank_books(books);
        assert_eq!(ranked.len(), MAX_RECOMMENDATIONS);
        assert_eq!(ranked[0].book_id, 12);
    }

    #[test]
    fn test_format_table() {
        let table = format_table(&[book(1, Some(4.5)), book(2, None)]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("{:<40} {:>8}", "Title", "Average"));
        assert_eq!(lines[1], "-".repeat(48));
        assert_eq!(lines[2], format!("{:<40} {:>8}", "Book 1", "4.50"));
        assert_eq!(lines[3], format!("{:<40} {:>8}", "Book 2", "0.00"));
    }

    #[test]
    fn test_format_table_does_not_truncate_titles() {
        let mut long = book(1, Some(5.0));
        long.title = "T".repeat(50);
        let table = format_table(&[long]);
        assert!(table.contains(&format!("{} {:>8}", "T".repeat(50), "5.00")));
    }
}
