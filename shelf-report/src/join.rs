//! Denormalized rating table
//!
//! Rating → Book → User → Author → Genre, inner-join semantics: a rating is
//! kept only when every reference resolves. Dropped ratings are counted per
//! missing relation so the job can warn about them.

use std::collections::HashMap;
use tracing::warn;

use crate::snapshot::Snapshot;

/// One rating with everything the views need
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub rating_id: i64,
    pub book_id: i64,
    pub title: String,
    pub user_id: i64,
    pub username: String,
    pub author_id: i64,
    pub author_name: String,
    pub genre_id: i64,
    pub genre_name: String,
    pub release_date: Option<String>,
    pub score: f64,
}

/// Ratings dropped by the join, by the first relation that failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinReport {
    pub missing_book: usize,
    pub missing_user: usize,
    pub missing_author: usize,
    pub missing_genre: usize,
}

impl JoinReport {
    pub fn dropped(&self) -> usize {
        self.missing_book + self.missing_user + self.missing_author + self.missing_genre
    }

    /// Surface dropped ratings as a data-integrity warning
    pub fn log(&self) {
        if self.dropped() > 0 {
            warn!(
                "{} ratings excluded by unresolved references (book: {}, user: {}, author: {}, genre: {})",
                self.dropped(),
                self.missing_book,
                self.missing_user,
                self.missing_author,
                self.missing_genre
            );
        }
    }
}

/// Joined rows in rating order
#[derive(Debug, Clone, Default)]
pub struct JoinedTable {
    pub rows: Vec<JoinedRow>,
}

impl JoinedTable {
    pub fn from_snapshot(snapshot: &Snapshot) -> (Self, JoinReport) {
        let books: HashMap<i64, _> = snapshot.books.iter().map(|b| (b.id, b)).collect();
        let users: HashMap<i64, &str> = snapshot
            .users
            .iter()
            .map(|u| (u.id, u.username.as_str()))
            .collect();
        let authors: HashMap<i64, &str> = snapshot
            .authors
            .iter()
            .map(|a| (a.id, a.name.as_str()))
            .collect();
        let genres: HashMap<i64, &str> = snapshot
            .genres
            .iter()
            .map(|g| (g.id, g.name.as_str()))
            .collect();

        let mut report = JoinReport::default();
        let mut rows = Vec::with_capacity(snapshot.ratings.len());

        for rating in &snapshot.ratings {
            let Some(book) = books.get(&rating.book_id) else {
                report.missing_book += 1;
                continue;
            };
            let Some(username) = users.get(&rating.user_id) else {
                report.missing_user += 1;
                continue;
            };
            let Some(author_name) = authors.get(&book.author_id) else {
                report.missing_author += 1;
                continue;
            };
            let Some(genre_name) = genres.get(&book.genre_id) else {
                report.missing_genre += 1;
                continue;
            };

            rows.push(JoinedRow {
                rating_id: rating.id,
                book_id: book.id,
                title: book.title.clone(),
                user_id: rating.user_id,
                username: username.to_string(),
                author_id: book.author_id,
                author_name: author_name.to_string(),
                genre_id: book.genre_id,
                genre_name: genre_name.to_string(),
                release_date: book.release_date.clone(),
                score: rating.score,
            });
        }

        (Self { rows }, report)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.score).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::BookRow;
    use shelf_common::db::{Author, Genre, Rating, User};

    fn snapshot() -> Snapshot {
        Snapshot {
            ratings: vec![
                Rating { id: 1, book_id: 10, user_id: 100, score: 4.0 },
                Rating { id: 2, book_id: 99, user_id: 100, score: 2.0 }, // no such book
                Rating { id: 3, book_id: 10, user_id: 999, score: 3.0 }, // no such user
                Rating { id: 4, book_id: 11, user_id: 100, score: 5.0 }, // book has no author
                Rating { id: 5, book_id: 12, user_id: 100, score: 1.0 }, // book has no genre
                Rating { id: 6, book_id: 10, user_id: 101, score: 2.5 },
            ],
            books: vec![
                BookRow { id: 10, title: "Kept".into(), author_id: 1, genre_id: 1, release_date: None },
                BookRow { id: 11, title: "No author".into(), author_id: 7, genre_id: 1, release_date: None },
                BookRow { id: 12, title: "No genre".into(), author_id: 1, genre_id: 7, release_date: None },
            ],
            authors: vec![Author { id: 1, name: "A".into() }],
            genres: vec![Genre { id: 1, name: "G".into() }],
            users: vec![
                User { id: 100, username: "u100".into() },
                User { id: 101, username: "u101".into() },
            ],
        }
    }

    #[test]
    fn test_unresolved_references_dropped_and_counted() {
        let (table, report) = JoinedTable::from_snapshot(&snapshot());

        let ids: Vec<i64> = table.rows.iter().map(|r| r.rating_id).collect();
        assert_eq!(ids, vec![1, 6]);
        assert_eq!(
            report,
            JoinReport {
                missing_book: 1,
                missing_user: 1,
                missing_author: 1,
                missing_genre: 1,
            }
        );
        assert_eq!(report.dropped(), 4);
    }

    #[test]
    fn test_joined_row_carries_names() {
        let (table, _) = JoinedTable::from_snapshot(&snapshot());
        let row = &table.rows[1];
        assert_eq!(row.title, "Kept");
        assert_eq!(row.username, "u101");
        assert_eq!(row.author_name, "A");
        assert_eq!(row.genre_name, "G");
        assert_eq!(row.score, 2.5);
    }
}
