//! The reporting pipelines behind the `/v1/movie/*` analytics endpoints.
//!
//! Each report is a pure function over loaded record sets: filter, group by
//! key with accumulators, optionally join a second grouping, derive, sort,
//! limit, reshape. Nothing is cached; every call recomputes from the slices
//! it is given.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Comment, Movie};

/// Top-N reports never return more than this many groups.
pub const TOP_N: usize = 10;

/// Round half up to two decimal places.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Running average that skips absent values, like `$avg` over nulls.
/// An accumulator that saw no values reports 0, never NaN.
#[derive(Debug, Default)]
struct Avg {
    sum: f64,
    n: u64,
}

impl Avg {
    fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v {
            self.sum += v;
            self.n += 1;
        }
    }

    fn rounded(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            round2(self.sum / self.n as f64)
        }
    }
}

#[derive(Debug, Default)]
struct GroupAcc {
    count: u64,
    imdb: Avg,
    viewer: Avg,
}

/// Explode one list-valued field across all movies and group by its
/// elements. Returned groups are sorted by count descending, alphabetical
/// on the key within equal counts (the deterministic tie-break), and
/// truncated to [`TOP_N`]. A movie with an empty list contributes no rows.
fn top_groups<F>(movies: &[Movie], field: F) -> Vec<(String, GroupAcc)>
where
    F: Fn(&Movie) -> &[String],
{
    let mut groups: BTreeMap<String, GroupAcc> = BTreeMap::new();
    for movie in movies {
        for key in field(movie) {
            let acc = groups.entry(key.clone()).or_default();
            acc.count += 1;
            acc.imdb.push(movie.imdb_rating());
            acc.viewer.push(movie.viewer_rating());
        }
    }
    // stable sort keeps the BTreeMap's alphabetical order within ties
    let mut ranked: Vec<_> = groups.into_iter().collect();
    ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    ranked.truncate(TOP_N);
    ranked
}

// ---------------------------------------------------------------------------
// Runtime impact
// ---------------------------------------------------------------------------

/// Fixed runtime bands in minutes, min inclusive, max exclusive.
const RUNTIME_BANDS: [(&str, i64, Option<i64>); 8] = [
    ("0 - 60 mins", 0, Some(60)),
    ("60 - 90 mins", 60, Some(90)),
    ("90 - 120 mins", 90, Some(120)),
    ("120 - 150 mins", 120, Some(150)),
    ("150 - 180 mins", 150, Some(180)),
    ("180 - 210 mins", 180, Some(210)),
    ("210 - 240 mins", 210, Some(240)),
    ("240 - Max mins", 240, None),
];

#[derive(Debug, Serialize, ToSchema)]
pub struct RuntimeBand {
    #[serde(rename = "runtimeRange")]
    pub runtime_range: String,
    #[serde(rename = "totalMovies")]
    pub total_movies: u64,
    #[serde(rename = "avgImdbRating")]
    pub avg_imdb_rating: f64,
    #[serde(rename = "avgTomatoesViewerRating")]
    pub avg_tomatoes_viewer_rating: f64,
}

fn band_index(runtime: i64) -> Option<usize> {
    RUNTIME_BANDS
        .iter()
        .position(|&(_, min, max)| runtime >= min && max.map_or(true, |max| runtime < max))
}

/// Quality by runtime band. Only movies with a runtime, an IMDb rating and
/// a viewer rating qualify; empty bands report zero counts and zero
/// averages. Always returns all 8 bands in fixed order.
pub fn runtime_impact(movies: &[Movie]) -> Vec<RuntimeBand> {
    let mut accs: [GroupAcc; 8] = std::array::from_fn(|_| GroupAcc::default());
    for movie in movies {
        let (runtime, imdb, viewer) =
            match (movie.runtime, movie.imdb_rating(), movie.viewer_rating()) {
                (Some(r), Some(i), Some(v)) => (r, i, v),
                _ => continue,
            };
        if let Some(idx) = band_index(runtime) {
            let acc = &mut accs[idx];
            acc.count += 1;
            acc.imdb.push(Some(imdb));
            acc.viewer.push(Some(viewer));
        }
    }
    RUNTIME_BANDS
        .iter()
        .zip(accs.iter())
        .map(|(&(range, _, _), acc)| RuntimeBand {
            runtime_range: range.to_string(),
            total_movies: acc.count,
            avg_imdb_rating: acc.imdb.rounded(),
            avg_tomatoes_viewer_rating: acc.viewer.rounded(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Top-N breakdowns
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct TopActor {
    pub actor: String,
    #[serde(rename = "totalMovies")]
    pub total_movies: u64,
    #[serde(rename = "avgImdbRating")]
    pub avg_imdb_rating: f64,
    #[serde(rename = "avgTomatoesViewerRating")]
    pub avg_tomatoes_viewer_rating: f64,
}

pub fn top_actors(movies: &[Movie]) -> Vec<TopActor> {
    top_groups(movies, |m| &m.cast)
        .into_iter()
        .map(|(actor, acc)| TopActor {
            actor,
            total_movies: acc.count,
            avg_imdb_rating: acc.imdb.rounded(),
            avg_tomatoes_viewer_rating: acc.viewer.rounded(),
        })
        .collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopDirector {
    pub director: String,
    #[serde(rename = "totalMovies")]
    pub total_movies: u64,
    #[serde(rename = "avgImdbRating")]
    pub avg_imdb_rating: f64,
    #[serde(rename = "avgTomatoesViewerRating")]
    pub avg_tomatoes_viewer_rating: f64,
}

pub fn top_directors(movies: &[Movie]) -> Vec<TopDirector> {
    top_groups(movies, |m| &m.directors)
        .into_iter()
        .map(|(director, acc)| TopDirector {
            director,
            total_movies: acc.count,
            avg_imdb_rating: acc.imdb.rounded(),
            avg_tomatoes_viewer_rating: acc.viewer.rounded(),
        })
        .collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopCountry {
    pub country: String,
    #[serde(rename = "totalMovies")]
    pub total_movies: u64,
    #[serde(rename = "avgImdbRating")]
    pub avg_imdb_rating: f64,
}

pub fn top_countries(movies: &[Movie]) -> Vec<TopCountry> {
    top_groups(movies, |m| &m.countries)
        .into_iter()
        .map(|(country, acc)| TopCountry {
            country,
            total_movies: acc.count,
            avg_imdb_rating: acc.imdb.rounded(),
        })
        .collect()
}

/// The genre report keeps the grouped identity under `_id` on the wire,
/// unlike the other breakdowns which rename it. Kept for compatibility
/// with the existing consumers of this endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct TopGenre {
    #[serde(rename = "_id")]
    pub genre: String,
    #[serde(rename = "totalMovies")]
    pub total_movies: u64,
    #[serde(rename = "avgImdbRating")]
    pub avg_imdb_rating: f64,
    #[serde(rename = "avgTomatoesViewerRating")]
    pub avg_tomatoes_viewer_rating: f64,
}

pub fn top_genres(movies: &[Movie]) -> Vec<TopGenre> {
    top_groups(movies, |m| &m.genres)
        .into_iter()
        .map(|(genre, acc)| TopGenre {
            genre,
            total_movies: acc.count,
            avg_imdb_rating: acc.imdb.rounded(),
            avg_tomatoes_viewer_rating: acc.viewer.rounded(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Monthly stats
// ---------------------------------------------------------------------------

// 1-indexed by calendar month number; index 0 unused.
const MONTH_NAMES: [&str; 13] = [
    "",
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyStat {
    pub month: u32,
    #[serde(rename = "totalMoviesReleased")]
    pub total_movies_released: u64,
    #[serde(rename = "totalCommentsOverall")]
    pub total_comments_overall: u64,
    #[serde(rename = "avgImdbRating")]
    pub avg_imdb_rating: f64,
    #[serde(rename = "avgTomatoesViewerRating")]
    pub avg_tomatoes_viewer_rating: f64,
    #[serde(rename = "avgCommentsPerMovie")]
    pub avg_comments_per_movie: f64,
    #[serde(rename = "monthName")]
    pub month_name: String,
}

/// Release and comment volume by calendar month. Movies with a release
/// date are grouped by its month; comment counts are grouped from the
/// comments collection independently and left-joined by month number,
/// anchored on the release months. Months that saw releases but no
/// comments report zero, and a month with zero movies derives an average
/// of 0 instead of dividing by zero. Sorted ascending by month.
pub fn monthly_stats(movies: &[Movie], comments: &[Comment]) -> Vec<MonthlyStat> {
    let mut months: BTreeMap<u32, GroupAcc> = BTreeMap::new();
    for movie in movies {
        if let Some(released) = movie.released {
            let acc = months.entry(released.month()).or_default();
            acc.count += 1;
            acc.imdb.push(movie.imdb_rating());
            acc.viewer.push(movie.viewer_rating());
        }
    }

    let mut comments_by_month: HashMap<u32, u64> = HashMap::new();
    for comment in comments {
        *comments_by_month.entry(comment.date.month()).or_insert(0) += 1;
    }

    months
        .into_iter()
        .map(|(month, acc)| {
            let total_comments = comments_by_month.get(&month).copied().unwrap_or(0);
            let avg_comments_per_movie = if acc.count == 0 {
                0.0
            } else {
                round2(total_comments as f64 / acc.count as f64)
            };
            MonthlyStat {
                month,
                total_movies_released: acc.count,
                total_comments_overall: total_comments,
                avg_imdb_rating: acc.imdb.rounded(),
                avg_tomatoes_viewer_rating: acc.viewer.rounded(),
                avg_comments_per_movie,
                month_name: MONTH_NAMES[month as usize].to_string(),
            }
        })
        .collect()
}
