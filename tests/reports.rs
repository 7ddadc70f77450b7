use chrono::{TimeZone, Utc};
use mflix::models::*;
use mflix::reports;
use uuid::Uuid;

/// Bare movie with only a title; everything else absent.
fn movie(title: &str) -> Movie {
    Movie {
        id: Uuid::new_v4(),
        title: title.into(),
        year: None,
        released: None,
        runtime: None,
        genres: vec![],
        directors: vec![],
        writers: vec![],
        cast: vec![],
        plot: None,
        languages: vec![],
        countries: vec![],
        awards: None,
        poster: None,
        ratings: vec![],
        metascore: None,
        imdb: None,
        tomatoes: None,
        plot_embedding: vec![],
        kind: None,
        comments: vec![],
    }
}

fn with_ratings(mut m: Movie, imdb: f64, viewer: f64) -> Movie {
    m.imdb = Some(Imdb {
        rating: Some(imdb),
        ..Default::default()
    });
    m.tomatoes = Some(Tomatoes {
        viewer: Some(TomatoesScore {
            rating: Some(viewer),
            ..Default::default()
        }),
        ..Default::default()
    });
    m
}

fn rated(title: &str, runtime: i64, imdb: f64, viewer: f64) -> Movie {
    let mut m = with_ratings(movie(title), imdb, viewer);
    m.runtime = Some(runtime);
    m
}

fn comment_in_month(month: u32) -> Comment {
    Comment {
        id: Uuid::new_v4(),
        text: "a comment".into(),
        date: Utc.with_ymd_and_hms(2015, month, 10, 12, 0, 0).unwrap(),
        movie: None,
        user: None,
    }
}

#[test]
fn runtime_bands_are_min_inclusive_max_exclusive() {
    let movies = vec![
        rated("a", 59, 7.0, 3.0),
        rated("b", 60, 8.0, 4.0),
        rated("c", 240, 6.0, 2.0),
    ];
    let bands = reports::runtime_impact(&movies);
    assert_eq!(bands.len(), 8);

    assert_eq!(bands[0].runtime_range, "0 - 60 mins");
    assert_eq!(bands[0].total_movies, 1);
    // runtime exactly 60 lands in the second band, not the first
    assert_eq!(bands[1].runtime_range, "60 - 90 mins");
    assert_eq!(bands[1].total_movies, 1);
    assert_eq!(bands[1].avg_imdb_rating, 8.0);
    // 240 is the open-ended last band
    assert_eq!(bands[7].runtime_range, "240 - Max mins");
    assert_eq!(bands[7].total_movies, 1);
}

#[test]
fn runtime_empty_bands_report_zeros() {
    let bands = reports::runtime_impact(&[]);
    assert_eq!(bands.len(), 8);
    for band in &bands {
        assert_eq!(band.total_movies, 0);
        assert_eq!(band.avg_imdb_rating, 0.0);
        assert_eq!(band.avg_tomatoes_viewer_rating, 0.0);
    }
}

#[test]
fn runtime_requires_both_ratings() {
    // imdb rating but no viewer rating: excluded from the band entirely
    let mut half_rated = movie("half");
    half_rated.runtime = Some(100);
    half_rated.imdb = Some(Imdb {
        rating: Some(9.0),
        ..Default::default()
    });
    let movies = vec![half_rated, rated("full", 100, 7.0, 3.5)];
    let bands = reports::runtime_impact(&movies);
    assert_eq!(bands[2].total_movies, 1);
    assert_eq!(bands[2].avg_imdb_rating, 7.0);
}

#[test]
fn averages_round_half_up_to_two_decimals() {
    // 7.0 and 7.25 average to exactly 7.125, which must round up to 7.13
    let movies = vec![rated("a", 100, 7.0, 3.0), rated("b", 100, 7.25, 3.0)];
    let bands = reports::runtime_impact(&movies);
    assert_eq!(bands[2].avg_imdb_rating, 7.13);
}

#[test]
fn top_actors_sorted_by_count_then_name() {
    let mut a = with_ratings(movie("one"), 8.0, 4.0);
    a.cast = vec!["Bob".into(), "Zed".into(), "Ann".into()];
    let mut b = with_ratings(movie("two"), 6.0, 2.0);
    b.cast = vec!["Bob".into()];

    let top = reports::top_actors(&[a, b]);
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].actor, "Bob");
    assert_eq!(top[0].total_movies, 2);
    assert_eq!(top[0].avg_imdb_rating, 7.0);
    // equal counts fall back to alphabetical order
    assert_eq!(top[1].actor, "Ann");
    assert_eq!(top[2].actor, "Zed");
}

#[test]
fn top_reports_cap_at_ten() {
    let mut m = movie("ensemble");
    m.cast = (0..15).map(|i| format!("actor-{i:02}")).collect();
    let top = reports::top_actors(&[m]);
    assert_eq!(top.len(), 10);
    for pair in top.windows(2) {
        assert!(pair[0].total_movies >= pair[1].total_movies);
    }
}

#[test]
fn empty_list_field_excludes_movie_without_error() {
    let no_genres = movie("plain");
    let mut tagged = with_ratings(movie("tagged"), 8.0, 4.0);
    tagged.genres = vec!["Drama".into()];

    let top = reports::top_genres(&[no_genres, tagged]);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].genre, "Drama");
    assert_eq!(top[0].total_movies, 1);
}

#[test]
fn top_genres_keeps_raw_id_key_on_the_wire() {
    let mut m = movie("x");
    m.genres = vec!["Comedy".into()];
    let json = serde_json::to_value(reports::top_genres(&[m])).unwrap();
    assert_eq!(json[0]["_id"], "Comedy");
    assert!(json[0].get("genre").is_none());
}

#[test]
fn group_average_skips_unrated_rows() {
    // one rated, one unrated movie for the same country
    let mut rated_m = with_ratings(movie("a"), 8.0, 4.0);
    rated_m.countries = vec!["France".into()];
    let mut unrated = movie("b");
    unrated.countries = vec!["France".into()];

    let top = reports::top_countries(&[rated_m, unrated]);
    assert_eq!(top[0].total_movies, 2);
    assert_eq!(top[0].avg_imdb_rating, 8.0);
}

#[test]
fn group_with_no_rated_rows_reports_zero() {
    let mut unrated = movie("b");
    unrated.directors = vec!["Anon".into()];
    let top = reports::top_directors(&[unrated]);
    assert_eq!(top[0].avg_imdb_rating, 0.0);
    assert_eq!(top[0].avg_tomatoes_viewer_rating, 0.0);
}

#[test]
fn monthly_stats_joins_comments_by_month() {
    let mut movies = Vec::new();
    for i in 0..4 {
        let mut m = with_ratings(movie(&format!("jan-{i}")), 7.0, 3.0);
        m.released = Some(Utc.with_ymd_and_hms(2014, 1, 5 + i, 0, 0, 0).unwrap());
        movies.push(m);
    }
    let mut march = movie("march");
    march.released = Some(Utc.with_ymd_and_hms(2014, 3, 1, 0, 0, 0).unwrap());
    movies.push(march);
    // a movie without a release date is excluded from the report
    movies.push(movie("undated"));

    let comments: Vec<Comment> = (0..8).map(|_| comment_in_month(1)).collect();

    let stats = reports::monthly_stats(&movies, &comments);
    assert_eq!(stats.len(), 2);

    // sorted ascending by month number
    assert_eq!(stats[0].month, 1);
    assert_eq!(stats[0].month_name, "January");
    assert_eq!(stats[0].total_movies_released, 4);
    assert_eq!(stats[0].total_comments_overall, 8);
    assert_eq!(stats[0].avg_comments_per_movie, 2.0);

    // releases but no comments: zero, not null and not an error
    assert_eq!(stats[1].month, 3);
    assert_eq!(stats[1].month_name, "March");
    assert_eq!(stats[1].total_comments_overall, 0);
    assert_eq!(stats[1].avg_comments_per_movie, 0.0);
}

#[test]
fn monthly_stats_ignores_comment_only_months() {
    let mut jan = movie("jan");
    jan.released = Some(Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap());
    // comments in June, but no June releases: the join is anchored on
    // release months, so June does not appear
    let comments = vec![comment_in_month(6)];
    let stats = reports::monthly_stats(&[jan], &comments);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].month, 1);
}
