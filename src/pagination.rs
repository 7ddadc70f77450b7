//! Turns raw page/limit/sort/filter query parameters into validated query
//! specs and wraps results in the response envelope. All validation happens
//! here, before any store access.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::models::{Movie, User};
use crate::repo::{
    MovieFilter, MovieSort, MovieSortField, SortOrder, UserFilter, UserSort, UserSortField,
};

/// Raw query parameters for `GET /v1/movie`. Numeric fields arrive as
/// strings so that non-numeric junk falls back to defaults instead of
/// failing deserialization.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovieListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// `"<field>:<asc|desc>"`, field one of `title`, `year`.
    pub sort: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
}

/// Raw query parameters for `GET /v1/user`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// `"<field>:<asc|desc>"`, field one of `name`, `email`.
    pub sort: Option<String>,
    pub email: Option<String>,
}

/// Validated paging window.
#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub page: i64,
    pub limit: i64,
    pub skip: usize,
}

impl PageSpec {
    pub fn total_pages(&self, total: u64) -> u64 {
        let limit = self.limit as u64;
        (total + limit - 1) / limit
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|v| !v.is_empty())
}

/// parseInt-style lenient integer: optional sign, then leading digits;
/// trailing junk is ignored ("3abc" is 3). No digits at all is None.
fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = rest
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<i64>().ok().map(|v| sign * v)
}

pub fn page_spec(page: &Option<String>, limit: &Option<String>) -> Result<PageSpec, ApiError> {
    // non-numeric input falls back to the default, same as parseInt-or-default
    let page = non_empty(page).and_then(parse_int_prefix).unwrap_or(1);
    let limit = non_empty(limit).and_then(parse_int_prefix).unwrap_or(10);
    if page < 1 || limit < 1 {
        return Err(ApiError::bad_request("Page and limit must be positive numbers"));
    }
    // an offset past any real collection just yields an empty page
    let skip = (page - 1)
        .checked_mul(limit)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(usize::MAX);
    Ok(PageSpec { page, limit, skip })
}

fn split_sort<'a>(raw: Option<&'a str>, default_field: &'a str) -> (&'a str, SortOrder) {
    match raw {
        Some(s) => {
            let mut parts = s.split(':');
            let field = parts.next().unwrap_or(default_field);
            // only the exact string "desc" flips the order
            let order = if parts.next() == Some("desc") {
                SortOrder::Desc
            } else {
                SortOrder::Asc
            };
            (field, order)
        }
        None => (default_field, SortOrder::Asc),
    }
}

pub fn movie_sort(raw: &Option<String>) -> Result<MovieSort, ApiError> {
    let (field, order) = split_sort(non_empty(raw), "title");
    let field = match field {
        "title" => MovieSortField::Title,
        "year" => MovieSortField::Year,
        _ => return Err(ApiError::bad_request("Invalid sort field. Use 'title' or 'year'")),
    };
    Ok(MovieSort { field, order })
}

pub fn user_sort(raw: &Option<String>) -> Result<UserSort, ApiError> {
    let (field, order) = split_sort(non_empty(raw), "name");
    let field = match field {
        "name" => UserSortField::Name,
        "email" => UserSortField::Email,
        _ => return Err(ApiError::bad_request("Invalid sort field. Use 'name' or 'email'")),
    };
    Ok(UserSort { field, order })
}

pub fn movie_filter(query: &MovieListQuery) -> Result<MovieFilter, ApiError> {
    let year = match non_empty(&query.year) {
        Some(raw) => Some(
            parse_int_prefix(raw)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| ApiError::bad_request("Year must be a valid number"))?,
        ),
        None => None,
    };
    Ok(MovieFilter {
        genre: non_empty(&query.genre).map(str::to_owned),
        year,
    })
}

pub fn user_filter(query: &UserListQuery) -> UserFilter {
    UserFilter {
        email: non_empty(&query.email).map(str::to_owned),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MoviePageMeta {
    #[serde(rename = "totalMovies")]
    pub total_movies: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    pub limit: i64,
}

/// Response envelope for the movie list endpoint. `totalMovies` is counted
/// under the same filter as the returned page, not the whole collection.
#[derive(Debug, Serialize, ToSchema)]
pub struct MoviePage {
    pub data: Vec<Movie>,
    pub pagination: MoviePageMeta,
}

impl MoviePage {
    pub fn new(data: Vec<Movie>, total: u64, spec: &PageSpec) -> Self {
        Self {
            data,
            pagination: MoviePageMeta {
                total_movies: total,
                total_pages: spec.total_pages(total),
                current_page: spec.page,
                limit: spec.limit,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPageMeta {
    #[serde(rename = "totalUsers")]
    pub total_users: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPage {
    pub data: Vec<User>,
    pub pagination: UserPageMeta,
}

impl UserPage {
    pub fn new(data: Vec<User>, total: u64, spec: &PageSpec) -> Self {
        Self {
            data,
            pagination: UserPageMeta {
                total_users: total,
                total_pages: spec.total_pages(total),
                current_page: spec.page,
                limit: spec.limit,
            },
        }
    }
}
