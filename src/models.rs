use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Record identifier, assigned by the store on insert.
pub type Id = Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Awards {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wins: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominations: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RatingEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Imdb {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TomatoesScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(rename = "numReviews", skip_serializing_if = "Option::is_none")]
    pub num_reviews: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Tomatoes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<TomatoesScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fresh: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critic: Option<TomatoesScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotten: Option<i64>,
    #[serde(rename = "lastUpdated", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A movie record from the mflix dataset. Only `title` is required; the
/// dataset is sparse, so everything else is optional or defaults empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Movie {
    pub id: Id,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released: Option<DateTime<Utc>>,
    /// Runtime in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub writers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cast: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub countries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awards: Option<Awards>,
    /// URL to the poster image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ratings: Vec<RatingEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metascore: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb: Option<Imdb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tomatoes: Option<Tomatoes>,
    /// Vector embedding of the plot, carried opaquely.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plot_embedding: Vec<f64>,
    /// "movie" or "series".
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Back-references to comments on this movie.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Id>,
}

impl Movie {
    pub fn imdb_rating(&self) -> Option<f64> {
        self.imdb.as_ref().and_then(|i| i.rating)
    }

    pub fn viewer_rating(&self) -> Option<f64> {
        self.tomatoes
            .as_ref()
            .and_then(|t| t.viewer.as_ref())
            .and_then(|v| v.rating)
    }
}

/// Payload for `POST /v1/movie`: a full movie minus the server-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewMovie {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub writers: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awards: Option<Awards>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default)]
    pub ratings: Vec<RatingEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metascore: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb: Option<Imdb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tomatoes: Option<Tomatoes>,
    #[serde(default)]
    pub plot_embedding: Vec<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl NewMovie {
    pub fn into_movie(self, id: Id) -> Movie {
        Movie {
            id,
            title: self.title,
            year: self.year,
            released: self.released,
            runtime: self.runtime,
            genres: self.genres,
            directors: self.directors,
            writers: self.writers,
            cast: self.cast,
            plot: self.plot,
            languages: self.languages,
            countries: self.countries,
            awards: self.awards,
            poster: self.poster,
            ratings: self.ratings,
            metascore: self.metascore,
            imdb: self.imdb,
            tomatoes: self.tomatoes,
            plot_embedding: self.plot_embedding,
            kind: self.kind,
            comments: Vec::new(),
        }
    }
}

/// Payload for `PUT /v1/movie/{id}`: merge semantics, only present fields
/// overwrite the stored record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMovie {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub released: Option<DateTime<Utc>>,
    pub runtime: Option<i64>,
    pub genres: Option<Vec<String>>,
    pub directors: Option<Vec<String>>,
    pub writers: Option<Vec<String>>,
    pub cast: Option<Vec<String>>,
    pub plot: Option<String>,
    pub languages: Option<Vec<String>>,
    pub countries: Option<Vec<String>>,
    pub awards: Option<Awards>,
    pub poster: Option<String>,
    pub ratings: Option<Vec<RatingEntry>>,
    pub metascore: Option<i32>,
    pub imdb: Option<Imdb>,
    pub tomatoes: Option<Tomatoes>,
    pub plot_embedding: Option<Vec<f64>>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl UpdateMovie {
    pub fn apply(self, movie: &mut Movie) {
        if let Some(title) = self.title {
            movie.title = title;
        }
        if let Some(year) = self.year {
            movie.year = Some(year);
        }
        if let Some(released) = self.released {
            movie.released = Some(released);
        }
        if let Some(runtime) = self.runtime {
            movie.runtime = Some(runtime);
        }
        if let Some(genres) = self.genres {
            movie.genres = genres;
        }
        if let Some(directors) = self.directors {
            movie.directors = directors;
        }
        if let Some(writers) = self.writers {
            movie.writers = writers;
        }
        if let Some(cast) = self.cast {
            movie.cast = cast;
        }
        if let Some(plot) = self.plot {
            movie.plot = Some(plot);
        }
        if let Some(languages) = self.languages {
            movie.languages = languages;
        }
        if let Some(countries) = self.countries {
            movie.countries = countries;
        }
        if let Some(awards) = self.awards {
            movie.awards = Some(awards);
        }
        if let Some(poster) = self.poster {
            movie.poster = Some(poster);
        }
        if let Some(ratings) = self.ratings {
            movie.ratings = ratings;
        }
        if let Some(metascore) = self.metascore {
            movie.metascore = Some(metascore);
        }
        if let Some(imdb) = self.imdb {
            movie.imdb = Some(imdb);
        }
        if let Some(tomatoes) = self.tomatoes {
            movie.tomatoes = Some(tomatoes);
        }
        if let Some(plot_embedding) = self.plot_embedding {
            movie.plot_embedding = plot_embedding;
        }
        if let Some(kind) = self.kind {
            movie.kind = Some(kind);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Id>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
    }
}

/// A user comment on a movie. The movie/user references are required at
/// creation and become null only when the referenced record is deleted;
/// a nulled reference is never re-populated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: Id,
    pub text: String,
    pub date: DateTime<Utc>,
    pub movie: Option<Id>,
    pub user: Option<Id>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewComment {
    pub text: String,
    pub date: DateTime<Utc>,
    pub movie: Id,
    pub user: Id,
}
