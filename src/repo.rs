use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Allowed sort fields for the movie collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieSortField {
    Title,
    Year,
}

/// Allowed sort fields for the user collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    Name,
    Email,
}

#[derive(Debug, Clone, Copy)]
pub struct MovieSort {
    pub field: MovieSortField,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy)]
pub struct UserSort {
    pub field: UserSortField,
    pub order: SortOrder,
}

/// Exact-match year plus genre membership, both optional.
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    pub genre: Option<String>,
    pub year: Option<i32>,
}

/// Case-insensitive substring match on email.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub email: Option<String>,
}

#[async_trait]
pub trait MovieRepo: Send + Sync {
    async fn count_movies(&self, filter: &MovieFilter) -> RepoResult<u64>;
    async fn list_movies(
        &self,
        filter: &MovieFilter,
        sort: MovieSort,
        skip: usize,
        limit: usize,
    ) -> RepoResult<Vec<Movie>>;
    async fn get_movie(&self, id: Id) -> RepoResult<Movie>;
    async fn insert_movie(&self, new: NewMovie) -> RepoResult<Movie>;
    async fn update_movie(&self, id: Id, upd: UpdateMovie) -> RepoResult<()>;
    /// Returns whether a record was actually removed.
    async fn delete_movie(&self, id: Id) -> RepoResult<bool>;
    /// Full collection scan for the reporting pipelines.
    async fn all_movies(&self) -> RepoResult<Vec<Movie>>;
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn count_users(&self, filter: &UserFilter) -> RepoResult<u64>;
    async fn list_users(
        &self,
        filter: &UserFilter,
        sort: UserSort,
        skip: usize,
        limit: usize,
    ) -> RepoResult<Vec<User>>;
    async fn get_user(&self, id: Id) -> RepoResult<User>;
    async fn insert_user(&self, new: NewUser) -> RepoResult<User>;
    async fn update_user(&self, id: Id, upd: UpdateUser) -> RepoResult<()>;
    async fn delete_user(&self, id: Id) -> RepoResult<bool>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn insert_comment(&self, new: NewComment) -> RepoResult<Comment>;
    /// Fetch comments by id, in the given order; missing ids are skipped.
    async fn get_comments(&self, ids: &[Id]) -> RepoResult<Vec<Comment>>;
    async fn all_comments(&self) -> RepoResult<Vec<Comment>>;
    /// Null out the movie reference on every comment pointing at `movie_id`.
    /// Returns the number of comments touched.
    async fn detach_comments_from_movie(&self, movie_id: Id) -> RepoResult<u64>;
    async fn detach_comments_from_user(&self, user_id: Id) -> RepoResult<u64>;
}

pub trait Repo: MovieRepo + UserRepo + CommentRepo {}

impl<T> Repo for T where T: MovieRepo + UserRepo + CommentRepo {}

pub mod inmem {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::path::{Path, PathBuf};
    use uuid::Uuid;

    const SNAPSHOT_PATH: &str = "data/state.json";

    #[derive(Default, Serialize, Deserialize)]
    struct State {
        movies: HashMap<Id, Movie>,
        users: HashMap<Id, User>,
        comments: HashMap<Id, Comment>,
    }

    #[derive(Clone)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
        snapshot_path: Arc<PathBuf>,
    }

    impl InMemRepo {
        fn snapshot_path() -> PathBuf {
            match std::env::var("MFLIX_DATA_DIR") {
                Ok(dir) => {
                    let mut p = PathBuf::from(dir);
                    p.push("state.json");
                    p
                }
                Err(_) => PathBuf::from(SNAPSHOT_PATH),
            }
        }

        fn load_state_from(path: &Path) -> State {
            match std::fs::read(path) {
                Ok(bytes) => match serde_json::from_slice::<State>(&bytes) {
                    Ok(s) => {
                        log::info!("loaded snapshot '{}'", path.display());
                        s
                    }
                    Err(e) => {
                        log::warn!(
                            "failed to parse snapshot '{}': {e}. Starting empty.",
                            path.display()
                        );
                        State::default()
                    }
                },
                Err(_) => State::default(),
            }
        }

        // Called after every mutation, never while holding the lock.
        fn persist(&self) {
            let path = self.snapshot_path.clone();
            if let Ok(s) = serde_json::to_vec_pretty(&*self.state.read().unwrap()) {
                if let Some(dir) = path.parent() {
                    let _ = std::fs::create_dir_all(dir);
                }
                if let Err(e) = std::fs::write(&*path, s) {
                    log::error!("failed to write snapshot '{}': {e}", path.display());
                }
            }
        }

        pub fn new() -> Self {
            let snapshot_path = Self::snapshot_path();
            let state = Self::load_state_from(&snapshot_path);
            Self {
                state: Arc::new(RwLock::new(state)),
                snapshot_path: Arc::new(snapshot_path),
            }
        }
    }

    impl Default for InMemRepo {
        fn default() -> Self {
            Self::new()
        }
    }

    fn matches_movie(m: &Movie, f: &MovieFilter) -> bool {
        if let Some(ref genre) = f.genre {
            if !m.genres.iter().any(|g| g == genre) {
                return false;
            }
        }
        if let Some(year) = f.year {
            if m.year != Some(year) {
                return false;
            }
        }
        true
    }

    fn matches_user(u: &User, f: &UserFilter) -> bool {
        if let Some(ref email) = f.email {
            if !u.email.to_lowercase().contains(&email.to_lowercase()) {
                return false;
            }
        }
        true
    }

    fn sort_movies(v: &mut [Movie], sort: MovieSort) {
        v.sort_by(|a, b| {
            let ord = match sort.field {
                MovieSortField::Title => a.title.cmp(&b.title),
                // absent year sorts first ascending
                MovieSortField::Year => a.year.cmp(&b.year),
            };
            match sort.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }

    fn sort_users(v: &mut [User], sort: UserSort) {
        v.sort_by(|a, b| {
            let ord = match sort.field {
                UserSortField::Name => a.name.cmp(&b.name),
                UserSortField::Email => a.email.cmp(&b.email),
            };
            match sort.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }

    #[async_trait]
    impl MovieRepo for InMemRepo {
        async fn count_movies(&self, filter: &MovieFilter) -> RepoResult<u64> {
            let s = self.state.read().unwrap();
            Ok(s.movies.values().filter(|m| matches_movie(m, filter)).count() as u64)
        }

        async fn list_movies(
            &self,
            filter: &MovieFilter,
            sort: MovieSort,
            skip: usize,
            limit: usize,
        ) -> RepoResult<Vec<Movie>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<Movie> = s
                .movies
                .values()
                .filter(|m| matches_movie(m, filter))
                .cloned()
                .collect();
            sort_movies(&mut v, sort);
            Ok(v.into_iter().skip(skip).take(limit).collect())
        }

        async fn get_movie(&self, id: Id) -> RepoResult<Movie> {
            let s = self.state.read().unwrap();
            s.movies.get(&id).cloned().ok_or(RepoError::NotFound)
        }

        async fn insert_movie(&self, new: NewMovie) -> RepoResult<Movie> {
            let movie = new.into_movie(Uuid::new_v4());
            let mut s = self.state.write().unwrap();
            s.movies.insert(movie.id, movie.clone());
            drop(s);
            self.persist();
            Ok(movie)
        }

        async fn update_movie(&self, id: Id, upd: UpdateMovie) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            let movie = s.movies.get_mut(&id).ok_or(RepoError::NotFound)?;
            upd.apply(movie);
            drop(s);
            self.persist();
            Ok(())
        }

        async fn delete_movie(&self, id: Id) -> RepoResult<bool> {
            let mut s = self.state.write().unwrap();
            let removed = s.movies.remove(&id).is_some();
            drop(s);
            if removed {
                self.persist();
            }
            Ok(removed)
        }

        async fn all_movies(&self) -> RepoResult<Vec<Movie>> {
            let s = self.state.read().unwrap();
            Ok(s.movies.values().cloned().collect())
        }
    }

    #[async_trait]
    impl UserRepo for InMemRepo {
        async fn count_users(&self, filter: &UserFilter) -> RepoResult<u64> {
            let s = self.state.read().unwrap();
            Ok(s.users.values().filter(|u| matches_user(u, filter)).count() as u64)
        }

        async fn list_users(
            &self,
            filter: &UserFilter,
            sort: UserSort,
            skip: usize,
            limit: usize,
        ) -> RepoResult<Vec<User>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<User> = s
                .users
                .values()
                .filter(|u| matches_user(u, filter))
                .cloned()
                .collect();
            sort_users(&mut v, sort);
            Ok(v.into_iter().skip(skip).take(limit).collect())
        }

        async fn get_user(&self, id: Id) -> RepoResult<User> {
            let s = self.state.read().unwrap();
            s.users.get(&id).cloned().ok_or(RepoError::NotFound)
        }

        async fn insert_user(&self, new: NewUser) -> RepoResult<User> {
            let mut s = self.state.write().unwrap();
            if s.users.values().any(|u| u.email == new.email) {
                return Err(RepoError::Conflict("Email already in use".into()));
            }
            let user = User {
                id: Uuid::new_v4(),
                name: new.name,
                email: new.email,
                password: new.password,
                comments: Vec::new(),
            };
            s.users.insert(user.id, user.clone());
            drop(s);
            self.persist();
            Ok(user)
        }

        async fn update_user(&self, id: Id, upd: UpdateUser) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            // uniqueness check before taking the mutable borrow
            if let Some(ref email) = upd.email {
                if s.users.values().any(|u| u.email == *email && u.id != id) {
                    return Err(RepoError::Conflict("Email already in use".into()));
                }
            }
            let user = s.users.get_mut(&id).ok_or(RepoError::NotFound)?;
            upd.apply(user);
            drop(s);
            self.persist();
            Ok(())
        }

        async fn delete_user(&self, id: Id) -> RepoResult<bool> {
            let mut s = self.state.write().unwrap();
            let removed = s.users.remove(&id).is_some();
            drop(s);
            if removed {
                self.persist();
            }
            Ok(removed)
        }
    }

    #[async_trait]
    impl CommentRepo for InMemRepo {
        async fn insert_comment(&self, new: NewComment) -> RepoResult<Comment> {
            let mut s = self.state.write().unwrap();
            if !s.movies.contains_key(&new.movie) || !s.users.contains_key(&new.user) {
                return Err(RepoError::NotFound);
            }
            let comment = Comment {
                id: Uuid::new_v4(),
                text: new.text,
                date: new.date,
                movie: Some(new.movie),
                user: Some(new.user),
            };
            s.comments.insert(comment.id, comment.clone());
            // maintain back-references on both parents
            if let Some(m) = s.movies.get_mut(&new.movie) {
                m.comments.push(comment.id);
            }
            if let Some(u) = s.users.get_mut(&new.user) {
                u.comments.push(comment.id);
            }
            drop(s);
            self.persist();
            Ok(comment)
        }

        async fn get_comments(&self, ids: &[Id]) -> RepoResult<Vec<Comment>> {
            let s = self.state.read().unwrap();
            Ok(ids.iter().filter_map(|id| s.comments.get(id).cloned()).collect())
        }

        async fn all_comments(&self) -> RepoResult<Vec<Comment>> {
            let s = self.state.read().unwrap();
            Ok(s.comments.values().cloned().collect())
        }

        async fn detach_comments_from_movie(&self, movie_id: Id) -> RepoResult<u64> {
            let mut s = self.state.write().unwrap();
            let mut touched = 0u64;
            for c in s.comments.values_mut() {
                if c.movie == Some(movie_id) {
                    c.movie = None;
                    touched += 1;
                }
            }
            drop(s);
            if touched > 0 {
                self.persist();
            }
            Ok(touched)
        }

        async fn detach_comments_from_user(&self, user_id: Id) -> RepoResult<u64> {
            let mut s = self.state.write().unwrap();
            let mut touched = 0u64;
            for c in s.comments.values_mut() {
                if c.user == Some(user_id) {
                    c.user = None;
                    touched += 1;
                }
            }
            drop(s);
            if touched > 0 {
                self.persist();
            }
            Ok(touched)
        }
    }
}
