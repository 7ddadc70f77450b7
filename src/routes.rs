use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::integrity;
use crate::models::*;
use crate::pagination::{
    self, MovieListQuery, MoviePage, UserListQuery, UserPage,
};
use crate::repo::{Repo, RepoError};
use crate::reports;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .service(
                web::resource("/movie")
                    .route(web::post().to(add_movie))
                    .route(web::get().to(list_movies)),
            )
            // analytics routes must register before the /movie/{id} matcher
            .service(web::resource("/movie/runtime-impact").route(web::get().to(runtime_impact)))
            .service(web::resource("/movie/top-actors").route(web::get().to(top_actors)))
            .service(web::resource("/movie/monthly-stats").route(web::get().to(monthly_stats)))
            .service(web::resource("/movie/top-countries").route(web::get().to(top_countries)))
            .service(web::resource("/movie/top-genres").route(web::get().to(top_genres)))
            .service(web::resource("/movie/top-directors").route(web::get().to(top_directors)))
            .service(
                web::resource("/movie/{id}")
                    .route(web::get().to(get_movie))
                    .route(web::put().to(update_movie))
                    .route(web::delete().to(delete_movie)),
            )
            .service(
                web::resource("/user")
                    .route(web::post().to(add_user))
                    .route(web::get().to(list_users)),
            )
            .service(
                web::resource("/user/{id}")
                    .route(web::get().to(get_user))
                    .route(web::put().to(update_user))
                    .route(web::delete().to(delete_user)),
            ),
    );
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
}

// Ids on the wire are strings; a malformed one can never match a record.
fn parse_id(raw: &str, missing: &'static str) -> Result<Id, ApiError> {
    raw.parse::<Id>().map_err(|_| ApiError::not_found(missing))
}

fn map_missing(e: RepoError, missing: &'static str) -> ApiError {
    match e {
        RepoError::NotFound => ApiError::not_found(missing),
        other => other.into(),
    }
}

// ---------------- movie handlers ----------------------------------------

#[utoipa::path(
    post,
    path = "/v1/movie",
    request_body = NewMovie,
    responses(
        (status = 200, description = "Movie stored", body = Movie),
        (status = 500, description = "Store failure")
    )
)]
pub async fn add_movie(
    data: web::Data<AppState>,
    payload: web::Json<NewMovie>,
) -> Result<HttpResponse, ApiError> {
    let movie = data.repo.insert_movie(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(movie))
}

#[utoipa::path(
    get,
    path = "/v1/movie",
    params(MovieListQuery),
    responses(
        (status = 200, description = "Paginated movie list", body = MoviePage),
        (status = 400, description = "Invalid page, limit, sort or year")
    )
)]
pub async fn list_movies(
    data: web::Data<AppState>,
    query: web::Query<MovieListQuery>,
) -> Result<HttpResponse, ApiError> {
    let spec = pagination::page_spec(&query.page, &query.limit)?;
    let sort = pagination::movie_sort(&query.sort)?;
    let filter = pagination::movie_filter(&query)?;

    let total = data.repo.count_movies(&filter).await?;
    let movies = data
        .repo
        .list_movies(&filter, sort, spec.skip, spec.limit as usize)
        .await?;
    Ok(HttpResponse::Ok().json(MoviePage::new(movies, total, &spec)))
}

/// A movie with its comment references resolved to full records.
#[derive(Debug, Serialize, ToSchema)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    pub comments: Vec<Comment>,
}

#[utoipa::path(
    get,
    path = "/v1/movie/{id}",
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie with embedded comments", body = MovieDetail),
        (status = 404, description = "Movie not found")
    )
)]
pub async fn get_movie(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path, "Movie not found")?;
    let mut movie = data
        .repo
        .get_movie(id)
        .await
        .map_err(|e| map_missing(e, "Movie not found"))?;
    let ids = std::mem::take(&mut movie.comments);
    let comments = data.repo.get_comments(&ids).await?;
    Ok(HttpResponse::Ok().json(MovieDetail { movie, comments }))
}

#[utoipa::path(
    put,
    path = "/v1/movie/{id}",
    request_body = UpdateMovie,
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Movie not found")
    )
)]
pub async fn update_movie(
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateMovie>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path, "Movie not found")?;
    data.repo
        .update_movie(id, payload.into_inner())
        .await
        .map_err(|e| map_missing(e, "Movie not found"))?;
    Ok(HttpResponse::Ok().json("Updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/v1/movie/{id}",
    params(("id" = String, Path, description = "Movie id")),
    responses((status = 200, description = "Deleted"))
)]
pub async fn delete_movie(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path, "Movie not found")?;
    // detach-then-delete; reports success even when the id was absent
    integrity::delete_movie_cascade(data.repo.as_ref(), id).await?;
    Ok(HttpResponse::Ok().json("Deleted successfully"))
}

// ---------------- analytics handlers ------------------------------------

#[utoipa::path(
    get,
    path = "/v1/movie/runtime-impact",
    responses((status = 200, description = "Quality by runtime band", body = [reports::RuntimeBand]))
)]
pub async fn runtime_impact(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let movies = data.repo.all_movies().await?;
    Ok(HttpResponse::Ok().json(reports::runtime_impact(&movies)))
}

#[utoipa::path(
    get,
    path = "/v1/movie/top-actors",
    responses((status = 200, description = "Top 10 actors by movie count", body = [reports::TopActor]))
)]
pub async fn top_actors(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let movies = data.repo.all_movies().await?;
    Ok(HttpResponse::Ok().json(reports::top_actors(&movies)))
}

#[utoipa::path(
    get,
    path = "/v1/movie/monthly-stats",
    responses((status = 200, description = "Release and comment volume by month", body = [reports::MonthlyStat]))
)]
pub async fn monthly_stats(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let movies = data.repo.all_movies().await?;
    let comments = data.repo.all_comments().await?;
    Ok(HttpResponse::Ok().json(reports::monthly_stats(&movies, &comments)))
}

#[utoipa::path(
    get,
    path = "/v1/movie/top-countries",
    responses((status = 200, description = "Top 10 countries by movie count", body = [reports::TopCountry]))
)]
pub async fn top_countries(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let movies = data.repo.all_movies().await?;
    Ok(HttpResponse::Ok().json(reports::top_countries(&movies)))
}

#[utoipa::path(
    get,
    path = "/v1/movie/top-genres",
    responses((status = 200, description = "Top 10 genres by movie count", body = [reports::TopGenre]))
)]
pub async fn top_genres(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let movies = data.repo.all_movies().await?;
    Ok(HttpResponse::Ok().json(reports::top_genres(&movies)))
}

#[utoipa::path(
    get,
    path = "/v1/movie/top-directors",
    responses((status = 200, description = "Top 10 directors by movie count", body = [reports::TopDirector]))
)]
pub async fn top_directors(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let movies = data.repo.all_movies().await?;
    Ok(HttpResponse::Ok().json(reports::top_directors(&movies)))
}

// ---------------- user handlers -----------------------------------------

#[utoipa::path(
    post,
    path = "/v1/user",
    request_body = NewUser,
    responses(
        (status = 200, description = "User stored", body = User),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn add_user(
    data: web::Data<AppState>,
    payload: web::Json<NewUser>,
) -> Result<HttpResponse, ApiError> {
    let user = data.repo.insert_user(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[utoipa::path(
    get,
    path = "/v1/user",
    params(UserListQuery),
    responses(
        (status = 200, description = "Paginated user list", body = UserPage),
        (status = 400, description = "Invalid page, limit or sort")
    )
)]
pub async fn list_users(
    data: web::Data<AppState>,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse, ApiError> {
    let spec = pagination::page_spec(&query.page, &query.limit)?;
    let sort = pagination::user_sort(&query.sort)?;
    let filter = pagination::user_filter(&query);

    let total = data.repo.count_users(&filter).await?;
    let users = data
        .repo
        .list_users(&filter, sort, spec.skip, spec.limit as usize)
        .await?;
    Ok(HttpResponse::Ok().json(UserPage::new(users, total, &spec)))
}

/// A user with their comment references resolved to full records.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub comments: Vec<Comment>,
}

#[utoipa::path(
    get,
    path = "/v1/user/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User with embedded comments", body = UserDetail),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path, "User not found")?;
    let mut user = data
        .repo
        .get_user(id)
        .await
        .map_err(|e| map_missing(e, "User not found"))?;
    let ids = std::mem::take(&mut user.comments);
    let comments = data.repo.get_comments(&ids).await?;
    Ok(HttpResponse::Ok().json(UserDetail { user, comments }))
}

#[utoipa::path(
    put,
    path = "/v1/user/{id}",
    request_body = UpdateUser,
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_user(
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUser>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path, "User not found")?;
    data.repo
        .update_user(id, payload.into_inner())
        .await
        .map_err(|e| map_missing(e, "User not found"))?;
    Ok(HttpResponse::Ok().json("Updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/v1/user/{id}",
    params(("id" = String, Path, description = "User id")),
    responses((status = 200, description = "Deleted"))
)]
pub async fn delete_user(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path, "User not found")?;
    integrity::delete_user_cascade(data.repo.as_ref(), id).await?;
    Ok(HttpResponse::Ok().json("Deleted successfully"))
}
