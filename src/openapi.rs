use utoipa::OpenApi;

use crate::models::{
    Awards, Comment, Imdb, Movie, NewComment, NewMovie, NewUser, RatingEntry, Tomatoes,
    TomatoesScore, UpdateMovie, UpdateUser, User,
};
use crate::pagination::{MoviePage, MoviePageMeta, UserPage, UserPageMeta};
use crate::reports::{MonthlyStat, RuntimeBand, TopActor, TopCountry, TopDirector, TopGenre};
use crate::routes::{MovieDetail, UserDetail};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::add_movie,
        crate::routes::list_movies,
        crate::routes::get_movie,
        crate::routes::update_movie,
        crate::routes::delete_movie,
        crate::routes::runtime_impact,
        crate::routes::top_actors,
        crate::routes::monthly_stats,
        crate::routes::top_countries,
        crate::routes::top_genres,
        crate::routes::top_directors,
        crate::routes::add_user,
        crate::routes::list_users,
        crate::routes::get_user,
        crate::routes::update_user,
        crate::routes::delete_user,
    ),
    components(schemas(
        Movie, NewMovie, UpdateMovie, MovieDetail,
        User, NewUser, UpdateUser, UserDetail,
        Comment, NewComment,
        Awards, RatingEntry, Imdb, Tomatoes, TomatoesScore,
        MoviePage, MoviePageMeta, UserPage, UserPageMeta,
        RuntimeBand, TopActor, TopDirector, TopCountry, TopGenre, MonthlyStat,
    )),
    tags(
        (name = "movies", description = "Movie CRUD and analytics"),
        (name = "users", description = "User CRUD"),
    )
)]
pub struct ApiDoc;
