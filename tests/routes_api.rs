use actix_web::{test, App};
use serial_test::serial;
use std::sync::Arc;

use mflix::models::NewComment;
use mflix::repo::{inmem::InMemRepo, CommentRepo};
use mflix::routes::{config, AppState};

/// Unique temp snapshot dir per test so state never leaks between runs.
fn setup_env() {
    std::env::set_var("MFLIX_DATA_DIR", tempfile::tempdir().unwrap().path());
}

fn app_state(repo: &InMemRepo) -> actix_web::web::Data<AppState> {
    actix_web::web::Data::new(AppState {
        repo: Arc::new(repo.clone()),
    })
}

async fn read_json(resp: actix_web::dev::ServiceResponse) -> serde_json::Value {
    serde_json::from_slice(&test::read_body(resp).await).unwrap()
}

#[actix_web::test]
#[serial]
async fn movie_crud_flow() {
    setup_env();
    let repo = InMemRepo::new();
    let app =
        test::init_service(App::new().app_data(app_state(&repo)).configure(config)).await;

    // create
    let req = test::TestRequest::post()
        .uri("/v1/movie")
        .set_json(serde_json::json!({
            "title": "The Thing",
            "year": 1982,
            "runtime": 109,
            "genres": ["Horror", "Sci-Fi"],
            "imdb": { "rating": 8.2, "votes": 350000 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let movie = read_json(resp).await;
    let id = movie["id"].as_str().unwrap().to_string();
    assert_eq!(movie["title"], "The Thing");
    assert_eq!(movie["type"], serde_json::Value::Null);

    // fetch by id, comments embedded as an (empty) array
    let req = test::TestRequest::get().uri(&format!("/v1/movie/{id}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let detail = read_json(resp).await;
    assert_eq!(detail["title"], "The Thing");
    assert_eq!(detail["comments"].as_array().unwrap().len(), 0);

    // partial update leaves the rest untouched
    let req = test::TestRequest::put()
        .uri(&format!("/v1/movie/{id}"))
        .set_json(serde_json::json!({ "plot": "Antarctic researchers find something." }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(read_json(resp).await, "Updated successfully");

    let req = test::TestRequest::get().uri(&format!("/v1/movie/{id}")).to_request();
    let detail = read_json(test::call_service(&app, req).await).await;
    assert_eq!(detail["year"], 1982);
    assert_eq!(detail["plot"], "Antarctic researchers find something.");

    // delete, then the movie is gone
    let req = test::TestRequest::delete().uri(&format!("/v1/movie/{id}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(read_json(resp).await, "Deleted successfully");

    let req = test::TestRequest::get().uri(&format!("/v1/movie/{id}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body = read_json(resp).await;
    assert_eq!(body["message"], "Movie not found");
}

#[actix_web::test]
#[serial]
async fn movie_list_pagination_envelope() {
    setup_env();
    let repo = InMemRepo::new();
    let app =
        test::init_service(App::new().app_data(app_state(&repo)).configure(config)).await;

    for i in 0..7 {
        let req = test::TestRequest::post()
            .uri("/v1/movie")
            .set_json(serde_json::json!({
                "title": format!("Movie {i}"),
                "year": 2000 + i,
                "genres": if i % 2 == 0 { vec!["Drama"] } else { vec!["Comedy"] }
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    // page 2 of 3 at limit 3
    let req = test::TestRequest::get()
        .uri("/v1/movie?page=2&limit=3&sort=year:asc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let page = read_json(resp).await;
    assert_eq!(page["data"].as_array().unwrap().len(), 3);
    assert_eq!(page["pagination"]["totalMovies"], 7);
    assert_eq!(page["pagination"]["totalPages"], 3);
    assert_eq!(page["pagination"]["currentPage"], 2);
    assert_eq!(page["pagination"]["limit"], 3);
    assert_eq!(page["data"][0]["year"], 2003);

    // filtered total, not the global collection size
    let req = test::TestRequest::get().uri("/v1/movie?genre=Drama").to_request();
    let page = read_json(test::call_service(&app, req).await).await;
    assert_eq!(page["pagination"]["totalMovies"], 4);

    // genre + year combined
    let req = test::TestRequest::get()
        .uri("/v1/movie?genre=Drama&year=2002")
        .to_request();
    let page = read_json(test::call_service(&app, req).await).await;
    assert_eq!(page["pagination"]["totalMovies"], 1);
    assert_eq!(page["data"][0]["title"], "Movie 2");
}

#[actix_web::test]
#[serial]
async fn movie_list_validation_errors() {
    setup_env();
    let repo = InMemRepo::new();
    let app =
        test::init_service(App::new().app_data(app_state(&repo)).configure(config)).await;

    let req = test::TestRequest::get().uri("/v1/movie?page=0").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = read_json(resp).await;
    assert_eq!(body["message"], "Page and limit must be positive numbers");

    let req = test::TestRequest::get().uri("/v1/movie?sort=budget:asc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = read_json(resp).await;
    assert_eq!(body["message"], "Invalid sort field. Use 'title' or 'year'");

    let req = test::TestRequest::get().uri("/v1/movie?year=oldies").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = read_json(resp).await;
    assert_eq!(body["message"], "Year must be a valid number");
}

#[actix_web::test]
#[serial]
async fn delete_movie_detaches_comments_over_http() {
    setup_env();
    let repo = InMemRepo::new();
    let app =
        test::init_service(App::new().app_data(app_state(&repo)).configure(config)).await;

    let req = test::TestRequest::post()
        .uri("/v1/movie")
        .set_json(serde_json::json!({ "title": "Jaws" }))
        .to_request();
    let movie = read_json(test::call_service(&app, req).await).await;
    let movie_id: uuid::Uuid = movie["id"].as_str().unwrap().parse().unwrap();

    let req = test::TestRequest::post()
        .uri("/v1/user")
        .set_json(serde_json::json!({
            "name": "Brody", "email": "brody@example.com", "password": "pw"
        }))
        .to_request();
    let user = read_json(test::call_service(&app, req).await).await;
    let user_id: uuid::Uuid = user["id"].as_str().unwrap().parse().unwrap();

    // comments have no HTTP surface; seed through the repo
    let comment = repo
        .insert_comment(NewComment {
            text: "classic".into(),
            date: chrono::Utc::now(),
            movie: movie_id,
            user: user_id,
        })
        .await
        .unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/v1/movie/{movie_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let detached = repo.get_comments(&[comment.id]).await.unwrap();
    assert_eq!(detached[0].movie, None);

    // the user still embeds the surviving comment
    let req = test::TestRequest::get().uri(&format!("/v1/user/{user_id}")).to_request();
    let detail = read_json(test::call_service(&app, req).await).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);
    assert_eq!(detail["comments"][0]["movie"], serde_json::Value::Null);
}

#[actix_web::test]
#[serial]
async fn user_flow_and_duplicate_email() {
    setup_env();
    let repo = InMemRepo::new();
    let app =
        test::init_service(App::new().app_data(app_state(&repo)).configure(config)).await;

    let req = test::TestRequest::post()
        .uri("/v1/user")
        .set_json(serde_json::json!({
            "name": "Ana", "email": "ana@example.com", "password": "pw"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::post()
        .uri("/v1/user")
        .set_json(serde_json::json!({
            "name": "Impostor", "email": "ana@example.com", "password": "pw"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
    let body = read_json(resp).await;
    assert_eq!(body["message"], "Email already in use");

    // substring email filter
    let req = test::TestRequest::get().uri("/v1/user?email=ANA").to_request();
    let page = read_json(test::call_service(&app, req).await).await;
    assert_eq!(page["pagination"]["totalUsers"], 1);

    let req = test::TestRequest::get().uri("/v1/user?sort=karma:asc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = read_json(resp).await;
    assert_eq!(body["message"], "Invalid sort field. Use 'name' or 'email'");
}

#[actix_web::test]
#[serial]
async fn analytics_endpoints_shapes() {
    setup_env();
    let repo = InMemRepo::new();
    let app =
        test::init_service(App::new().app_data(app_state(&repo)).configure(config)).await;

    let req = test::TestRequest::post()
        .uri("/v1/movie")
        .set_json(serde_json::json!({
            "title": "Ran",
            "released": "1985-06-01T00:00:00Z",
            "runtime": 162,
            "genres": ["Drama"],
            "directors": ["Akira Kurosawa"],
            "cast": ["Tatsuya Nakadai"],
            "countries": ["Japan"],
            "imdb": { "rating": 8.2 },
            "tomatoes": { "viewer": { "rating": 4.2 } }
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    // runtime impact always has the 8 fixed bands, in order
    let req = test::TestRequest::get().uri("/v1/movie/runtime-impact").to_request();
    let bands = read_json(test::call_service(&app, req).await).await;
    let bands = bands.as_array().unwrap();
    assert_eq!(bands.len(), 8);
    assert_eq!(bands[0]["runtimeRange"], "0 - 60 mins");
    assert_eq!(bands[0]["totalMovies"], 0);
    assert_eq!(bands[0]["avgImdbRating"], 0.0);
    assert_eq!(bands[4]["runtimeRange"], "150 - 180 mins");
    assert_eq!(bands[4]["totalMovies"], 1);
    assert_eq!(bands[4]["avgImdbRating"], 8.2);

    let req = test::TestRequest::get().uri("/v1/movie/top-actors").to_request();
    let actors = read_json(test::call_service(&app, req).await).await;
    assert_eq!(actors[0]["actor"], "Tatsuya Nakadai");
    assert_eq!(actors[0]["totalMovies"], 1);

    let req = test::TestRequest::get().uri("/v1/movie/top-genres").to_request();
    let genres = read_json(test::call_service(&app, req).await).await;
    assert_eq!(genres[0]["_id"], "Drama");

    let req = test::TestRequest::get().uri("/v1/movie/top-countries").to_request();
    let countries = read_json(test::call_service(&app, req).await).await;
    assert_eq!(countries[0]["country"], "Japan");
    assert!(countries[0].get("avgTomatoesViewerRating").is_none());

    let req = test::TestRequest::get().uri("/v1/movie/top-directors").to_request();
    let directors = read_json(test::call_service(&app, req).await).await;
    assert_eq!(directors[0]["director"], "Akira Kurosawa");

    let req = test::TestRequest::get().uri("/v1/movie/monthly-stats").to_request();
    let months = read_json(test::call_service(&app, req).await).await;
    assert_eq!(months[0]["month"], 6);
    assert_eq!(months[0]["monthName"], "June");
    assert_eq!(months[0]["totalMoviesReleased"], 1);
    assert_eq!(months[0]["totalCommentsOverall"], 0);
    assert_eq!(months[0]["avgCommentsPerMovie"], 0.0);
}
