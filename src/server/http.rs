use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use log::info;

use crate::custom_err::INVALID_QUERY_ERR;
use crate::http_param::{SearchParam, View};
use crate::server::query::INVALID_QUERY_MSG;
use crate::server::search_manager::SearchManager;

pub async fn run(addr: &str, sm: SearchManager) -> std::io::Result<()> {
    info!("http 接口监听:{}", addr);
    HttpServer::new(move || App::new().app_data(web::Data::new(sm.clone())).configure(routes))
        .bind(addr)?
        .run()
        .await
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(hello).service(search).service(stats);
}

#[actix_web::get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Welcome to Spotify-Index!")
}

#[actix_web::get("/search")]
async fn search(param: web::Query<SearchParam>, sm: web::Data<SearchManager>) -> HttpResponse {
    let query = match param.to_query() {
        Some(query) => query,
        None => {
            return HttpResponse::BadRequest().json(View::fail(INVALID_QUERY_ERR, INVALID_QUERY_MSG));
        }
    };
    let res = sm.search(&query).await;
    info!("url=/search, album={}, artist={}, found={}", query.album, query.artist, res.records.len());
    HttpResponse::Ok().json(View::success(res))
}

#[actix_web::get("/stats")]
async fn stats(sm: web::Data<SearchManager>) -> impl Responder {
    web::Json(View::success(sm.stats()))
}
