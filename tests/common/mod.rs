#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use shrtn::application::services::MappingService;
use shrtn::domain::entities::NewMapping;
use shrtn::domain::repositories::MappingRepository;
use shrtn::infrastructure::persistence::InMemoryMappingRepository;
use shrtn::routes::router;
use shrtn::state::AppState;
use shrtn::utils::code_generator::CodeGenerator;
use std::sync::Arc;

pub const BASE_URL: &str = "http://localhost:5000/";

pub fn create_test_state() -> (AppState, Arc<InMemoryMappingRepository>) {
    let repo = Arc::new(InMemoryMappingRepository::new());
    let service = Arc::new(MappingService::new(
        repo.clone(),
        BASE_URL,
        Duration::days(7),
    ));

    (AppState::new(service), repo)
}

pub fn create_test_server() -> (TestServer, AppState, Arc<InMemoryMappingRepository>) {
    let (state, repo) = create_test_state();
    let server = TestServer::new(router(state.clone())).unwrap();

    (server, state, repo)
}

/// Like [`create_test_server`], with generated codes taken from `code_generator`.
pub fn create_test_server_with_codes(
    code_generator: CodeGenerator,
) -> (TestServer, AppState, Arc<InMemoryMappingRepository>) {
    let repo = Arc::new(InMemoryMappingRepository::new());
    let service = MappingService::new(repo.clone(), BASE_URL, Duration::days(7))
        .with_code_generator(code_generator);
    let state = AppState::new(Arc::new(service));
    let server = TestServer::new(router(state.clone())).unwrap();

    (server, state, repo)
}

pub async fn create_mapping_posted_at(
    repo: &InMemoryMappingRepository,
    code: &str,
    url: &str,
    posted_at: DateTime<Utc>,
) {
    repo.insert_if_absent(NewMapping::new(
        code,
        url,
        BASE_URL,
        posted_at,
        Duration::days(7),
    ))
    .await
    .unwrap();
}

pub async fn create_test_mapping(repo: &InMemoryMappingRepository, code: &str, url: &str) {
    create_mapping_posted_at(repo, code, url, Utc::now()).await;
}
