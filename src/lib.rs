pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    attempt_service::AttemptService, certificate_service::CertificateService,
    course_service::CourseService, generator_service::QuestionGenerator,
    grading_service::GradingService, quiz_service::QuizService,
    text_generator::text_generator_from_config,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub course_service: CourseService,
    pub quiz_service: QuizService,
    pub attempt_service: AttemptService,
    pub certificate_service: CertificateService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.ai_timeout_secs))
            .build()
            .unwrap();

        let text = text_generator_from_config(config, http_client);
        let generator = QuestionGenerator::new(text.clone());
        let grading = GradingService::new(text);

        let course_service = CourseService::new(pool.clone());
        let quiz_service = QuizService::new(pool.clone(), generator);
        let attempt_service = AttemptService::new(pool.clone(), grading);
        let certificate_service = CertificateService::new(pool.clone());

        Self {
            pool,
            course_service,
            quiz_service,
            attempt_service,
            certificate_service,
        }
    }
}
