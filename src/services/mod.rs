pub mod attempt_service;
pub mod certificate_service;
pub mod course_service;
pub mod generator_service;
pub mod grading_service;
pub mod question_bank;
pub mod quiz_service;
pub mod text_generator;
