pub mod attempt;
pub mod certificate;
pub mod course;
pub mod question;
pub mod quiz;
pub mod user;
