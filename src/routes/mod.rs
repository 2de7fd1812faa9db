pub mod assessment;
pub mod certificates;
pub mod health;
