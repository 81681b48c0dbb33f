pub mod check;
pub mod doctor;
pub mod onboard;
pub mod prompt;
pub mod relay;
