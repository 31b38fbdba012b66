pub mod conversation;
pub mod question_bank;
pub mod responder;
pub mod service;
pub mod validation;
