pub mod admin;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod seating;
pub mod tickets;
pub mod ws;

pub use routes::create_router;
pub use ws::WsMessage;
