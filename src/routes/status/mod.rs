mod handler;

pub use handler::teste;
