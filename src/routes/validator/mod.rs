mod handler;
mod model;

pub use handler::{create, get_by_id, list, remove, search, update};
