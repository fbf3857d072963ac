// Domain operations: one handler per route, each wrapping store calls
// with its error mapping. Failures propagate as ApiError via `?`.

pub mod items;
pub mod users;
