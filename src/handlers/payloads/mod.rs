mod archive_link;
mod list;
mod request_id;

pub use archive_link::get as archive_link;
pub use list::get as list;
pub use request_id::get as request_id;
