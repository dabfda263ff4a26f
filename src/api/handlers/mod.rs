mod health;
mod posts;
mod uploads;

pub use health::health;
pub use posts::{create_post, delete_post, get_post, list_posts, update_post};
pub use uploads::{delete_upload, list_uploads, serve_upload, upload_image};
