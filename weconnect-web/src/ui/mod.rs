mod app;
pub use app::{App, AppMsg};

mod comment;
pub use comment::Comment;

mod login;
pub use login::{Credentials, Login};

mod modal;
pub use modal::Modal;

mod post;
pub use post::Post;

mod post_page;
pub use post_page::PostPage;

mod sidebar;
pub use sidebar::Sidebar;

mod widgets;
pub use widgets::Widgets;
