mod list_page;

pub use list_page::ListPage;
