pub mod service;

pub use service::ItemService;
