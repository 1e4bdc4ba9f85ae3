mod load_service;

pub use load_service::LoadService;
