pub mod open_data_service;

pub use open_data_service::OpenDataService;
