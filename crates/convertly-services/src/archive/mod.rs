mod service;

pub use service::create_zip_archive;
