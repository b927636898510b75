pub mod catalog_service;
pub mod directory_service;
pub mod finance_service;
pub mod order_service;
pub mod rental_service;
pub mod report_service;
