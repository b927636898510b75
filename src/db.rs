pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod directory_repo;
pub use directory_repo::DirectoryRepository;
pub mod rental_repo;
pub use rental_repo::RentalRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
