pub mod catalog;
pub mod directory;
pub mod finance;
pub mod orders;
pub mod reports;
pub mod rentals;
