pub mod catalog;
pub mod directory;
pub mod finance;
pub mod orders;
pub mod rentals;
pub mod reports;
