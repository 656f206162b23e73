pub mod buildings;
pub mod catalog;
pub mod ledger;
pub mod requirements;
pub mod village;
