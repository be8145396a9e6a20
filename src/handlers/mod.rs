pub mod categories;
pub mod orders;
pub mod payments;
pub mod posters;
pub mod products;
pub mod responses;
pub mod users;
