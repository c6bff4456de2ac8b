pub mod coerce;
pub mod opinion;
pub mod toy;

pub use opinion::{NewOpinion, Opinion};
pub use toy::{NewToy, ToyUpdate, PRICE_FIELD, SELLER_EMAIL_FIELD};
