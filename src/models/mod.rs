pub mod budget;
pub mod catalog;
pub mod context;
pub mod itinerary;
pub mod trip;
