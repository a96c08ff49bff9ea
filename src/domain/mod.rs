//! Domain model: aggregates, value objects, events, and the browse
//! pipeline that turns a listing's variants into something a shopper
//! can select and price.

pub mod aggregates;
pub mod browse;
pub mod events;
pub mod value_objects;
