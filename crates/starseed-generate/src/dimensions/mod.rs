//! Dimension populators.
//!
//! Each populator writes its table inside one transaction and returns the
//! surrogate keys it produced. Keys are assigned by the generator, except
//! for employees where the store assigns them and they are read back.

pub mod branch;
pub mod channel;
pub mod customer;
pub mod employee;
pub mod order_status;
pub mod product;
pub mod time;

/// Cities served by the branch network and customer base.
pub(crate) const CITIES: &[&str] = &[
    "Cartagena",
    "Barranquilla",
    "Santa Marta",
    "Sincelejo",
    "Montería",
];

pub(crate) const REGION: &str = "Caribe";
