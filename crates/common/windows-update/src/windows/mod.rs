mod apartment;
mod dispatch;
mod factory;
mod variant;

pub use apartment::ApartmentGuard;
pub use factory::ComFactory;
