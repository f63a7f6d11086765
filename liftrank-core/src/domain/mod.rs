//! Domain types shared by the data layer, the engines and the service.

pub mod criteria;
pub mod input;
pub mod lift;
pub mod outcome;
pub mod record;

pub use criteria::{Attribute, FilterCriteria, UnknownAttribute};
pub use input::UserInput;
pub use lift::{Lift, PerLift};
pub use outcome::Outcome;
pub use record::RawRecord;
