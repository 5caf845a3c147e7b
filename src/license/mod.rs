pub mod gate;
pub mod identity;
pub mod record;
pub mod state;
pub mod validator;

pub use identity::MachineIdentity;
pub use record::{Feature, FeatureSet, LicenseRecord};
pub use state::LicenseState;
pub use validator::{CheckOutcome, LicenseError};
