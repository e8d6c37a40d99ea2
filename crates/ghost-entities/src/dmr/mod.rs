pub mod access_control;
pub mod components;
pub mod control;
pub mod csbk;
pub mod data_header;
pub mod dmr_err;
pub mod dmr_host;
pub mod frame;
pub mod full_lc;
pub mod lookup;
pub mod slot;
pub mod voice;

pub use access_control::AccessControl;
pub use control::Control;
pub use dmr_err::{DmrErr, DmrErrKind};
pub use dmr_host::DmrHost;
pub use lookup::IdLookup;
