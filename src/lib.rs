//! Device provisioner
//!
//! Bootstrap and host adapters around the install wizard. The wizard itself
//! lives in `pv-app`; its state machine and ports in `pv-core`.

pub mod adapters;
pub mod bootstrap;
