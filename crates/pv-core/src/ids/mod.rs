mod id_macro;

mod configuration_handle;
mod transport_ref;

pub use configuration_handle::ConfigurationHandle;
pub use transport_ref::TransportRef;
