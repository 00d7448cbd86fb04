pub mod dispatcher;
pub mod event_source;
pub mod profile_store;
pub mod push_gateway;
pub mod recipient;

pub use dispatcher::*;
pub use event_source::*;
pub use profile_store::*;
pub use push_gateway::*;
pub use recipient::*;
