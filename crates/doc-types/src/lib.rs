pub mod color;
pub mod constraint;
pub mod enumeration;
pub mod error;
pub mod path_value;
pub mod status;

pub use color::*;
pub use constraint::*;
pub use enumeration::*;
pub use error::*;
pub use path_value::*;
pub use status::*;

pub use uuid::Uuid;
