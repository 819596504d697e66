mod message_component;
pub use message_component::*;
pub mod device;
pub mod ptpip;

pub use ptpip::PtpIpMessage;
