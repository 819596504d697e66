//! The DeviceInfo dataset, carried in the data phase of GetDeviceInfo.

use super::{read_array, write_array, Error, MessageComponent};
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceInfo {
    pub standard_version: u16,
    pub vendor_extension_id: u32,
    pub vendor_extension_version: u16,
    pub vendor_extension_desc: String,
    pub functional_mode: u16,
    pub operations_supported: Vec<u16>,
    pub events_supported: Vec<u16>,
    pub device_properties_supported: Vec<u16>,
    pub capture_formats: Vec<u16>,
    pub image_formats: Vec<u16>,
    pub manufacturer: String,
    pub model: String,
    pub device_version: String,
    pub serial_number: String,
}

impl MessageComponent for DeviceInfo {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            standard_version: u16::read(cursor)?,
            vendor_extension_id: u32::read(cursor)?,
            vendor_extension_version: u16::read(cursor)?,
            vendor_extension_desc: String::read(cursor)?,
            functional_mode: u16::read(cursor)?,
            operations_supported: read_array(cursor)?,
            events_supported: read_array(cursor)?,
            device_properties_supported: read_array(cursor)?,
            capture_formats: read_array(cursor)?,
            image_formats: read_array(cursor)?,
            manufacturer: String::read(cursor)?,
            model: String::read(cursor)?,
            device_version: String::read(cursor)?,
            serial_number: String::read(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.standard_version.write(cursor)?;
        self.vendor_extension_id.write(cursor)?;
        self.vendor_extension_version.write(cursor)?;
        self.vendor_extension_desc.write(cursor)?;
        self.functional_mode.write(cursor)?;
        write_array(&self.operations_supported, cursor)?;
        write_array(&self.events_supported, cursor)?;
        write_array(&self.device_properties_supported, cursor)?;
        write_array(&self.capture_formats, cursor)?;
        write_array(&self.image_formats, cursor)?;
        self.manufacturer.write(cursor)?;
        self.model.write(cursor)?;
        self.device_version.write(cursor)?;
        self.serial_number.write(cursor)
    }
}

impl DeviceInfo {
    pub fn supports_operation(&self, code: u16) -> bool {
        self.operations_supported.contains(&code)
    }

    pub fn supports_property(&self, code: u16) -> bool {
        self.device_properties_supported.contains(&code)
    }
}
