//! [`DeviceBackend`] that records every call instead of touching `/dev/uinput`

use super::{AxisCode, DeviceBackend, DeviceProfile, KeyCode, MappingError, VirtualDevice};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Opened { device: String, profile: DeviceProfile },
    Key { device: String, code: KeyCode, pressed: bool },
    Axis { device: String, axis: AxisCode, value: i32 },
    Sync { device: String },
    Closed { device: String },
}

#[derive(Debug, Default)]
struct Shared {
    records: RefCell<Vec<Record>>,
    fail_open: Cell<bool>,
    fail_writes: Cell<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
    shared: Rc<Shared>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.shared.records.borrow().clone()
    }

    pub fn clear(&self) {
        self.shared.records.borrow_mut().clear();
    }

    pub fn fail_open(&self) {
        self.shared.fail_open.set(true);
    }

    pub fn fail_writes(&self) {
        self.shared.fail_writes.set(true);
    }

    pub fn closed(&self, device: &str) -> usize {
        self.shared
            .records
            .borrow()
            .iter()
            .filter(|r| matches!(r, Record::Closed { device: d } if d == device))
            .count()
    }
}

#[derive(Debug)]
pub struct RecordingDevice {
    name: String,
    shared: Rc<Shared>,
}

impl RecordingDevice {
    fn push(&self, what: &'static str, record: Record) -> Result<(), MappingError> {
        if self.shared.fail_writes.get() {
            return Err(MappingError::WriteError {
                device: self.name.clone(),
                what,
                reason: "simulated failure".to_string(),
            });
        }
        self.shared.records.borrow_mut().push(record);
        Ok(())
    }
}

impl DeviceBackend for RecordingBackend {
    type Device = RecordingDevice;

    fn open(&mut self, profile: DeviceProfile, name: &str) -> Result<RecordingDevice, MappingError> {
        if self.shared.fail_open.get() {
            return Err(MappingError::OpenError {
                device: name.to_string(),
                reason: "simulated failure".to_string(),
            });
        }
        self.shared.records.borrow_mut().push(Record::Opened {
            device: name.to_string(),
            profile,
        });
        Ok(RecordingDevice {
            name: name.to_string(),
            shared: Rc::clone(&self.shared),
        })
    }
}

impl VirtualDevice for RecordingDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_key(&mut self, code: KeyCode, pressed: bool) -> Result<(), MappingError> {
        let record = Record::Key {
            device: self.name.clone(),
            code,
            pressed,
        };
        self.push("key", record)
    }

    fn write_axis(&mut self, axis: AxisCode, value: i32) -> Result<(), MappingError> {
        let record = Record::Axis {
            device: self.name.clone(),
            axis,
            value,
        };
        self.push("axis", record)
    }

    fn write_sync(&mut self) -> Result<(), MappingError> {
        let record = Record::Sync {
            device: self.name.clone(),
        };
        self.push("sync", record)
    }

    fn close(self) -> Result<(), MappingError> {
        self.shared.records.borrow_mut().push(Record::Closed {
            device: self.name.clone(),
        });
        Ok(())
    }
}
