use std::fmt;

use serde::{Deserialize, Serialize};

/// Sensor and actuator flags a slave reports with every Slave→Backend packet.
///
/// Packed into a little-endian `u16`, one bit per flag from bit 0 upward in
/// field order. Bits 9-15 are reserved: ignored on decode, zero on encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub color_sensor: bool,
    pub sleeve_limit: bool,
    pub electromagnet_unlock_button: bool,
    pub battery_low_alarm: bool,
    pub pressure_sensor: bool,
    pub electromagnetic_lock1: bool,
    pub electromagnetic_lock2: bool,
    pub accessory1: bool,
    pub accessory2: bool,
}

/// Mask of the bits that carry flags.
pub const DEVICE_STATUS_MASK: u16 = 0x01FF;

impl DeviceStatus {
    const LABELS: [&'static str; 9] = ["CS", "SL", "EUB", "BLA", "PS", "EL1", "EL2", "A1", "A2"];

    fn flags(&self) -> [bool; 9] {
        [
            self.color_sensor,
            self.sleeve_limit,
            self.electromagnet_unlock_button,
            self.battery_low_alarm,
            self.pressure_sensor,
            self.electromagnetic_lock1,
            self.electromagnetic_lock2,
            self.accessory1,
            self.accessory2,
        ]
    }

    /// Pack into the wire representation.
    pub fn to_u16(&self) -> u16 {
        self.flags()
            .iter()
            .enumerate()
            .fold(0, |acc, (bit, &set)| acc | (u16::from(set) << bit))
    }

    /// Unpack from the wire representation.
    pub fn from_u16(raw: u16) -> Self {
        let bit = |n: u16| raw & (1 << n) != 0;
        Self {
            color_sensor: bit(0),
            sleeve_limit: bit(1),
            electromagnet_unlock_button: bit(2),
            battery_low_alarm: bit(3),
            pressure_sensor: bit(4),
            electromagnetic_lock1: bit(5),
            electromagnetic_lock2: bit(6),
            accessory1: bit(7),
            accessory2: bit(8),
        }
    }

    /// Short labels of the flags that are set, e.g. `["CS", "EL1"]`.
    pub fn active_labels(&self) -> Vec<&'static str> {
        self.flags()
            .iter()
            .zip(Self::LABELS)
            .filter_map(|(&set, label)| set.then_some(label))
            .collect()
    }
}

impl From<u16> for DeviceStatus {
    fn from(raw: u16) -> Self {
        Self::from_u16(raw)
    }
}

impl From<DeviceStatus> for u16 {
    fn from(status: DeviceStatus) -> Self {
        status.to_u16()
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = self.active_labels();
        if labels.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&labels.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_order_matches_field_order() {
        let status = DeviceStatus {
            color_sensor: true,
            ..Default::default()
        };
        assert_eq!(status.to_u16(), 0x0001);

        let status = DeviceStatus {
            battery_low_alarm: true,
            accessory2: true,
            ..Default::default()
        };
        assert_eq!(status.to_u16(), 0x0108);
    }

    #[test]
    fn every_nine_bit_value_round_trips() {
        for raw in 0..=DEVICE_STATUS_MASK {
            assert_eq!(DeviceStatus::from_u16(raw).to_u16(), raw);
        }
    }

    #[test]
    fn reserved_bits_are_ignored() {
        let status = DeviceStatus::from_u16(0xFE01);
        assert!(status.color_sensor);
        assert!(!status.accessory2);
        assert_eq!(status.to_u16(), 0x0001);
    }

    #[test]
    fn display_uses_short_labels() {
        assert_eq!(DeviceStatus::from_u16(0).to_string(), "-");
        assert_eq!(DeviceStatus::from_u16(0b1_0010_0001).to_string(), "CS,EL1,A2");
    }
}
