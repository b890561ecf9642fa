//! Board records shared between pipeline stages.
//!
//! [`RawBoard`] is what a board file deserializes into once it has passed
//! validation; [`Board`] is the normalized record written to the dataset.
//! The field order of [`Board`] is the field order of the emitted JSON.

use serde::{Deserialize, Deserializer, Serialize};

/// USB connector fitted to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Usb {
    #[serde(rename = "micro")]
    Micro,
    #[serde(rename = "type-c")]
    TypeC,
}

/// Radio or wired network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connectivity {
    WiFi,
    #[serde(rename = "BLE")]
    Ble,
    Lora,
    Zigbee,
    Ethernet,
}

/// On-board connector or peripheral socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connector {
    Qwiic,
    #[serde(rename = "SP/CE")]
    SpCe,
    PiDebug,
    BConnect,
    #[serde(rename = "CSI")]
    Csi,
    #[serde(rename = "microSD")]
    MicroSd,
    #[serde(rename = "RJ45")]
    Rj45,
    #[serde(rename = "RTC")]
    Rtc,
    #[serde(rename = "LiPo-PH2.0")]
    LipoPh2_0,
    #[serde(rename = "LiPo-MX1.25")]
    LipoMx1_25,
    #[serde(rename = "CAN")]
    Can,
}

/// A board file that passed schema validation.
///
/// `image` and `url` must be present in the file but may be `null`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawBoard {
    pub name: String,
    pub chip: String,
    pub cores: String,
    pub flash: String,
    pub ram: String,
    pub usb: Usb,
    pub dimensions: String,
    #[serde(default)]
    pub connectivity: Vec<Connectivity>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
    pub smd: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(deserialize_with = "present_or_null")]
    pub image: Option<String>,
    #[serde(deserialize_with = "present_or_null")]
    pub url: Option<String>,
}

/// Deserialize a nullable field that must still be written out.
///
/// With a custom `deserialize_with`, serde reports a missing key as an error
/// instead of defaulting an `Option` to `None`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

/// A normalized board as emitted in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub name: String,
    pub chip: String,
    pub cores: String,
    pub flash: String,
    pub ram: String,
    pub usb: Usb,
    pub dimensions: String,
    pub connectivity: Vec<Connectivity>,
    pub connectors: Vec<Connector>,
    pub smd: bool,
    pub notes: String,
    pub image: Option<String>,
    pub url: Option<String>,
    pub flash_bytes: u64,
    pub ram_bytes: u64,
    /// `data:image/jpeg;base64,...`, or `null` when the board has no image.
    pub thumbnail: Option<String>,
}

/// Top-level document written to the dataset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub data: Vec<Board>,
}
