//! Reserved map keys of the OCF payload formats.

/// Resource uri.
pub const HREF: &str = "href";
/// Resource types.
pub const RESOURCE_TYPE: &str = "rt";
/// Interfaces.
pub const INTERFACE: &str = "if";

/// Device or platform instance id.
pub const DEVICE_ID: &str = "di";
/// Human-friendly name.
pub const DEVICE_NAME: &str = "n";
/// OCF core version implemented by the device.
pub const SPEC_VERSION: &str = "icv";
/// Comma-separated data model versions.
pub const DATA_MODEL_VERSION: &str = "dmv";

/// Platform id.
pub const PLATFORM_ID: &str = "pi";
/// Manufacturer name.
pub const MFG_NAME: &str = "mnmn";
/// Manufacturer url.
pub const MFG_URL: &str = "mnml";
/// Model number.
pub const MODEL_NUM: &str = "mnmo";
/// Manufacturing date.
pub const MFG_DATE: &str = "mndt";
/// Platform version.
pub const PLATFORM_VERSION: &str = "mnpv";
/// Operating system version.
pub const OS_VERSION: &str = "mnos";
/// Hardware version.
pub const HARDWARE_VERSION: &str = "mnhw";
/// Firmware version.
pub const FIRMWARE_VERSION: &str = "mnfv";
/// Support url.
pub const SUPPORT_URL: &str = "mnsl";
/// System time.
pub const SYSTEM_TIME: &str = "st";

/// Presence nonce (sequence number).
pub const NONCE: &str = "non";
/// Presence time-to-live.
pub const TTL: &str = "ttl";
/// Presence trigger.
pub const TRIGGER: &str = "trg";

/// Discovery links.
pub const LINKS: &str = "links";
/// Link policy map.
pub const POLICY: &str = "p";
/// Policy bitmap.
pub const BITMAP: &str = "bm";
/// Policy secure flag.
pub const SECURE: &str = "sec";
/// Policy secure port.
pub const PORT: &str = "port";
