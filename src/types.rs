/// Unique product identifier (stable across sessions).
/// Examples: `FISH001`, `FISH004`
pub type ProductId = String;
/// Category tag attached to a product.
/// Examples: `fresh`, `processed`, `gift`
pub type CategoryId = String;
/// Raw payload read from a product QR code.
/// Example: `TRACE-FISH001-2025`
pub type QrPayload = String;
/// Human-readable label of a trace-node detail field.
/// Examples: `Water Quality`, `Transport Duration`
pub type FieldLabel = String;
/// Generated value of a trace-node detail field.
/// Examples: `Grade I`, `2.4°C`, `川A48213`
pub type DetailValue = String;
/// Identifier of a persisted scan-history record.
/// Example: `TRACE_1737600000000`
pub type ScanRecordId = String;
/// Display rendering of a node timestamp.
/// Example: `2025/01/21 09:42`
pub type TimestampText = String;
