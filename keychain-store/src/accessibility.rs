use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Condition under which the backend allows an item to be read.
///
/// The policy is a write-time attribute: it is applied when an item is first
/// added and is otherwise opaque to this crate. Names parse and print in
/// kebab-case (`when-unlocked`, `after-first-unlock-this-device-only`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Accessibility {
    /// Readable after the first unlock following a restart.
    AfterFirstUnlock,
    /// Like [`Accessibility::AfterFirstUnlock`], never migrated to another device.
    AfterFirstUnlockThisDeviceOnly,
    /// Always readable, regardless of lock state.
    Always,
    /// Readable while unlocked, only if a passcode is set; never migrated.
    WhenPasscodeSetThisDeviceOnly,
    /// Like [`Accessibility::Always`], never migrated to another device.
    AlwaysThisDeviceOnly,
    /// Readable only while the device is unlocked.
    #[default]
    WhenUnlocked,
    /// Like [`Accessibility::WhenUnlocked`], never migrated to another device.
    WhenUnlockedThisDeviceOnly,
}

impl Accessibility {
    /// Returns `true` for the variants that never leave the current device.
    #[must_use]
    pub const fn is_device_only(self) -> bool {
        matches!(
            self,
            Self::AfterFirstUnlockThisDeviceOnly
                | Self::WhenPasscodeSetThisDeviceOnly
                | Self::AlwaysThisDeviceOnly
                | Self::WhenUnlockedThisDeviceOnly
        )
    }
}
